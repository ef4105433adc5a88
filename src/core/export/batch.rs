//! Batched image export requests
//!
//! The export endpoint accepts a bounded number of ids per request. This
//! module splits discovered nodes into contiguous batches, issues one
//! request per batch and merges the returned render URLs back into the
//! nodes.

use crate::adapters::figma::{DesignApi, ImageExportOptions};
use crate::domain::{DesignApiError, DesignExportError, ExportableNode, FileKey, NodeId, Result};

/// Default number of ids per export request
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Largest batch the provider accepts
pub const MAX_BATCH_SIZE: usize = 500;

/// Default cap on frames exported per run
pub const DEFAULT_MAX_FRAMES: usize = 100;

/// Outcome counters for one export pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Requests issued
    pub batches: usize,
    /// Nodes that received a render URL
    pub exported: usize,
    /// Nodes the provider returned no URL for
    pub missing: usize,
}

impl BatchResult {
    /// Merge another result into this one
    pub fn merge(&mut self, other: BatchResult) {
        self.batches += other.batches;
        self.exported += other.exported;
        self.missing += other.missing;
    }
}

/// Splits nodes into batches and fills in their render URLs
#[derive(Debug, Clone)]
pub struct ImageExportBatcher {
    batch_size: usize,
}

impl ImageExportBatcher {
    /// Create a batcher issuing at most `batch_size` ids per request
    ///
    /// # Errors
    ///
    /// Returns a validation error unless `1 <= batch_size <= 500`.
    pub fn new(batch_size: usize) -> Result<Self> {
        if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
            return Err(DesignExportError::Validation(format!(
                "batch_size must be between 1 and {MAX_BATCH_SIZE}, got {batch_size}"
            )));
        }
        Ok(Self { batch_size })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Request render URLs for `nodes`, one call per batch, in order
    ///
    /// Nodes whose id is absent from a response, or mapped to `null`, keep
    /// an empty `image_url`. Requests are issued sequentially; the API
    /// implementation applies rate limiting.
    ///
    /// # Errors
    ///
    /// Fails on the first batch whose request fails or whose response
    /// carries a top-level `err`. Nodes in earlier batches keep the URLs
    /// already merged.
    pub async fn export(
        &self,
        api: &dyn DesignApi,
        file_key: &FileKey,
        nodes: &mut [ExportableNode],
        options: &ImageExportOptions,
    ) -> Result<BatchResult> {
        let total_batches = nodes.len().div_ceil(self.batch_size);
        let mut result = BatchResult::default();

        for (index, chunk) in nodes.chunks_mut(self.batch_size).enumerate() {
            let batch_num = index + 1;
            crate::log_batch_processing!(batch_num, total_batches, chunk.len());

            let ids: Vec<NodeId> = chunk.iter().map(|n| n.node_id.clone()).collect();
            let response = api.get_images(file_key, &ids, options).await?;

            if let Some(err) = response.err.as_deref() {
                tracing::error!(
                    file_key = %file_key,
                    batch = batch_num,
                    error = %err,
                    "Image export rejected"
                );
                return Err(DesignApiError::ExportFailed(err.to_string()).into());
            }

            let mut batch = BatchResult {
                batches: 1,
                ..Default::default()
            };
            for node in chunk.iter_mut() {
                match response.url_for(&node.node_id) {
                    Some(url) => {
                        node.image_url = url.to_string();
                        batch.exported += 1;
                    }
                    None => {
                        tracing::warn!(
                            node_id = %node.node_id,
                            name = %node.name,
                            "No render URL returned"
                        );
                        batch.missing += 1;
                    }
                }
            }

            tracing::debug!(
                batch = batch_num,
                exported = batch.exported,
                missing = batch.missing,
                "Batch exported"
            );
            result.merge(batch);
        }

        Ok(result)
    }
}

impl Default for ImageExportBatcher {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Keep only the first `max_frames` nodes in discovery order
///
/// Returns the number of nodes dropped.
pub fn apply_frame_cap(nodes: &mut Vec<ExportableNode>, max_frames: usize) -> usize {
    if nodes.len() <= max_frames {
        return 0;
    }

    let dropped = nodes.len() - max_frames;
    tracing::warn!(
        discovered = nodes.len(),
        max_frames,
        dropped,
        "Frame count exceeds cap, truncating"
    );
    nodes.truncate(max_frames);
    dropped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::figma::{FileDocument, ImagesResponse};
    use crate::domain::BoundingBox;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Records every batch it is asked for and answers from a fixed table
    struct RecordingApi {
        calls: Mutex<Vec<Vec<String>>>,
        omit: Vec<String>,
        err: Option<String>,
    }

    impl RecordingApi {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                omit: Vec::new(),
                err: None,
            }
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DesignApi for RecordingApi {
        async fn get_file(&self, _file_key: &FileKey) -> Result<FileDocument> {
            unreachable!("batcher never fetches documents")
        }

        async fn get_images(
            &self,
            _file_key: &FileKey,
            ids: &[NodeId],
            _options: &ImageExportOptions,
        ) -> Result<ImagesResponse> {
            let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
            self.calls.lock().unwrap().push(ids.clone());

            let images: HashMap<String, Option<String>> = ids
                .into_iter()
                .filter(|id| !self.omit.contains(id))
                .map(|id| {
                    let url = format!("https://img.example/{id}.png");
                    (id, Some(url))
                })
                .collect();

            Ok(ImagesResponse {
                err: self.err.clone(),
                images,
            })
        }

        fn base_url(&self) -> &str {
            "memory://"
        }
    }

    fn nodes(count: usize) -> Vec<ExportableNode> {
        (0..count)
            .map(|i| {
                ExportableNode::new(
                    NodeId::new(format!("1:{i}")).unwrap(),
                    format!("Frame {i}"),
                    format!("Page / Frame {i}"),
                    BoundingBox::new(0.0, 0.0, 10.0, 10.0),
                )
            })
            .collect()
    }

    fn key() -> FileKey {
        FileKey::new("abc123").unwrap()
    }

    #[test]
    fn test_batch_size_bounds() {
        assert!(ImageExportBatcher::new(0).is_err());
        assert!(ImageExportBatcher::new(1).is_ok());
        assert!(ImageExportBatcher::new(MAX_BATCH_SIZE).is_ok());
        assert!(ImageExportBatcher::new(MAX_BATCH_SIZE + 1).is_err());
        assert_eq!(ImageExportBatcher::default().batch_size(), DEFAULT_BATCH_SIZE);
    }

    #[tokio::test]
    async fn test_250_nodes_split_into_three_batches() {
        let api = RecordingApi::new();
        let mut nodes = nodes(250);

        let result = ImageExportBatcher::new(100)
            .unwrap()
            .export(&api, &key(), &mut nodes, &ImageExportOptions::default())
            .await
            .unwrap();

        let calls = api.calls();
        assert_eq!(
            calls.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![100, 100, 50]
        );
        assert_eq!(calls[0][0], "1:0");
        assert_eq!(calls[1][0], "1:100");
        assert_eq!(calls[2][49], "1:249");

        assert_eq!(result.batches, 3);
        assert_eq!(result.exported, 250);
        assert!(nodes
            .iter()
            .all(|n| n.image_url == format!("https://img.example/{}.png", n.node_id)));
    }

    #[tokio::test]
    async fn test_omitted_id_keeps_empty_url() {
        let mut api = RecordingApi::new();
        api.omit.push("1:1".to_string());
        let mut nodes = nodes(3);

        let result = ImageExportBatcher::default()
            .export(&api, &key(), &mut nodes, &ImageExportOptions::default())
            .await
            .unwrap();

        assert_eq!(result.exported, 2);
        assert_eq!(result.missing, 1);
        assert!(nodes[0].is_exported());
        assert!(nodes[1].image_url.is_empty());
        assert!(nodes[2].is_exported());
    }

    #[tokio::test]
    async fn test_top_level_err_fails_export() {
        let mut api = RecordingApi::new();
        api.err = Some("Render timeout".to_string());
        let mut nodes = nodes(2);

        let result = ImageExportBatcher::default()
            .export(&api, &key(), &mut nodes, &ImageExportOptions::default())
            .await;

        match result {
            Err(DesignExportError::Api(DesignApiError::ExportFailed(msg))) => {
                assert_eq!(msg, "Render timeout");
            }
            other => panic!("expected ExportFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_input_issues_no_requests() {
        let api = RecordingApi::new();
        let mut nodes = Vec::new();

        let result = ImageExportBatcher::default()
            .export(&api, &key(), &mut nodes, &ImageExportOptions::default())
            .await
            .unwrap();

        assert_eq!(result, BatchResult::default());
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_apply_frame_cap_truncates_in_order() {
        let mut list = nodes(5);
        assert_eq!(apply_frame_cap(&mut list, 3), 2);
        assert_eq!(list.len(), 3);
        assert_eq!(list[2].node_id.as_str(), "1:2");

        assert_eq!(apply_frame_cap(&mut list, 10), 0);
        assert_eq!(list.len(), 3);
    }
}
