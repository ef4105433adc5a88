//! Export coordinator - main orchestrator for the export process
//!
//! Ties together the document fetch, tree walk, frame cap, batched image
//! export and cached downloads for one file.

use crate::adapters::figma::{DesignApi, FigmaClient, ImageExportOptions};
use crate::config::DesignExportConfig;
use crate::core::cache::ContentAddressedCache;
use crate::core::discovery::find_frames;
use crate::core::export::batch::{apply_frame_cap, ImageExportBatcher, DEFAULT_MAX_FRAMES};
use crate::domain::{DesignExportError, ExportableNode, FileKey, Result};
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-run options for [`ExportCoordinator::export_all`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportAllOptions {
    /// Nodes kept after discovery, in discovery order
    pub max_frames: usize,
    /// Resolve rendered images through the cache
    pub download_images: bool,
}

impl Default for ExportAllOptions {
    fn default() -> Self {
        Self {
            max_frames: DEFAULT_MAX_FRAMES,
            download_images: true,
        }
    }
}

/// Export coordinator
pub struct ExportCoordinator {
    api: Arc<dyn DesignApi>,
    batcher: ImageExportBatcher,
    cache: ContentAddressedCache,
    image_options: ImageExportOptions,
    download_concurrency: usize,
}

impl ExportCoordinator {
    /// Create a coordinator backed by the HTTP client
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the client, batcher or image
    /// options can't be built from `config`.
    pub fn new(config: &DesignExportConfig) -> Result<Self> {
        let api: Arc<dyn DesignApi> = Arc::new(FigmaClient::new(config.figma.clone())?);
        let batcher = ImageExportBatcher::new(config.export.batch_size)?;

        let format = config
            .export
            .image_format()
            .map_err(DesignExportError::Configuration)?;
        let image_options = ImageExportOptions {
            format,
            scale: config.export.scale,
        };

        // Downloads go to pre-signed URLs and must not carry the API token
        let download_http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.figma.timeout_seconds))
            .build()
            .map_err(|e| {
                DesignExportError::Configuration(format!("Failed to build download client: {e}"))
            })?;
        let cache = ContentAddressedCache::new(&config.cache.directory, download_http)
            .with_extension(format.as_str());

        Ok(Self::with_components(
            api,
            batcher,
            cache,
            image_options,
            config.export.download_concurrency,
        ))
    }

    /// Create a coordinator from already-built parts
    pub fn with_components(
        api: Arc<dyn DesignApi>,
        batcher: ImageExportBatcher,
        cache: ContentAddressedCache,
        image_options: ImageExportOptions,
        download_concurrency: usize,
    ) -> Self {
        Self {
            api,
            batcher,
            cache,
            image_options,
            download_concurrency: download_concurrency.max(1),
        }
    }

    /// Image cache used for downloads
    pub fn cache(&self) -> &ContentAddressedCache {
        &self.cache
    }

    /// Export every frame-like node of `file_key`
    ///
    /// Steps, in order:
    /// 1. Fetch the file document
    /// 2. Walk the tree for exportable nodes
    /// 3. Keep the first `max_frames` nodes
    /// 4. Request render URLs in batches
    /// 5. If enabled, resolve each exported node through the cache
    ///
    /// Nodes are returned in discovery order. A node without a render URL,
    /// or whose download failed, is still returned with the corresponding
    /// field unset.
    ///
    /// # Errors
    ///
    /// Fails if the document can't be fetched or is malformed, or if any
    /// export batch fails. Download failures are never fatal.
    pub async fn export_all(
        &self,
        file_key: &FileKey,
        options: &ExportAllOptions,
    ) -> Result<Vec<ExportableNode>> {
        let start_time = Instant::now();
        crate::log_export_start!(file_key, options.max_frames);

        let document = self.api.get_file(file_key).await?;

        let mut nodes = find_frames(&document.document, &[]);
        tracing::info!(
            file_key = %file_key,
            document = %document.name,
            discovered = nodes.len(),
            "Discovered exportable nodes"
        );

        apply_frame_cap(&mut nodes, options.max_frames);
        if nodes.is_empty() {
            tracing::info!(file_key = %file_key, "Nothing to export");
            return Ok(nodes);
        }

        let batch_result = self
            .batcher
            .export(self.api.as_ref(), file_key, &mut nodes, &self.image_options)
            .await?;
        tracing::info!(
            file_key = %file_key,
            batches = batch_result.batches,
            exported = batch_result.exported,
            missing = batch_result.missing,
            "Render URLs received"
        );

        let cached = if options.download_images {
            self.download_all(&mut nodes).await
        } else {
            tracing::debug!("Image download disabled");
            0
        };

        crate::log_export_complete!(batch_result.exported, cached, start_time.elapsed());
        Ok(nodes)
    }

    /// Resolve every exported node through the cache; returns how many succeeded
    async fn download_all(&self, nodes: &mut [ExportableNode]) -> usize {
        let jobs: Vec<(usize, String, String)> = nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_exported())
            .map(|(index, node)| (index, node.node_id.to_string(), node.image_url.clone()))
            .collect();

        let cache = &self.cache;
        let results: Vec<(usize, Result<PathBuf>)> = stream::iter(jobs)
            .map(|(index, key, url)| async move {
                let result = cache.resolve(&key, &url).await;
                (index, result)
            })
            .buffer_unordered(self.download_concurrency)
            .collect()
            .await;

        let mut cached = 0;
        for (index, result) in results {
            let node = &mut nodes[index];
            match result {
                Ok(path) => {
                    node.local_path = Some(path);
                    cached += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        node_id = %node.node_id,
                        name = %node.name,
                        error = %e,
                        "Failed to cache image, skipping"
                    );
                }
            }
        }
        cached
    }
}
