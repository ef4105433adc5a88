//! Design API trait definition
//!
//! [`DesignApi`] abstracts the two remote calls the exporter depends on, so
//! that the batcher and coordinator can be driven by the real HTTP client or
//! by an in-memory implementation in tests.

use super::models::{FileDocument, ImageExportOptions, ImagesResponse};
use crate::domain::{FileKey, NodeId, Result};
use async_trait::async_trait;

/// Remote design-file API
///
/// Implementations are responsible for rate limiting: the document fetch and
/// the image export belong to different provider tiers and must each be
/// throttled to their own ceiling.
///
/// # Example
///
/// ```no_run
/// use design_export::adapters::figma::{DesignApi, FigmaClient, ImageExportOptions};
/// use design_export::config::FigmaConfig;
/// use design_export::domain::{FileKey, NodeId};
///
/// # async fn example() -> design_export::domain::Result<()> {
/// let client = FigmaClient::new(FigmaConfig::default())?;
/// let key = FileKey::new("aBcD1234").map_err(design_export::domain::DesignExportError::Validation)?;
///
/// let file = client.get_file(&key).await?;
/// println!("Fetched {}", file.name);
///
/// let ids = vec![NodeId::new("1:2").map_err(design_export::domain::DesignExportError::Validation)?];
/// let images = client.get_images(&key, &ids, &ImageExportOptions::default()).await?;
/// println!("{} urls", images.images.len());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait DesignApi: Send + Sync {
    /// Fetch the structural document of a file
    ///
    /// The returned document has passed [`FileDocument::validate`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the server answers with a
    /// non-success status, or the body isn't a well-formed document.
    /// A document that fails validation is a
    /// [`DesignApiError::MalformedDocument`](crate::domain::DesignApiError::MalformedDocument).
    async fn get_file(&self, file_key: &FileKey) -> Result<FileDocument>;

    /// Request render URLs for a batch of nodes
    ///
    /// The response is returned as-is, including its `err` field;
    /// interpreting a top-level error or missing ids is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server answers with a
    /// non-success status.
    async fn get_images(
        &self,
        file_key: &FileKey,
        ids: &[NodeId],
        options: &ImageExportOptions,
    ) -> Result<ImagesResponse>;

    /// Base URL of the API, for logging
    fn base_url(&self) -> &str;
}
