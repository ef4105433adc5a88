//! Core export logic.
//!
//! # Modules
//!
//! - [`ratelimit`] - Per-tier FIFO rate limiter
//! - [`discovery`] - Depth-first walk of the document tree
//! - [`export`] - Batched image export and run coordination
//! - [`cache`] - Key-addressed local image cache
//!
//! # Export Workflow
//!
//! 1. **Fetch**: Read the file document (tier 2 limiter)
//! 2. **Discover**: Collect frame and component nodes with their paths
//! 3. **Cap**: Keep the first `max_frames` nodes
//! 4. **Export**: Request render URLs in batches (tier 1 limiter)
//! 5. **Download**: Resolve each render URL through the cache
//!
//! # Example
//!
//! ```rust,no_run
//! use design_export::config::load_config;
//! use design_export::core::export::{ExportAllOptions, ExportCoordinator};
//! use design_export::domain::FileKey;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("design-export.toml")?;
//! let coordinator = ExportCoordinator::new(&config)?;
//!
//! let key = FileKey::new("aBcD1234")?;
//! let nodes = coordinator.export_all(&key, &ExportAllOptions::default()).await?;
//!
//! for node in &nodes {
//!     println!("{} -> {:?}", node.path, node.local_path);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod discovery;
pub mod export;
pub mod ratelimit;
