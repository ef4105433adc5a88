//! Domain models and types for design-export.
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`FileKey`], [`NodeId`])
//! - **Domain models** ([`ExportableNode`], [`BoundingBox`])
//! - **Error types** ([`DesignExportError`], [`DesignApiError`], [`CacheError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers use the newtype pattern so a node id can't be passed where a
//! file key is expected:
//!
//! ```rust
//! use design_export::domain::{FileKey, NodeId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let file_key = FileKey::new("aBcD1234")?;
//! let node_id = NodeId::new("12:345")?;
//!
//! // let wrong: FileKey = node_id;  // Compile error!
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod node;
pub mod result;

pub use errors::{CacheError, DesignApiError, DesignExportError};
pub use ids::{FileKey, NodeId};
pub use node::{BoundingBox, ExportableNode};
pub use result::Result;
