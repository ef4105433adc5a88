//! Local image cache
//!
//! Rendered images are stored under a key derived from the node id so that
//! repeated runs skip downloads for nodes already on disk.

pub mod store;

pub use store::{sanitize_key, ContentAddressedCache};
