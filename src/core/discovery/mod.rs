//! Exportable node discovery
//!
//! Walks the document tree returned by the design API and collects every
//! node that can be rendered to an image on its own.

pub mod walker;

pub use walker::{find_frames, PATH_SEPARATOR};
