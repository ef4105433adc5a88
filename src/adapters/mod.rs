//! Adapters for external systems
//!
//! - [`figma`] - Design file REST API: document tree and image rendering

pub mod figma;
