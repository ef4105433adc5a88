//! Export orchestration and batch processing
//!
//! This module provides the export pipeline:
//! - Batched image export requests
//! - Export coordination across fetch, walk, export and download
//! - Summary and reporting

pub mod batch;
pub mod coordinator;
pub mod summary;

pub use batch::{apply_frame_cap, BatchResult, ImageExportBatcher};
pub use coordinator::{ExportAllOptions, ExportCoordinator};
pub use summary::ExportSummary;
