//! Figma adapter implementation
//!
//! This module provides the integration with the Figma REST API: the
//! [`DesignApi`] trait, its HTTP implementation [`FigmaClient`], and the
//! API request/response models.

pub mod api;
pub mod client;
pub mod models;

pub use api::DesignApi;
pub use client::FigmaClient;
pub use models::{FileDocument, ImageExportOptions, ImageFormat, ImagesResponse, Node, NodeKind};
