// design-export - Rate-limited, cached image exporter for design files
// Copyright (c) 2025 Design Export Contributors
// Licensed under the MIT License

//! # design-export
//!
//! Exports every frame-like node of a remote design file as a rendered image
//! and keeps the images in a local cache, for visual regression tooling and
//! asset pipelines.
//!
//! ## Overview
//!
//! This library provides:
//! - **Discovering** frames and components in the document tree, with their
//!   ancestor paths
//! - **Exporting** render URLs in batches, throttled per API tier
//! - **Caching** rendered images on disk, keyed by node id
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Rate limiter, tree walk, batching, cache, coordination
//! - [`adapters`] - Design API client and models
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use design_export::config::load_config;
//! use design_export::core::export::{ExportAllOptions, ExportCoordinator};
//! use design_export::domain::FileKey;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("design-export.toml")?;
//!     let coordinator = ExportCoordinator::new(&config)?;
//!
//!     let key = FileKey::from_url_or_key("https://www.figma.com/file/aBcD1234/Landing")?;
//!     let nodes = coordinator.export_all(&key, &ExportAllOptions::default()).await?;
//!
//!     println!("Exported {} frames", nodes.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Rate Limiting
//!
//! Each API tier has its own FIFO [`RateLimiter`](core::ratelimit::RateLimiter)
//! that spaces dispatches at least `ceil(60000 / rpm)` ms apart:
//!
//! ```rust
//! use design_export::core::ratelimit::RateLimiter;
//! use std::time::Duration;
//!
//! let limiter = RateLimiter::new("tier1", 10);
//! assert_eq!(limiter.min_interval(), Duration::from_millis(6000));
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`], whose error type
//! [`domain::DesignExportError`] wraps API and cache failures:
//!
//! ```rust
//! use design_export::domain::{DesignApiError, DesignExportError};
//!
//! let err: DesignExportError = DesignApiError::ExportFailed("Render timeout".into()).into();
//! assert!(err.to_string().contains("Render timeout"));
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
