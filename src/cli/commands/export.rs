//! Export command implementation
//!
//! This module implements the `export` command: render every frame of a
//! design file and download the images into the local cache.

use super::{EXIT_CONFIG, EXIT_CONNECTION, EXIT_FATAL, EXIT_PARTIAL, EXIT_SUCCESS};
use crate::config::load_config;
use crate::core::export::{ExportAllOptions, ExportCoordinator, ExportSummary};
use crate::domain::{DesignExportError, ExportableNode, FileKey};
use clap::Args;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// File key, or a file URL containing one
    #[arg(value_name = "FILE_KEY")]
    pub file_key: String,

    /// Override the maximum number of frames to export
    #[arg(long)]
    pub max_frames: Option<usize>,

    /// Request render URLs only, without downloading images
    #[arg(long)]
    pub no_download: bool,

    /// Override image format (png, jpg, svg, pdf)
    #[arg(long)]
    pub format: Option<String>,

    /// Override render scale (0.01-4)
    #[arg(long)]
    pub scale: Option<f64>,

    /// Write the exported node list as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub manifest: Option<String>,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let file_key = match FileKey::from_url_or_key(&self.file_key) {
            Ok(key) => key,
            Err(e) => {
                tracing::error!(input = %self.file_key, error = %e, "Invalid file key");
                eprintln!("Invalid file key: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        // Apply CLI overrides
        if let Some(max_frames) = self.max_frames {
            tracing::info!(max_frames, "Overriding max_frames from CLI");
            config.export.max_frames = max_frames;
        }
        if self.no_download {
            tracing::info!("Disabling image download from CLI");
            config.export.download_images = false;
        }
        if let Some(format) = &self.format {
            tracing::info!(format = %format, "Overriding image format from CLI");
            config.export.format = format.clone();
        }
        if let Some(scale) = self.scale {
            tracing::info!(scale, "Overriding render scale from CLI");
            config.export.scale = scale;
        }
        if let Some(manifest) = &self.manifest {
            config.export.manifest_path = Some(manifest.clone());
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIG);
        }

        let coordinator = match ExportCoordinator::new(&config) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create export coordinator");
                eprintln!("Failed to initialize export: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let options = ExportAllOptions {
            max_frames: config.export.max_frames,
            download_images: config.export.download_images,
        };

        println!("🚀 Exporting frames from {file_key}...");
        println!();

        let start_time = Instant::now();
        let nodes = match coordinator.export_all(&file_key, &options).await {
            Ok(nodes) => nodes,
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("Export failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let summary = ExportSummary::from_nodes(&file_key, &nodes, start_time.elapsed());
        summary.log_summary();

        if let Some(manifest_path) = &config.export.manifest_path {
            if let Err(e) = write_manifest(Path::new(manifest_path), &summary, &nodes).await {
                tracing::error!(path = %manifest_path, error = %e, "Failed to write manifest");
                eprintln!("Failed to write manifest {manifest_path}: {e}");
                return Ok(EXIT_FATAL);
            }
            println!("📝 Manifest written to {manifest_path}");
        }

        print_summary(&summary, &nodes, options.download_images, coordinator.cache().directory());

        let exit_code = if !summary.is_complete()
            || (options.download_images && summary.not_cached > 0)
        {
            println!("⚠️  Export completed with missing images");
            EXIT_PARTIAL
        } else {
            println!("✅ Export completed successfully!");
            EXIT_SUCCESS
        };

        Ok(exit_code)
    }
}

/// Map a run failure onto the CLI exit codes
pub fn exit_code_for(error: &DesignExportError) -> i32 {
    match error {
        DesignExportError::Configuration(_) | DesignExportError::Validation(_) => EXIT_CONFIG,
        DesignExportError::Api(_) | DesignExportError::Timeout(_) => EXIT_CONNECTION,
        _ => EXIT_FATAL,
    }
}

#[derive(Serialize)]
struct Manifest<'a> {
    summary: &'a ExportSummary,
    nodes: &'a [ExportableNode],
}

async fn write_manifest(
    path: &Path,
    summary: &ExportSummary,
    nodes: &[ExportableNode],
) -> crate::domain::Result<()> {
    let manifest = Manifest { summary, nodes };
    let body = serde_json::to_string_pretty(&manifest)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, body).await?;
    Ok(())
}

fn print_summary(
    summary: &ExportSummary,
    nodes: &[ExportableNode],
    downloaded: bool,
    cache_dir: &Path,
) {
    println!();
    println!("📊 Export Summary:");
    println!("  File: {}", summary.file_key);
    println!("  Frames: {}", summary.total_nodes);
    println!("  Exported: {}", summary.exported);
    if downloaded {
        println!("  Cached: {}", summary.cached);
        println!("  Cache Directory: {}", cache_dir.display());
    }
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    let missing: Vec<&ExportableNode> = nodes
        .iter()
        .filter(|n| !n.is_exported() || (downloaded && !n.is_cached()))
        .collect();
    if !missing.is_empty() {
        println!("⚠️  Unavailable frames:");
        for node in missing.iter().take(10) {
            let reason = if node.is_exported() {
                "download failed"
            } else {
                "no render URL"
            };
            println!("  - {} ({}): {}", node.path, node.node_id, reason);
        }
        if missing.len() > 10 {
            println!("  ... and {} more", missing.len() - 10);
        }
        println!();
    }
}
