//! Export summary and reporting
//!
//! This module condenses the node list returned by an export run into the
//! counters printed by the CLI and logged at the end of a run.

use crate::domain::{ExportableNode, FileKey};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Summary of an export operation
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    /// File the nodes were exported from
    pub file_key: String,

    /// Nodes returned by the run, after the frame cap
    pub total_nodes: usize,

    /// Nodes that received a render URL
    pub exported: usize,

    /// Nodes with an image on disk
    pub cached: usize,

    /// Nodes the provider returned no render URL for
    pub not_exported: usize,

    /// Exported nodes whose download failed or was skipped
    pub not_cached: usize,

    /// Duration of the export
    #[serde(with = "duration_millis")]
    pub duration: Duration,

    /// When the run finished
    pub completed_at: DateTime<Utc>,
}

impl ExportSummary {
    /// Build a summary from the nodes returned by an export run
    pub fn from_nodes(file_key: &FileKey, nodes: &[ExportableNode], duration: Duration) -> Self {
        let exported = nodes.iter().filter(|n| n.is_exported()).count();
        let cached = nodes.iter().filter(|n| n.is_cached()).count();

        Self {
            file_key: file_key.to_string(),
            total_nodes: nodes.len(),
            exported,
            cached,
            not_exported: nodes.len() - exported,
            not_cached: exported.saturating_sub(cached),
            duration,
            completed_at: Utc::now(),
        }
    }

    /// True when every node was exported
    ///
    /// Download misses don't count against this; callers that skip
    /// downloads would otherwise always see a partial run.
    pub fn is_complete(&self) -> bool {
        self.not_exported == 0
    }

    /// Percentage of nodes that received a render URL
    pub fn export_rate(&self) -> f64 {
        if self.total_nodes == 0 {
            return 100.0;
        }
        (self.exported as f64 / self.total_nodes as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            file_key = %self.file_key,
            total_nodes = self.total_nodes,
            exported = self.exported,
            cached = self.cached,
            duration_secs = self.duration.as_secs(),
            export_rate = format!("{:.2}%", self.export_rate()),
            "Export completed"
        );

        if self.not_exported > 0 || self.not_cached > 0 {
            tracing::warn!(
                not_exported = self.not_exported,
                not_cached = self.not_cached,
                "Some nodes are unavailable"
            );
        }
    }
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}
