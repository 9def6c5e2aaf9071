//! Pipeline status and the pipeline-completion event.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::identifiers::PipelineId;
use super::merge_request::MergeRequest;
use super::vulnerability::ScanType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    Created,
    WaitingForResource,
    Preparing,
    Pending,
    Running,
    Success,
    Failed,
    Canceled,
    Skipped,
    Manual,
    Scheduled,
}

impl PipelineStatus {
    /// Terminal state.
    pub fn is_complete(self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::Canceled | Self::Skipped)
    }

    /// Terminal state, or waiting on a manual job.
    pub fn is_complete_or_manual(self) -> bool {
        self.is_complete() || self == Self::Manual
    }
}

/// What the engine needs to know about one pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSnapshot {
    pub id: PipelineId,
    pub status: PipelineStatus,
    pub can_store_security_reports: bool,
    /// Pipelines whose security reports belong to this one (e.g. policy
    /// pipelines on the same commit), including `id` itself.
    pub related_pipeline_ids: Vec<PipelineId>,
    /// Security scans that ran across the related pipelines.
    pub scan_types: BTreeSet<ScanType>,
}

impl PipelineSnapshot {
    pub fn is_complete(&self, include_manual: bool) -> bool {
        if include_manual {
            self.status.is_complete_or_manual()
        } else {
            self.status.is_complete()
        }
    }
}

/// Event delivered when a merge request pipeline finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineCompletion {
    pub merge_request: MergeRequest,
    pub pipeline: PipelineSnapshot,
}
