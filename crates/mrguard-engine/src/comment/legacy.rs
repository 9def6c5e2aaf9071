//! Marker-only comment body, updated incrementally per report type.

use mrguard_core::types::ReportType;

use super::markers::CommentMarkers;
use super::OPTIONAL_APPROVALS_NOTE;

/// Builds the body from the markers of the existing comment plus the
/// triggering report type. Does not read stored violations.
#[derive(Debug, Clone, Default)]
pub struct LegacyCommentBuilder {
    markers: CommentMarkers,
}

impl LegacyCommentBuilder {
    pub fn from_existing(existing_body: Option<&str>) -> Self {
        Self {
            markers: existing_body.map(CommentMarkers::parse).unwrap_or_default(),
        }
    }

    pub fn add_report_type(&mut self, report_type: ReportType, requires_approval: bool) {
        if requires_approval {
            self.markers.optional_approvals.remove(&report_type);
        } else {
            self.markers.optional_approvals.insert(report_type);
        }
        self.markers.violated_reports.insert(report_type);
    }

    pub fn remove_report_type(&mut self, report_type: ReportType) {
        self.markers.violated_reports.remove(&report_type);
        self.markers.optional_approvals.remove(&report_type);
    }

    pub fn markers(&self) -> &CommentMarkers {
        &self.markers
    }

    /// `None` when no report is violated.
    pub fn body(&self) -> Option<String> {
        if self.markers.violated_reports.is_empty() {
            return None;
        }
        let mut body = self.markers.render();
        body.push_str(":warning: **Policy violation(s) detected**\n\n");
        if self.markers.only_optional_approvals() {
            body.push_str(OPTIONAL_APPROVALS_NOTE);
        } else {
            body.push_str(
                "This merge request violates one or more security policies and requires \
                 approval from eligible approvers.",
            );
        }
        body.push('\n');
        Some(body)
    }
}
