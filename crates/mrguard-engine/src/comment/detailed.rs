//! Comment body derived from the merge request's stored violations.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use mrguard_core::types::{
    ApprovalRule, Fingerprint, PipelineId, PolicyId, ReportType, ViolationErrorEntry,
    ViolationErrorKind, ViolationRecord,
};

use super::markers::CommentMarkers;
use super::OPTIONAL_APPROVALS_NOTE;

/// Human-readable text for a structured evaluation error.
pub fn error_message(entry: &ViolationErrorEntry, policy: &str, report_type: ReportType) -> String {
    match entry.error {
        ViolationErrorKind::ScanRemoved => {
            let scans: Vec<String> = entry.missing_scans.iter().map(|s| s.humanize()).collect();
            format!(
                "There is a mismatch between the scans of the source and target pipelines. \
                 The following scans are missing: {}",
                scans.join(", ")
            )
        }
        ViolationErrorKind::ArtifactsMissing => format!(
            "Pipeline configuration error: Artifacts required by policy `{policy}` could not be \
             found ({report_type})."
        ),
        ViolationErrorKind::Unknown => format!(
            "Unknown error: {}",
            entry.message.as_deref().unwrap_or(entry.error.as_str())
        ),
    }
}

/// Joins violation rows to the approval rules of their policies.
pub struct DetailedCommentBuilder<'a> {
    violations: &'a [ViolationRecord],
    rules: &'a [ApprovalRule],
    max_violations: usize,
}

/// Violation row plus what its rules say about it.
struct JoinedViolation<'a> {
    record: &'a ViolationRecord,
    policy_name: String,
    report_type: ReportType,
}

impl<'a> DetailedCommentBuilder<'a> {
    pub fn new(
        violations: &'a [ViolationRecord],
        rules: &'a [ApprovalRule],
        max_violations: usize,
    ) -> Self {
        Self {
            violations,
            rules,
            max_violations,
        }
    }

    /// Report types with violations, split into required and optional.
    pub fn markers(&self) -> CommentMarkers {
        let violated: BTreeSet<PolicyId> = self
            .violations
            .iter()
            .map(|v| v.scan_result_policy_id)
            .collect();

        let mut requires: BTreeMap<ReportType, bool> = BTreeMap::new();
        for rule in self.rules {
            let Some(policy_id) = rule.scan_result_policy_id else {
                continue;
            };
            if violated.contains(&policy_id) {
                *requires.entry(rule.report_type()).or_default() |= rule.requires_approval();
            }
        }

        CommentMarkers {
            violated_reports: requires.keys().copied().collect(),
            optional_approvals: requires
                .iter()
                .filter(|(_, required)| !**required)
                .map(|(report, _)| *report)
                .collect(),
        }
    }

    /// `None` when no stored violation maps to a rule.
    pub fn body(&self) -> Option<String> {
        let markers = self.markers();
        if markers.violated_reports.is_empty() {
            return None;
        }
        let joined = self.joined();

        let mut body = markers.render();
        body.push_str(":warning: **Violations detected in this merge request**\n\n");
        if markers.only_optional_approvals() {
            body.push_str(OPTIONAL_APPROVALS_NOTE);
        } else {
            body.push_str(
                "Based on your organization's security policies, this merge request has \
                 violations. To resolve them, fix the findings or ask eligible approvers of \
                 each policy to approve this merge request.",
            );
        }
        body.push_str("\n\n");

        self.render_policies(&mut body, &joined);
        self.render_fingerprints(&mut body, &joined);
        self.render_errors(&mut body, &joined);
        self.render_licenses(&mut body, &joined);
        self.render_commits(&mut body, &joined);
        self.render_pipelines(&mut body, &joined);

        Some(body.trim_end().to_string() + "\n")
    }

    fn joined(&self) -> Vec<JoinedViolation<'a>> {
        self.violations
            .iter()
            .filter_map(|record| {
                let rule = self
                    .rules
                    .iter()
                    .find(|r| r.scan_result_policy_id == Some(record.scan_result_policy_id))?;
                Some(JoinedViolation {
                    record,
                    policy_name: rule
                        .policy_name
                        .clone()
                        .unwrap_or_else(|| format!("Policy #{}", record.scan_result_policy_id)),
                    report_type: rule.report_type(),
                })
            })
            .collect()
    }

    fn render_policies(&self, body: &mut String, joined: &[JoinedViolation<'_>]) {
        body.push_str("#### Policies\n");
        for v in joined {
            let _ = writeln!(body, "- `{}` ({})", v.policy_name, v.report_type);
        }
        body.push('\n');
    }

    fn render_fingerprints(&self, body: &mut String, joined: &[JoinedViolation<'_>]) {
        let mut newly_detected = Vec::new();
        let mut previously_existing = Vec::new();
        for v in joined {
            if let Some(scan) = &v.record.violation_data.violations.scan_finding {
                newly_detected.extend(scan.uuids.newly_detected.iter());
                previously_existing.extend(scan.uuids.previously_existing.iter());
            }
        }
        self.render_fingerprint_list(body, "Newly detected vulnerabilities", newly_detected);
        self.render_fingerprint_list(body, "Previously existing vulnerabilities", previously_existing);
    }

    fn render_fingerprint_list(&self, body: &mut String, title: &str, fingerprints: Vec<&Fingerprint>) {
        let mut seen = BTreeSet::new();
        let unique: Vec<&Fingerprint> = fingerprints.into_iter().filter(|f| seen.insert(*f)).collect();
        if unique.is_empty() {
            return;
        }
        let _ = writeln!(body, "#### {title}\n");
        for fingerprint in unique.iter().take(self.max_violations) {
            let _ = writeln!(body, "- `{fingerprint}`");
        }
        if unique.len() > self.max_violations {
            let _ = writeln!(body, "- ...and more than {} in total", self.max_violations);
        }
        body.push('\n');
    }

    fn render_errors(&self, body: &mut String, joined: &[JoinedViolation<'_>]) {
        let mut messages: Vec<String> = Vec::new();
        for v in joined {
            for entry in &v.record.violation_data.errors {
                let message = error_message(entry, &v.policy_name, v.report_type);
                if !messages.contains(&message) {
                    messages.push(message);
                }
            }
        }
        if messages.is_empty() {
            return;
        }
        body.push_str("#### Errors\n\n");
        for message in messages {
            let _ = writeln!(body, "- {message}");
        }
        body.push('\n');
    }

    fn render_licenses(&self, body: &mut String, joined: &[JoinedViolation<'_>]) {
        let mut licenses: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for v in joined {
            if let Some(by_license) = &v.record.violation_data.violations.license_scanning {
                for (license, dependencies) in by_license {
                    licenses
                        .entry(license.as_str())
                        .or_default()
                        .extend(dependencies.iter().map(String::as_str));
                }
            }
        }
        if licenses.is_empty() {
            return;
        }
        body.push_str("#### Out-of-policy licenses\n\n");
        for (license, dependencies) in licenses {
            let deps: Vec<String> = dependencies.iter().map(|d| format!("`{d}`")).collect();
            let _ = writeln!(body, "- {license}: used by {}", deps.join(", "));
        }
        body.push('\n');
    }

    fn render_commits(&self, body: &mut String, joined: &[JoinedViolation<'_>]) {
        let commits: BTreeSet<&str> = joined
            .iter()
            .filter_map(|v| v.record.violation_data.violations.any_merge_request.as_ref())
            .flat_map(|any| any.commits.iter().map(String::as_str))
            .collect();
        if commits.is_empty() {
            return;
        }
        body.push_str("#### Commits requiring approval\n\n");
        for sha in commits.iter().take(self.max_violations) {
            let _ = writeln!(body, "- `{sha}`");
        }
        body.push('\n');
    }

    fn render_pipelines(&self, body: &mut String, joined: &[JoinedViolation<'_>]) {
        let mut source: BTreeSet<PipelineId> = BTreeSet::new();
        let mut target: BTreeSet<PipelineId> = BTreeSet::new();
        for v in joined {
            if let Some(context) = &v.record.violation_data.context {
                source.extend(context.pipeline_ids.iter().copied());
                target.extend(context.target_pipeline_ids.iter().copied());
            }
        }
        if source.is_empty() && target.is_empty() {
            return;
        }
        body.push_str("#### Comparison pipelines\n\n");
        if !target.is_empty() {
            let _ = writeln!(body, "- Target branch: {}", pipeline_list(&target));
        }
        if !source.is_empty() {
            let _ = writeln!(body, "- Source branch: {}", pipeline_list(&source));
        }
    }
}

fn pipeline_list(ids: &BTreeSet<PipelineId>) -> String {
    ids.iter()
        .map(|id| format!("#{id}"))
        .collect::<Vec<_>>()
        .join(", ")
}
