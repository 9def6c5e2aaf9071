//! Hidden HTML-comment markers at the top of the bot comment.
//!
//! ```text
//! <!-- policy_violation_comment -->
//! <!-- violated_reports: license_scanning,scan_finding -->
//! <!-- optional_approvals: license_scanning -->
//! ```

use std::collections::BTreeSet;

use mrguard_core::constants::MESSAGE_HEADER;
use mrguard_core::types::ReportType;

const VIOLATED_REPORTS: &str = "violated_reports:";
const OPTIONAL_APPROVALS: &str = "optional_approvals:";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentMarkers {
    pub violated_reports: BTreeSet<ReportType>,
    pub optional_approvals: BTreeSet<ReportType>,
}

impl CommentMarkers {
    /// Read markers from an existing comment body. Unknown report names are
    /// dropped.
    pub fn parse(body: &str) -> Self {
        let mut markers = Self::default();
        for line in body.lines() {
            let Some(inner) = line
                .trim()
                .strip_prefix("<!--")
                .and_then(|rest| rest.strip_suffix("-->"))
            else {
                continue;
            };
            let inner = inner.trim();
            if let Some(list) = inner.strip_prefix(VIOLATED_REPORTS) {
                markers.violated_reports.extend(parse_list(list));
            } else if let Some(list) = inner.strip_prefix(OPTIONAL_APPROVALS) {
                markers.optional_approvals.extend(parse_list(list));
            }
        }
        markers
    }

    /// Report types whose approvals are required (not optional).
    pub fn required_reports(&self) -> impl Iterator<Item = ReportType> + '_ {
        self.violated_reports
            .iter()
            .filter(|r| !self.optional_approvals.contains(r))
            .copied()
    }

    pub fn only_optional_approvals(&self) -> bool {
        !self.violated_reports.is_empty() && self.required_reports().next().is_none()
    }

    /// Header and marker lines, newline-terminated.
    pub fn render(&self) -> String {
        let mut out = format!(
            "{MESSAGE_HEADER}\n<!-- {VIOLATED_REPORTS} {} -->\n",
            join_sorted(&self.violated_reports)
        );
        if !self.optional_approvals.is_empty() {
            out.push_str(&format!(
                "<!-- {OPTIONAL_APPROVALS} {} -->\n",
                join_sorted(&self.optional_approvals)
            ));
        }
        out
    }
}

fn parse_list(list: &str) -> impl Iterator<Item = ReportType> + '_ {
    list.split(',')
        .filter_map(|name| ReportType::parse(name.trim()))
}

/// Comma-joined report names in alphabetical order.
fn join_sorted(reports: &BTreeSet<ReportType>) -> String {
    let mut names: Vec<&str> = reports.iter().map(|r| r.as_str()).collect();
    names.sort_unstable();
    names.join(",")
}
