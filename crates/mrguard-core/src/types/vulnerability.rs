//! Vulnerability filter vocabulary: states, severities, scan types, age.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Vulnerability state as referenced by policy rules.
///
/// `NewNeedsTriage` and `NewDismissed` describe findings that only exist in
/// the merge request's pipeline; the others describe findings already
/// recorded on the target branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VulnerabilityState {
    NewNeedsTriage,
    NewDismissed,
    Detected,
    Confirmed,
    Resolved,
    Dismissed,
}

impl VulnerabilityState {
    /// States that classify a finding as newly detected.
    pub const NEWLY_DETECTED: [VulnerabilityState; 2] = [Self::NewNeedsTriage, Self::NewDismissed];

    /// States used when a rule leaves `vulnerability_states` empty.
    pub const DEFAULT: [VulnerabilityState; 2] = Self::NEWLY_DETECTED;

    pub fn is_newly_detected(self) -> bool {
        matches!(self, Self::NewNeedsTriage | Self::NewDismissed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewNeedsTriage => "new_needs_triage",
            Self::NewDismissed => "new_dismissed",
            Self::Detected => "detected",
            Self::Confirmed => "confirmed",
            Self::Resolved => "resolved",
            Self::Dismissed => "dismissed",
        }
    }
}

impl fmt::Display for VulnerabilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Info,
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Unknown => "unknown",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Security scan (report) type executed by a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanType {
    Sast,
    SecretDetection,
    DependencyScanning,
    ContainerScanning,
    Dast,
    CoverageFuzzing,
    ApiFuzzing,
    ClusterImageScanning,
}

impl ScanType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sast => "sast",
            Self::SecretDetection => "secret_detection",
            Self::DependencyScanning => "dependency_scanning",
            Self::ContainerScanning => "container_scanning",
            Self::Dast => "dast",
            Self::CoverageFuzzing => "coverage_fuzzing",
            Self::ApiFuzzing => "api_fuzzing",
            Self::ClusterImageScanning => "cluster_image_scanning",
        }
    }

    /// Human-readable name, e.g. `secret_detection` → `Secret detection`.
    pub fn humanize(self) -> String {
        let spaced = self.as_str().replace('_', " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "sast" => Self::Sast,
            "secret_detection" => Self::SecretDetection,
            "dependency_scanning" => Self::DependencyScanning,
            "container_scanning" => Self::ContainerScanning,
            "dast" => Self::Dast,
            "coverage_fuzzing" => Self::CoverageFuzzing,
            "api_fuzzing" => Self::ApiFuzzing,
            "cluster_image_scanning" => Self::ClusterImageScanning,
            _ => return None,
        })
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Age comparison operator of a vulnerability age filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeOperator {
    GreaterThan,
    LessThan,
}

/// Unit of a vulnerability age filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeInterval {
    Day,
    Week,
    Month,
    Year,
}

impl AgeInterval {
    pub fn days(self) -> u32 {
        match self {
            Self::Day => 1,
            Self::Week => 7,
            Self::Month => 30,
            Self::Year => 365,
        }
    }
}

/// Restricts counted vulnerabilities by how long ago they were detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VulnerabilityAge {
    pub operator: AgeOperator,
    pub value: u32,
    pub interval: AgeInterval,
}

impl VulnerabilityAge {
    /// Threshold expressed in days.
    pub fn as_days(&self) -> u64 {
        u64::from(self.value) * u64::from(self.interval.days())
    }

    /// Whether a vulnerability detected `age_days` ago passes the filter.
    pub fn matches(&self, age_days: u64) -> bool {
        match self.operator {
            AgeOperator::GreaterThan => age_days > self.as_days(),
            AgeOperator::LessThan => age_days < self.as_days(),
        }
    }
}

/// Optional finding attribute filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VulnerabilityAttributes {
    pub fix_available: Option<bool>,
    pub false_positive: Option<bool>,
}
