//! Policy configuration: rules, actions, scope, fallback behavior.
//!
//! Policies arrive as a YAML document (`approval_policy:` list). The loose
//! document shape is validated once at the boundary and converted into
//! typed [`Policy`] values; nothing downstream sees unvalidated payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::collections::FxHashSet;
use super::identifiers::{ComplianceFrameworkId, GroupId, PolicyId, ProjectId};
use super::vulnerability::{
    ScanType, SeverityLevel, VulnerabilityAge, VulnerabilityAttributes, VulnerabilityState,
};
use crate::constants::{MAX_APPROVALS_REQUIRED, MAX_RULES_PER_POLICY};
use crate::errors::ConfigError;

/// Report type an approval rule (and its violations) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    ScanFinding,
    LicenseScanning,
    AnyMergeRequest,
}

impl ReportType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScanFinding => "scan_finding",
            Self::LicenseScanning => "license_scanning",
            Self::AnyMergeRequest => "any_merge_request",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "scan_finding" => Some(Self::ScanFinding),
            "license_scanning" => Some(Self::LicenseScanning),
            "any_merge_request" => Some(Self::AnyMergeRequest),
            _ => None,
        }
    }

    /// Human-readable form, e.g. `license_scanning` → `License scanning`.
    pub fn humanize(self) -> String {
        let spaced = self.as_str().replace('_', " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Rules ───────────────────────────────────────────────────────────

/// A policy rule, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    ScanFinding(ScanFindingRule),
    LicenseFinding(LicenseFindingRule),
    AnyMergeRequest(AnyMergeRequestRule),
}

impl Rule {
    pub fn report_type(&self) -> ReportType {
        match self {
            Self::ScanFinding(_) => ReportType::ScanFinding,
            Self::LicenseFinding(_) => ReportType::LicenseScanning,
            Self::AnyMergeRequest(_) => ReportType::AnyMergeRequest,
        }
    }

    pub fn branches(&self) -> &[String] {
        match self {
            Self::ScanFinding(r) => &r.branches,
            Self::LicenseFinding(r) => &r.branches,
            Self::AnyMergeRequest(r) => &r.branches,
        }
    }
}

/// Vulnerability threshold rule.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanFindingRule {
    /// Target branches; empty means every protected branch.
    pub branches: Vec<String>,
    /// Scanners the rule inspects; empty means all scanners.
    pub scanners: Vec<ScanType>,
    pub vulnerabilities_allowed: u32,
    pub severity_levels: Vec<SeverityLevel>,
    pub vulnerability_states: Vec<VulnerabilityState>,
    pub vulnerability_attributes: VulnerabilityAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vulnerability_age: Option<VulnerabilityAge>,
}

impl ScanFindingRule {
    /// Configured states, falling back to the newly-detected defaults.
    pub fn effective_states(&self) -> Vec<VulnerabilityState> {
        if self.vulnerability_states.is_empty() {
            VulnerabilityState::DEFAULT.to_vec()
        } else {
            self.vulnerability_states.clone()
        }
    }

    /// States that apply for a merge request targeting a branch. Only the
    /// default branch has previously-existing vulnerabilities to count, so
    /// other branches keep the newly-detected states alone.
    pub fn states_for_branch(&self, target_default_branch: bool) -> Vec<VulnerabilityState> {
        let states = self.effective_states();
        if target_default_branch {
            return states;
        }
        states.into_iter().filter(|s| s.is_newly_detected()).collect()
    }

    pub fn includes_newly_detected(&self, target_default_branch: bool) -> bool {
        self.states_for_branch(target_default_branch)
            .iter()
            .any(|s| s.is_newly_detected())
    }

    pub fn only_newly_detected(&self, target_default_branch: bool) -> bool {
        self.states_for_branch(target_default_branch)
            .iter()
            .all(|s| s.is_newly_detected())
    }

    /// Branch states minus the newly-detected ones, used for counting
    /// vulnerabilities already recorded on the target branch.
    pub fn states_without_newly_detected(
        &self,
        target_default_branch: bool,
    ) -> Vec<VulnerabilityState> {
        self.states_for_branch(target_default_branch)
            .into_iter()
            .filter(|s| !s.is_newly_detected())
            .collect()
    }
}

/// License state filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseState {
    NewlyDetected,
    Detected,
}

/// License compliance rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseFindingRule {
    pub branches: Vec<String>,
    /// `true`: the listed licenses are denied. `false`: only they are allowed.
    pub match_on_inclusion_license: bool,
    pub license_types: Vec<String>,
    pub license_states: Vec<LicenseState>,
}

impl Default for LicenseFindingRule {
    fn default() -> Self {
        Self {
            branches: Vec::new(),
            match_on_inclusion_license: true,
            license_types: Vec::new(),
            license_states: vec![LicenseState::NewlyDetected],
        }
    }
}

/// Commit signature filter for `any_merge_request` rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitsType {
    #[default]
    Any,
    Unsigned,
}

/// Rule that applies to every merge request (optionally only those with
/// unsigned commits).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnyMergeRequestRule {
    pub branches: Vec<String>,
    pub commits: CommitsType,
}

// ─── Actions ─────────────────────────────────────────────────────────

/// Action taken when a rule is violated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicyAction {
    RequireApproval(RequireApprovalAction),
    SendBotMessage(SendBotMessageAction),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequireApprovalAction {
    pub approvals_required: u32,
    pub user_approvers: Vec<String>,
    pub user_approvers_ids: Vec<i64>,
    pub group_approvers: Vec<String>,
    pub group_approvers_ids: Vec<i64>,
    pub role_approvers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendBotMessageAction {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

// ─── Scope & fallback ────────────────────────────────────────────────

/// `{ id: ... }` reference as written in policy YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeRef<T> {
    pub id: T,
}

/// Include/exclude lists for one scope dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ScopeFilter<T> {
    #[serde(default = "Vec::new")]
    pub including: Vec<ScopeRef<T>>,
    #[serde(default = "Vec::new")]
    pub excluding: Vec<ScopeRef<T>>,
}

impl<T> Default for ScopeFilter<T> {
    fn default() -> Self {
        Self {
            including: Vec::new(),
            excluding: Vec::new(),
        }
    }
}

impl<T: Copy + PartialEq> ScopeFilter<T> {
    pub fn including_ids(&self) -> impl Iterator<Item = T> + '_ {
        self.including.iter().map(|r| r.id)
    }

    pub fn excluding_ids(&self) -> impl Iterator<Item = T> + '_ {
        self.excluding.iter().map(|r| r.id)
    }

    pub fn includes(&self, id: T) -> bool {
        self.including.iter().any(|r| r.id == id)
    }

    pub fn excludes(&self, id: T) -> bool {
        self.excluding.iter().any(|r| r.id == id)
    }
}

/// Which projects a policy governs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyScope {
    pub compliance_frameworks: Vec<ScopeRef<ComplianceFrameworkId>>,
    pub projects: ScopeFilter<ProjectId>,
    pub groups: ScopeFilter<GroupId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailMode {
    Open,
    #[default]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackBehavior {
    pub fail: FailMode,
}

// ─── Policy ──────────────────────────────────────────────────────────

/// A validated approval policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub id: PolicyId,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub rules: Vec<Rule>,
    pub actions: Vec<PolicyAction>,
    pub scope: PolicyScope,
    pub fallback_behavior: FallbackBehavior,
}

impl Policy {
    pub fn require_approval(&self) -> Option<&RequireApprovalAction> {
        self.actions.iter().find_map(|a| match a {
            PolicyAction::RequireApproval(r) => Some(r),
            PolicyAction::SendBotMessage(_) => None,
        })
    }

    /// Bot messages are on unless a `send_bot_message` action disables them.
    pub fn bot_message_enabled(&self) -> bool {
        self.actions
            .iter()
            .find_map(|a| match a {
                PolicyAction::SendBotMessage(m) => Some(m.enabled),
                PolicyAction::RequireApproval(_) => None,
            })
            .unwrap_or(true)
    }

    pub fn fail_open(&self) -> bool {
        self.fallback_behavior.fail == FailMode::Open
    }
}

/// Policy as written in YAML, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PolicyDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<PolicyId>,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default)]
    rules: Vec<Rule>,
    #[serde(default)]
    actions: Vec<PolicyAction>,
    #[serde(default)]
    policy_scope: PolicyScope,
    #[serde(default)]
    fallback_behavior: FallbackBehavior,
}

/// Top-level policy document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(default)]
    approval_policy: Vec<PolicyDefinition>,
}

impl PolicyDocument {
    /// Parse and validate a YAML policy document.
    ///
    /// Policies without an explicit `id` get their 1-based position.
    pub fn from_yaml(source: &str) -> Result<Vec<Policy>, ConfigError> {
        let document: PolicyDocument =
            serde_yaml::from_str(source).map_err(|e| ConfigError::ParseError {
                path: "<policy.yml>".to_string(),
                message: e.to_string(),
            })?;
        document.into_policies()
    }

    /// Load a policy document from disk.
    pub fn load(path: &std::path::Path) -> Result<Vec<Policy>, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_yaml(&content).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    fn into_policies(self) -> Result<Vec<Policy>, ConfigError> {
        let mut seen_names = FxHashSet::default();
        let mut seen_ids = FxHashSet::default();
        let mut policies = Vec::with_capacity(self.approval_policy.len());

        for (index, def) in self.approval_policy.into_iter().enumerate() {
            validate_definition(&def)?;
            if !seen_names.insert(def.name.clone()) {
                return Err(ConfigError::InvalidPolicy {
                    policy: def.name,
                    message: "duplicate policy name".to_string(),
                });
            }
            let id = def.id.unwrap_or(PolicyId(index as i64 + 1));
            if !seen_ids.insert(id) {
                return Err(ConfigError::InvalidPolicy {
                    policy: def.name,
                    message: format!("duplicate policy id {id}"),
                });
            }

            policies.push(Policy {
                id,
                name: def.name,
                description: def.description,
                enabled: def.enabled,
                rules: def.rules,
                actions: def.actions,
                scope: def.policy_scope,
                fallback_behavior: def.fallback_behavior,
            });
        }

        Ok(policies)
    }
}

fn validate_definition(def: &PolicyDefinition) -> Result<(), ConfigError> {
    let invalid = |message: &str| ConfigError::InvalidPolicy {
        policy: def.name.clone(),
        message: message.to_string(),
    };

    if def.name.trim().is_empty() {
        return Err(invalid("name must not be empty"));
    }
    if def.rules.is_empty() {
        return Err(invalid("at least one rule is required"));
    }
    if def.rules.len() > MAX_RULES_PER_POLICY {
        return Err(invalid(&format!(
            "at most {MAX_RULES_PER_POLICY} rules are allowed"
        )));
    }
    for action in &def.actions {
        if let PolicyAction::RequireApproval(r) = action {
            if r.approvals_required > MAX_APPROVALS_REQUIRED {
                return Err(invalid(&format!(
                    "approvals_required must be at most {MAX_APPROVALS_REQUIRED}"
                )));
            }
        }
    }
    Ok(())
}

fn default_true() -> bool {
    true
}
