//! Tests for domain types: policy loading, rule classification, violation
//! data payloads.

use mrguard_core::errors::ConfigError;
use mrguard_core::types::*;

const POLICY_YAML: &str = r#"
approval_policy:
  - name: Critical vulnerabilities
    description: Block new criticals
    rules:
      - type: scan_finding
        branches: [main]
        scanners: [sast, dependency_scanning]
        vulnerabilities_allowed: 0
        severity_levels: [critical, high]
        vulnerability_states: [new_needs_triage]
        vulnerability_attributes:
          fix_available: true
      - type: license_finding
        branches: []
        match_on_inclusion_license: true
        license_types: [GPL-3.0]
        license_states: [newly_detected]
    actions:
      - type: require_approval
        approvals_required: 2
        role_approvers: [maintainer]
      - type: send_bot_message
        enabled: false
    policy_scope:
      compliance_frameworks:
        - id: 7
      projects:
        excluding:
          - id: 99
    fallback_behavior:
      fail: open
  - id: 42
    name: Previously existing
    enabled: false
    rules:
      - type: scan_finding
        vulnerabilities_allowed: 3
        vulnerability_states: [detected, confirmed]
        vulnerability_age:
          operator: greater_than
          value: 2
          interval: week
"#;

#[test]
fn test_policy_document_parses_and_assigns_ids() {
    let policies = PolicyDocument::from_yaml(POLICY_YAML).unwrap();
    assert_eq!(policies.len(), 2);

    let first = &policies[0];
    assert_eq!(first.id, PolicyId(1));
    assert!(first.enabled);
    assert!(first.fail_open());
    assert!(!first.bot_message_enabled());
    assert_eq!(first.require_approval().unwrap().approvals_required, 2);
    assert_eq!(first.rules[0].report_type(), ReportType::ScanFinding);
    assert_eq!(first.rules[1].report_type(), ReportType::LicenseScanning);
    assert_eq!(first.rules[0].branches(), ["main".to_string()]);
    assert!(first.scope.projects.excludes(ProjectId(99)));
    assert_eq!(
        first.scope.compliance_frameworks[0].id,
        ComplianceFrameworkId(7)
    );

    let second = &policies[1];
    assert_eq!(second.id, PolicyId(42));
    assert!(!second.enabled);
    assert!(!second.fail_open());
    assert!(second.bot_message_enabled());
    match &second.rules[0] {
        Rule::ScanFinding(rule) => {
            let age = rule.vulnerability_age.unwrap();
            assert_eq!(age.as_days(), 14);
            assert!(age.matches(15));
            assert!(!age.matches(14));
        }
        other => panic!("unexpected rule: {other:?}"),
    }
}

#[test]
fn test_policy_without_rules_is_rejected() {
    let yaml = "approval_policy:\n  - name: Empty\n    rules: []\n";
    let err = PolicyDocument::from_yaml(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidPolicy { ref policy, .. } if policy == "Empty"));
}

#[test]
fn test_duplicate_policy_names_are_rejected() {
    let yaml = r#"
approval_policy:
  - name: Same
    rules: [{ type: any_merge_request, commits: unsigned }]
  - name: Same
    rules: [{ type: any_merge_request }]
"#;
    let err = PolicyDocument::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("duplicate"));
}

#[test]
fn test_explicit_id_colliding_with_positional_id_is_rejected() {
    let yaml = r#"
approval_policy:
  - name: First
    rules: [{ type: any_merge_request }]
  - name: Second
    id: 1
    rules: [{ type: any_merge_request }]
"#;
    let err = PolicyDocument::from_yaml(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidPolicy { ref policy, .. } if policy == "Second"));
    assert!(err.to_string().contains("duplicate policy id"));
}

#[test]
fn test_too_many_rules_and_approvals_are_rejected() {
    let rule = "      - type: any_merge_request\n";
    let yaml = format!(
        "approval_policy:\n  - name: Many\n    rules:\n{}",
        rule.repeat(6)
    );
    assert!(PolicyDocument::from_yaml(&yaml).is_err());

    let yaml = r#"
approval_policy:
  - name: Greedy
    rules: [{ type: any_merge_request }]
    actions: [{ type: require_approval, approvals_required: 101 }]
"#;
    assert!(PolicyDocument::from_yaml(yaml).is_err());
}

#[test]
fn test_unknown_rule_type_is_a_parse_error() {
    let yaml = "approval_policy:\n  - name: X\n    rules: [{ type: mystery }]\n";
    let err = PolicyDocument::from_yaml(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_load_policy_document_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("policy.yml");
    std::fs::write(&path, POLICY_YAML).unwrap();
    assert_eq!(PolicyDocument::load(&path).unwrap().len(), 2);

    let missing = PolicyDocument::load(&dir.path().join("nope.yml")).unwrap_err();
    assert!(matches!(missing, ConfigError::FileNotFound { .. }));
}

// ---- Rule classification ----

fn rule_with_states(states: &[VulnerabilityState]) -> ScanFindingRule {
    ScanFindingRule {
        vulnerability_states: states.to_vec(),
        ..Default::default()
    }
}

#[test]
fn test_empty_states_default_to_newly_detected() {
    let rule = rule_with_states(&[]);
    assert_eq!(rule.effective_states(), VulnerabilityState::NEWLY_DETECTED.to_vec());
    assert!(rule.only_newly_detected(true));
    assert!(rule.includes_newly_detected(true));
    assert!(rule.states_without_newly_detected(true).is_empty());
}

#[test]
fn test_mixed_states_are_cumulative_on_default_branch() {
    let rule = rule_with_states(&[VulnerabilityState::NewNeedsTriage, VulnerabilityState::Detected]);
    assert!(rule.includes_newly_detected(true));
    assert!(!rule.only_newly_detected(true));
    assert_eq!(
        rule.states_without_newly_detected(true),
        vec![VulnerabilityState::Detected]
    );
}

#[test]
fn test_non_default_branch_keeps_newly_detected_states_only() {
    let rule = rule_with_states(&[VulnerabilityState::NewNeedsTriage, VulnerabilityState::Detected]);
    assert_eq!(
        rule.states_for_branch(false),
        vec![VulnerabilityState::NewNeedsTriage]
    );
    assert!(rule.only_newly_detected(false));

    let previously_existing_only = rule_with_states(&[VulnerabilityState::Detected]);
    assert!(!previously_existing_only.includes_newly_detected(false));
    assert!(!previously_existing_only.includes_newly_detected(true));
}

#[test]
fn test_scan_type_humanize_and_parse() {
    assert_eq!(ScanType::SecretDetection.humanize(), "Secret detection");
    assert_eq!(ScanType::parse("dast"), Some(ScanType::Dast));
    assert_eq!(ScanType::parse("nonsense"), None);
    assert_eq!(ReportType::LicenseScanning.humanize(), "License scanning");
}

#[test]
fn test_pipeline_completion_states() {
    assert!(PipelineStatus::Success.is_complete());
    assert!(PipelineStatus::Canceled.is_complete());
    assert!(!PipelineStatus::Running.is_complete());
    assert!(!PipelineStatus::Manual.is_complete());
    assert!(PipelineStatus::Manual.is_complete_or_manual());
}

// ---- Violation data ----

#[test]
fn test_violation_data_json_shape_omits_empty_members() {
    let data = ViolationData::scan_finding(FingerprintDiff {
        newly_detected: vec![Fingerprint::from("a"), Fingerprint::from("b")],
        previously_existing: vec![],
    })
    .with_context(EvaluationContext {
        pipeline_ids: vec![PipelineId(10)],
        target_pipeline_ids: vec![PipelineId(5)],
    });

    let json: serde_json::Value = serde_json::from_str(&data.to_json().unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "violations": { "scan_finding": { "uuids": { "newly_detected": ["a", "b"] } } },
            "context": { "pipeline_ids": [10], "target_pipeline_ids": [5] }
        })
    );
}

#[test]
fn test_scan_removed_error_json() {
    let data = ViolationData::error(ViolationErrorEntry::scan_removed(vec![ScanType::Sast]));
    let json: serde_json::Value = serde_json::from_str(&data.to_json().unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "errors": [{ "error": "SCAN_REMOVED", "missing_scans": ["sast"] }] })
    );
    assert!(data.has_error(ViolationErrorKind::ScanRemoved));
}

#[test]
fn test_unrecognized_error_kind_reads_as_unknown() {
    let data = ViolationData::from_json(r#"{"errors":[{"error":"SOMETHING_NEW"}]}"#).unwrap();
    assert_eq!(data.errors[0].error, ViolationErrorKind::Unknown);
}

#[test]
fn test_merge_accumulates_errors_without_duplicates() {
    let mut data = ViolationData::error(ViolationErrorEntry::scan_removed(vec![ScanType::Sast]));
    data.merge(ViolationData::error(ViolationErrorEntry::scan_removed(vec![ScanType::Sast])));
    data.merge(ViolationData::scan_finding(FingerprintDiff {
        newly_detected: vec![Fingerprint::from("x")],
        previously_existing: vec![],
    }));

    assert_eq!(data.errors.len(), 1);
    assert!(data.violations.scan_finding.is_some());
    assert!(!data.is_empty());
    assert!(ViolationData::default().is_empty());
}
