//! V001: Initial schema.
//! approval_rules, comparison_pipelines, policy_violations, notes,
//! exclusive_leases.

pub const MIGRATION_SQL: &str = r#"
-- Approval rules attached to merge requests. Criteria are the report-type
-- specific rule fields, stored as JSON.
CREATE TABLE IF NOT EXISTS approval_rules (
    id INTEGER PRIMARY KEY,
    merge_request_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    scan_result_policy_id INTEGER,
    policy_name TEXT,
    approvals_required INTEGER NOT NULL DEFAULT 0,
    configured_approvals_required INTEGER NOT NULL DEFAULT 0,
    report_type TEXT NOT NULL,
    criteria_json TEXT NOT NULL,
    fail_open INTEGER NOT NULL DEFAULT 0,
    applies_to_target_branch INTEGER NOT NULL DEFAULT 1,
    source_rule_id INTEGER
) STRICT;

CREATE INDEX IF NOT EXISTS idx_approval_rules_mr_type
    ON approval_rules(merge_request_id, report_type);

-- Latest target-branch pipeline each merge request is compared against.
CREATE TABLE IF NOT EXISTS comparison_pipelines (
    merge_request_id INTEGER PRIMARY KEY,
    pipeline_id INTEGER NOT NULL,
    status TEXT NOT NULL,
    can_store_security_reports INTEGER NOT NULL DEFAULT 1,
    related_pipeline_ids TEXT NOT NULL DEFAULT '[]',
    scan_types TEXT NOT NULL DEFAULT '[]'
) STRICT;

-- One row per violated (policy, merge request) pair.
CREATE TABLE IF NOT EXISTS policy_violations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    scan_result_policy_id INTEGER NOT NULL,
    merge_request_id INTEGER NOT NULL,
    project_id INTEGER NOT NULL,
    violation_data TEXT,
    created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER)),
    updated_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER)),
    UNIQUE(scan_result_policy_id, merge_request_id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_policy_violations_mr
    ON policy_violations(merge_request_id);

-- Merge request comments.
CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    merge_request_id INTEGER NOT NULL,
    project_id INTEGER NOT NULL,
    author TEXT NOT NULL,
    body TEXT NOT NULL,
    created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER)),
    updated_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER))
) STRICT;

CREATE INDEX IF NOT EXISTS idx_notes_mr_author
    ON notes(merge_request_id, author);

-- Named TTL leases backing the exclusive lock service.
CREATE TABLE IF NOT EXISTS exclusive_leases (
    lease_key TEXT PRIMARY KEY,
    token TEXT NOT NULL,
    expires_at_ms INTEGER NOT NULL
) STRICT;
"#;
