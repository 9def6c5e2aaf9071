//! Tests for the mrguard error types.

use std::collections::HashSet;

use mrguard_core::errors::*;

#[test]
fn test_all_errors_have_error_code() {
    let errors: Vec<Box<dyn Fn() -> &'static str>> = vec![
        Box::new(|| {
            ConfigError::FileNotFound {
                path: "/tmp".into(),
            }
            .error_code()
        }),
        Box::new(|| StorageError::DbBusy.error_code()),
        Box::new(|| {
            GatewayError::NotFound {
                entity: "approval_rule",
                id: 1,
            }
            .error_code()
        }),
        Box::new(|| {
            LockError::Poisoned {
                key: "k".into(),
            }
            .error_code()
        }),
        Box::new(|| {
            CommentSyncError::Validation {
                messages: vec!["x".into()],
            }
            .error_code()
        }),
        Box::new(|| EnforcementError::from(StorageError::DbBusy).error_code()),
    ];
    for code in errors {
        assert!(!code().is_empty());
    }
}

#[test]
fn test_display_code_format() {
    let err = StorageError::SqliteError {
        message: "disk I/O error".into(),
    };
    assert_eq!(err.display_code(), "[STORAGE_ERROR] SQLite error: disk I/O error");
}

#[test]
fn test_lock_failure_maps_to_lock_timeout() {
    let err: CommentSyncError = LockError::FailedToObtain {
        key: "mrguard:policy_violation_comment:1".into(),
        attempts: 51,
        waited_ms: 5000,
    }
    .into();

    assert!(matches!(err, CommentSyncError::LockTimeout { .. }));
    assert_eq!(err.error_code(), "LOCK_TIMEOUT");
    assert_eq!(err.to_string(), "Failed to obtain an exclusive lock");
}

#[test]
fn test_gateway_validation_maps_to_comment_validation() {
    let err: CommentSyncError = GatewayError::Validation {
        messages: vec!["Note can't be blank".into(), "Project is archived".into()],
    }
    .into();

    assert_eq!(
        err.messages(),
        vec!["Note can't be blank".to_string(), "Project is archived".to_string()]
    );
    assert_eq!(err.error_code(), "VALIDATION_FAILED");
}

#[test]
fn test_other_gateway_errors_stay_gateway_errors() {
    let err: CommentSyncError = GatewayError::Unavailable {
        gateway: "comments",
        message: "timeout".into(),
    }
    .into();
    assert!(matches!(err, CommentSyncError::Gateway(_)));
    assert_eq!(err.messages().len(), 1);
}

#[test]
fn test_enforcement_error_preserves_inner_code() {
    let err = EnforcementError::from(StorageError::TransactionFailed {
        message: "constraint".into(),
    });
    assert_eq!(err.error_code(), "TRANSACTION_FAILED");

    let err = EnforcementError::from(ConfigError::InvalidPolicy {
        policy: "p".into(),
        message: "no rules".into(),
    });
    assert_eq!(err.error_code(), "POLICY_INVALID");
}

#[test]
fn test_error_codes_are_distinct() {
    let codes = [
        error_code::CONFIG_ERROR,
        error_code::POLICY_INVALID,
        error_code::STORAGE_ERROR,
        error_code::DB_BUSY,
        error_code::MIGRATION_FAILED,
        error_code::TRANSACTION_FAILED,
        error_code::GATEWAY_ERROR,
        error_code::NOT_FOUND,
        error_code::VALIDATION_FAILED,
        error_code::LOCK_TIMEOUT,
        error_code::LOCK_ERROR,
        error_code::COMMENT_SYNC_FAILED,
    ];
    let unique: HashSet<_> = codes.iter().collect();
    assert_eq!(unique.len(), codes.len());
}
