//! Newly-detected vs cumulative vulnerability counting for scan finding
//! rules.

use std::collections::BTreeSet;
use std::sync::Arc;

use mrguard_core::errors::GatewayError;
use mrguard_core::traits::{CountQuery, VulnerabilityCountingGateway};
use mrguard_core::types::{Fingerprint, FingerprintDiff, ProjectId, ScanFindingRule};

/// Result of evaluating one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountOutcome {
    pub violated: bool,
    /// Trimmed fingerprints; present only when violated.
    pub evidence: Option<FingerprintDiff>,
}

impl CountOutcome {
    fn not_violated() -> Self {
        Self {
            violated: false,
            evidence: None,
        }
    }

    fn violated(evidence: FingerprintDiff) -> Self {
        Self {
            violated: true,
            evidence: Some(evidence),
        }
    }
}

pub struct VulnerabilityCounter {
    counting: Arc<dyn VulnerabilityCountingGateway>,
    max_violations: usize,
}

impl VulnerabilityCounter {
    pub fn new(counting: Arc<dyn VulnerabilityCountingGateway>, max_violations: usize) -> Self {
        Self {
            counting,
            max_violations,
        }
    }

    /// Decide whether `rule` is violated given the fingerprints found in the
    /// merge request pipeline (`current`) and the target-branch pipeline
    /// (`comparison`). The threshold is strict: exactly
    /// `vulnerabilities_allowed` findings do not violate.
    pub fn evaluate(
        &self,
        project_id: ProjectId,
        rule: &ScanFindingRule,
        target_default_branch: bool,
        current: &BTreeSet<Fingerprint>,
        comparison: &BTreeSet<Fingerprint>,
    ) -> Result<CountOutcome, GatewayError> {
        let allowed = u64::from(rule.vulnerabilities_allowed);
        let newly_detected: BTreeSet<&Fingerprint> = current.difference(comparison).collect();

        if rule.only_newly_detected(target_default_branch) {
            if newly_detected.len() as u64 > allowed {
                return Ok(CountOutcome::violated(FingerprintDiff {
                    newly_detected: self.trim(newly_detected.iter().copied()),
                    previously_existing: Vec::new(),
                }));
            }
            return Ok(CountOutcome::not_violated());
        }

        let all: BTreeSet<&Fingerprint> = current.union(comparison).collect();
        let previously_existing = all.difference(&newly_detected).copied();
        let evidence = FingerprintDiff {
            newly_detected: self.trim(newly_detected.iter().copied()),
            previously_existing: self.trim(previously_existing),
        };

        let count = self.counting.count(&CountQuery {
            project_id,
            fingerprints: all.into_iter().cloned().collect(),
            states: rule.states_without_newly_detected(target_default_branch),
            allowed_count: rule.vulnerabilities_allowed,
            vulnerability_age: rule.vulnerability_age,
        })?;

        if count.exceeded_allowed_count {
            return Ok(CountOutcome::violated(evidence));
        }

        let mut total = u64::from(count.count);
        if rule.includes_newly_detected(target_default_branch) {
            total += newly_detected.len() as u64;
        }

        if total > allowed {
            Ok(CountOutcome::violated(evidence))
        } else {
            Ok(CountOutcome::not_violated())
        }
    }

    fn trim<'a>(&self, fingerprints: impl Iterator<Item = &'a Fingerprint>) -> Vec<Fingerprint> {
        trim_fingerprints(fingerprints, self.max_violations)
    }
}

/// Keep `max_violations + 1` entries so readers can tell the limit was
/// exceeded.
pub fn trim_fingerprints<'a>(
    fingerprints: impl Iterator<Item = &'a Fingerprint>,
    max_violations: usize,
) -> Vec<Fingerprint> {
    fingerprints
        .take(max_violations.saturating_add(1))
        .cloned()
        .collect()
}
