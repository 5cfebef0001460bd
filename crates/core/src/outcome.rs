// Copyright 2025 SitePulse Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tagged probe outcome type.
//!
//! Each probe adapter returns a [`ProbeOutcome`] rather than a bare
//! `Result`, so the orchestrator can join heterogeneous probes and read
//! success or failure off the value without any probe aborting its
//! siblings.

use crate::error::ProbeError;
use serde::{Deserialize, Serialize};

/// A probe failure: the taxonomy variant plus when it was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeFailure {
    /// The classified error.
    pub error: ProbeError,
    /// Name of the probe that failed (e.g. "load", "repository").
    pub probe: String,
}

impl ProbeFailure {
    /// Create a new failure record for the named probe.
    pub fn new(probe: impl Into<String>, error: ProbeError) -> Self {
        Self {
            error,
            probe: probe.into(),
        }
    }
}

impl std::fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} probe: {}", self.probe, self.error)
    }
}

/// Tagged result of a single probe run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome<T> {
    /// The probe produced a value.
    Success {
        /// The probe's payload.
        value: T,
    },
    /// The probe failed; the reason is classified, never a raw panic.
    Failure {
        /// The failure record.
        failure: ProbeFailure,
    },
}

impl<T> ProbeOutcome<T> {
    /// Wrap a successful payload.
    pub fn success(value: T) -> Self {
        Self::Success { value }
    }

    /// Wrap a classified failure for the named probe.
    pub fn failure(probe: impl Into<String>, error: ProbeError) -> Self {
        Self::Failure {
            failure: ProbeFailure::new(probe, error),
        }
    }

    /// Whether this outcome carries a value.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Consume the outcome, returning the payload if present.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Success { value } => Some(value),
            Self::Failure { .. } => None,
        }
    }

    /// Split into payload and failure halves.
    pub fn into_parts(self) -> (Option<T>, Option<ProbeFailure>) {
        match self {
            Self::Success { value } => (Some(value), None),
            Self::Failure { failure } => (None, Some(failure)),
        }
    }

    /// Borrow the failure record, if any.
    pub fn failure_ref(&self) -> Option<&ProbeFailure> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { failure } => Some(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_roundtrip() {
        let outcome = ProbeOutcome::success(42u32);
        assert!(outcome.is_success());
        assert_eq!(outcome.ok(), Some(42));
    }

    #[test]
    fn test_failure_carries_probe_name() {
        let outcome: ProbeOutcome<u32> = ProbeOutcome::failure(
            "load",
            ProbeError::EngineUnavailable("missing binary".to_string()),
        );
        assert!(!outcome.is_success());
        let failure = outcome.failure_ref().unwrap();
        assert_eq!(failure.probe, "load");
        assert!(failure.to_string().contains("load probe"));
    }

    #[test]
    fn test_into_parts() {
        let (value, failure) = ProbeOutcome::success("ok").into_parts();
        assert_eq!(value, Some("ok"));
        assert!(failure.is_none());

        let (value, failure) = ProbeOutcome::<&str>::failure(
            "repository",
            ProbeError::RepositoryAnalysisFailed("clone failed".to_string()),
        )
        .into_parts();
        assert!(value.is_none());
        assert_eq!(failure.unwrap().probe, "repository");
    }
}
