// Copyright 2025 SitePulse Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy shared across SitePulse crates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur at a probe boundary or during request validation.
///
/// Every probe-level error is caught at the adapter boundary and converted
/// into a [`crate::ProbeOutcome::Failure`]; none escape to the orchestrator
/// as panics or raw I/O errors.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ProbeError {
    /// The external load-generation binary is missing or not runnable.
    #[error("load engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The load-generation process exited non-zero, timed out, or produced
    /// oversized output.
    #[error("load execution failed: {0}")]
    ExecutionFailed(String),

    /// The load-generation process reported success but its summary
    /// artifact is missing.
    #[error("load summary output missing: {0}")]
    OutputMissing(String),

    /// The summary artifact exists but cannot be parsed into the expected
    /// shape.
    #[error("load summary output malformed: {0}")]
    MalformedOutput(String),

    /// The repository-analysis collaborator failed.
    #[error("repository analysis failed: {0}")]
    RepositoryAnalysisFailed(String),

    /// The inbound request named no target of any kind.
    #[error("invalid probe request: {0}")]
    InvalidRequest(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_detail() {
        let err = ProbeError::EngineUnavailable("k6 not found on PATH".to_string());
        assert!(err.to_string().contains("k6 not found"));
    }

    #[test]
    fn test_error_serialization_tags_kind() {
        let err = ProbeError::MalformedOutput("not an object".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "malformed_output");
        assert_eq!(json["detail"], "not an object");
    }
}
