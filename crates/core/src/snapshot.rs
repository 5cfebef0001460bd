// Copyright 2025 SitePulse Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-run result snapshot handed to the persistence collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::outcome::ProbeFailure;
use crate::types::{
    BrowserAudit, DerivedScores, ProbeRequest, ReadinessSummary, RepositorySignals, UnifiedMetrics,
};

/// Complete record of one orchestration run.
///
/// Every field is optional except the originating request; which fields
/// are populated tells the reader which probes succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSnapshot {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// The request that initiated this run.
    pub request: ProbeRequest,
    /// Normalized runtime metrics, when the load probe succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<UnifiedMetrics>,
    /// Browser audit, when a URL target was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_audit: Option<BrowserAudit>,
    /// Repository signals, when the repository probe succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_signals: Option<RepositorySignals>,
    /// Readiness summary derived from the signals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness: Option<ReadinessSummary>,
    /// Derived business-risk scores.
    pub scores: DerivedScores,
    /// Narrative verdict text (generated or fallback).
    pub narrative: String,
    /// Failure recorded for the load probe, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_failure: Option<ProbeFailure>,
    /// Failure recorded for the repository probe, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_failure: Option<ProbeFailure>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}
