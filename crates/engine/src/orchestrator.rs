// Copyright 2025 SitePulse Contributors
// SPDX-License-Identifier: Apache-2.0

//! Probe orchestration.
//!
//! One orchestration run fans out the load, browser, and repository
//! probes as concurrent tasks, waits for all of them to settle (success
//! or failure, no early exit), then aggregates: normalization, readiness
//! summary, derived scores, and the bounded narrative context.
//!
//! Failure isolation is structural: every probe returns a tagged outcome
//! or an infallible audit, so one probe failing can neither cancel its
//! siblings nor abort the join. The orchestrator imposes no top-level
//! timeout; each adapter bounds itself internally.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use sitepulse_core::{
    BrowserAudit, DerivedScores, ProbeFailure, ProbeRequest, ReadinessSummary, RepositorySignals,
    Result, ResultSnapshot, UnifiedMetrics,
};
use sitepulse_probes::{BrowserProbe, LoadProbe, RepositoryAnalyzer};

use crate::config::{BrowserMode, EngineConfig};
use crate::context::build_context;
use crate::narrative::{narrate, NarrativeGenerator};

/// Orchestration phases, logged as the run advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    ProbesRunning,
    Aggregating,
    Complete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::ProbesRunning => "probes_running",
            Phase::Aggregating => "aggregating",
            Phase::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// Result of one orchestration run.
///
/// Always returned for a valid request; partial failure is signaled only
/// through which fields are populated, never through a distinct error.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestrationResult {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// The originating request.
    pub request: ProbeRequest,
    /// Normalized metrics; absent when the load probe failed or was not
    /// requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<UnifiedMetrics>,
    /// Browser audit; present whenever a URL target was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_audit: Option<BrowserAudit>,
    /// Repository signals; absent on analyzer failure or when no
    /// repository was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_signals: Option<RepositorySignals>,
    /// Readiness summary derived from the signals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness: Option<ReadinessSummary>,
    /// Derived scores; all-zero/empty when metrics are absent.
    pub scores: DerivedScores,
    /// Bounded textual context for narrative generation.
    pub context: String,
    /// Load probe failure, when it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_failure: Option<ProbeFailure>,
    /// Repository probe failure, when it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_failure: Option<ProbeFailure>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl OrchestrationResult {
    /// Convert into the persistence snapshot, attaching the narrative.
    pub fn into_snapshot(self, narrative: String) -> ResultSnapshot {
        ResultSnapshot {
            run_id: self.run_id,
            request: self.request,
            metrics: self.metrics,
            browser_audit: self.browser_audit,
            repository_signals: self.repository_signals,
            readiness: self.readiness,
            scores: self.scores,
            narrative,
            load_failure: self.load_failure,
            repository_failure: self.repository_failure,
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }
}

/// Composes the three probes into complete orchestration runs.
pub struct Orchestrator {
    load: LoadProbe,
    browser: BrowserProbe,
    repository: Arc<dyn RepositoryAnalyzer>,
}

impl Orchestrator {
    /// Build an orchestrator from explicit probes.
    pub fn new(
        load: LoadProbe,
        browser: BrowserProbe,
        repository: Arc<dyn RepositoryAnalyzer>,
    ) -> Self {
        Self {
            load,
            browser,
            repository,
        }
    }

    /// Build an orchestrator from engine configuration.
    ///
    /// `BrowserMode::Real` requires an engine wired through
    /// [`Orchestrator::new`]; from configuration alone the browser probe
    /// runs simulated.
    pub fn from_config(config: &EngineConfig, repository: Arc<dyn RepositoryAnalyzer>) -> Self {
        if config.browser_mode == BrowserMode::Real {
            warn!("no browser engine wired, real audit mode degrades to simulated");
        }
        Self::new(
            LoadProbe::new(config.load_engine()),
            BrowserProbe::simulated(),
            repository,
        )
    }

    /// Execute one orchestration run.
    ///
    /// Fails only when the request itself is invalid; every probe-level
    /// failure is folded into the returned result.
    pub async fn execute(&self, request: &ProbeRequest) -> Result<OrchestrationResult> {
        request.validate()?;
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        let url = request
            .target_url
            .as_deref()
            .filter(|u| !u.trim().is_empty());
        let repo = request
            .repository
            .as_deref()
            .filter(|r| !r.trim().is_empty());

        info!(%run_id, phase = %Phase::ProbesRunning, url, repo, "launching probes");

        // Fan-out/fan-in join: all launched probes run to completion, the
        // first failure never cancels a sibling.
        let load_fut = async {
            match url {
                Some(u) => Some(self.load.run(u, &request.load).await),
                None => None,
            }
        };
        let browser_fut = async {
            match url {
                Some(u) => Some(self.browser.run(u).await),
                None => None,
            }
        };
        let repo_fut = async {
            match repo {
                Some(r) => Some(self.repository.analyze(r).await),
                None => None,
            }
        };
        let (load_outcome, browser_audit, repo_outcome) =
            tokio::join!(load_fut, browser_fut, repo_fut);

        info!(%run_id, phase = %Phase::Aggregating, "probes settled");

        let (raw_summary, mut load_failure) = match load_outcome {
            Some(outcome) => outcome.into_parts(),
            None => (None, None),
        };
        let metrics = match raw_summary {
            Some(raw) => match sitepulse_scoring::normalize(&raw, request.load.vus) {
                Ok(metrics) => Some(metrics),
                Err(error) => {
                    warn!(%run_id, %error, "load summary rejected at normalization");
                    load_failure = Some(ProbeFailure::new("load", error));
                    None
                }
            },
            None => None,
        };

        let (repository_signals, repository_failure) = match repo_outcome {
            Some(outcome) => outcome.into_parts(),
            None => (None, None),
        };
        let readiness = repository_signals
            .as_ref()
            .map(sitepulse_scoring::summarize);

        let scores =
            sitepulse_scoring::compute(metrics.as_ref(), repository_signals.as_ref());
        let context = build_context(
            metrics.as_ref(),
            repository_signals.as_ref(),
            readiness.as_ref(),
            browser_audit.as_ref(),
            &scores,
        );

        info!(
            %run_id,
            phase = %Phase::Complete,
            metrics_available = metrics.is_some(),
            signals_available = repository_signals.is_some(),
            "run complete"
        );

        Ok(OrchestrationResult {
            run_id,
            request: request.clone(),
            metrics,
            browser_audit,
            repository_signals,
            readiness,
            scores,
            context,
            load_failure,
            repository_failure,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Execute a run and assemble the complete persistence snapshot,
    /// including the narrative verdict.
    pub async fn execute_to_snapshot(
        &self,
        request: &ProbeRequest,
        narrative: &dyn NarrativeGenerator,
    ) -> Result<ResultSnapshot> {
        let result = self.execute(request).await?;
        let has_metrics = result.metrics.is_some();
        let text = narrate(narrative, &result.context, has_metrics, &result.scores).await;
        Ok(result.into_snapshot(text))
    }
}
