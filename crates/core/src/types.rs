// Copyright 2025 SitePulse Contributors
// SPDX-License-Identifier: Apache-2.0

//! Canonical data model for probe requests, normalized metrics, audits,
//! repository signals, and derived scores.

use serde::{Deserialize, Serialize};

use crate::error::{ProbeError, Result};

/// Load parameters for the load-generation probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadParams {
    /// Virtual-user count for the run.
    pub vus: u32,
    /// Bounded duration string understood by the load engine (e.g. "30s").
    pub duration: String,
}

impl Default for LoadParams {
    fn default() -> Self {
        Self {
            vus: 10,
            duration: "30s".to_string(),
        }
    }
}

/// Immutable description of one orchestration request.
///
/// At least one of `target_url` / `repository` must be present; this is
/// validated before any probe is launched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeRequest {
    /// Target web endpoint, if a runtime evaluation was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    /// Source repository identifier, if a static evaluation was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Load-generation parameters.
    #[serde(default)]
    pub load: LoadParams,
}

impl ProbeRequest {
    /// Build a request targeting a URL.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            target_url: Some(url.into()),
            repository: None,
            load: LoadParams::default(),
        }
    }

    /// Build a request targeting a repository only.
    pub fn for_repository(ident: impl Into<String>) -> Self {
        Self {
            target_url: None,
            repository: Some(ident.into()),
            load: LoadParams::default(),
        }
    }

    /// Attach a repository identifier.
    pub fn with_repository(mut self, ident: impl Into<String>) -> Self {
        self.repository = Some(ident.into());
        self
    }

    /// Override the load parameters.
    pub fn with_load(mut self, load: LoadParams) -> Self {
        self.load = load;
        self
    }

    /// Validate the request before orchestration starts.
    ///
    /// Empty strings count as absent targets.
    pub fn validate(&self) -> Result<()> {
        let has_url = self
            .target_url
            .as_deref()
            .map(|u| !u.trim().is_empty())
            .unwrap_or(false);
        let has_repo = self
            .repository
            .as_deref()
            .map(|r| !r.trim().is_empty())
            .unwrap_or(false);
        if !has_url && !has_repo {
            return Err(ProbeError::InvalidRequest(
                "at least one of target_url / repository is required".to_string(),
            ));
        }
        if has_url && self.load.vus == 0 {
            return Err(ProbeError::InvalidRequest(
                "vus must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Canonical post-normalization performance schema.
///
/// Every field carries its own availability: a metric the raw summary did
/// not contain (or contained as a non-finite number) is `None`, never NaN.
/// Rate fields are clamped to [0,1] and latency/throughput floored at zero
/// by the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnifiedMetrics {
    /// Mean request latency in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_avg_ms: Option<f64>,
    /// 95th-percentile request latency in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_p95_ms: Option<f64>,
    /// Requests per second sustained during the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throughput_rps: Option<f64>,
    /// Fraction of workload checks that failed, in [0,1].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_rate: Option<f64>,
    /// Fraction of responses that were server errors, in [0,1].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_error_rate: Option<f64>,
    /// Virtual users configured for the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vus: Option<u32>,
}

impl UnifiedMetrics {
    /// Whether any metric at all was recovered from the run.
    pub fn has_data(&self) -> bool {
        self.latency_avg_ms.is_some()
            || self.latency_p95_ms.is_some()
            || self.throughput_rps.is_some()
            || self.failure_rate.is_some()
            || self.server_error_rate.is_some()
    }
}

/// Result of the browser-experience probe.
///
/// All five scores are integers in [0,100]. `is_simulated` marks audits
/// produced by the synthetic fallback path rather than a real navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserAudit {
    /// Load-speed score derived from wall-clock navigation time.
    pub performance: u8,
    /// Image alt-text coverage score.
    pub accessibility: u8,
    /// HTTPS-and-placeholder composite score.
    pub best_practices: u8,
    /// Title and meta-description presence score.
    pub seo: u8,
    /// Interactivity estimate derived from the performance score.
    pub interactivity: u8,
    /// Wall-clock page load time in milliseconds, when measured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_time_ms: Option<u64>,
    /// True when this audit came from the simulation fallback.
    #[serde(default)]
    pub is_simulated: bool,
}

/// Deployment/operational signals detected in a source repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySignals {
    /// A container build definition is present.
    pub docker: bool,
    /// A CI/CD pipeline definition is present.
    pub cicd: bool,
    /// Orchestration manifests are present.
    pub kubernetes: bool,
    /// A start script is defined.
    pub has_start_script: bool,
}

/// Deployment-readiness tier derived from the devops score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Score at or above 70.
    Low,
    /// Score at or above 40.
    Medium,
    /// Everything below 40.
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        };
        write!(f, "{s}")
    }
}

/// Summary block derived from [`RepositorySignals`] by fixed weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessSummary {
    /// Weighted signal sum in [0,100].
    pub devops_score: u32,
    /// True when start script, docker, and CI/CD are all present.
    pub production_ready: bool,
    /// Tier derived from the devops score.
    pub risk_level: RiskLevel,
}

/// Business-risk indicators computed from unified metrics and repository
/// signals. Purely derived; recomputed every run, never stored on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedScores {
    /// Projected conversion loss percentage from mean latency.
    pub conversion_loss_pct: f64,
    /// Projected wasted ad spend under failure conditions.
    pub ad_spend_risk: i64,
    /// Stability score in [0,100]; lower means less stable.
    pub stability_risk_score: f64,
    /// Estimated virtual-user count at which the target destabilizes.
    pub collapse_point_vus: u32,
    /// Ordered remediation suggestions; order is deterministic.
    pub remediations: Vec<String>,
}
