//! Derived business-risk score formulas.
//!
//! The formulas here are fixed and must stay byte-for-byte reproducible:
//! downstream consumers compare scores across runs, so two calls with
//! identical inputs must yield identical outputs, including the ordering
//! of the remediation list.

use sitepulse_core::{DerivedScores, RepositorySignals, UnifiedMetrics};

/// Failure-rate threshold above which the collapse projection contracts
/// instead of extrapolating headroom.
const COLLAPSE_FAILURE_THRESHOLD: f64 = 0.05;

/// Round to one decimal place.
fn round1(n: f64) -> f64 {
    (n * 10.0).round() / 10.0
}

/// Compute derived scores from normalized metrics and repository signals.
///
/// Total over optional inputs: absent metrics yield the all-zero/empty
/// default regardless of repository signals. Individual metric fields that
/// are unavailable enter the formulas as zero.
pub fn compute(
    metrics: Option<&UnifiedMetrics>,
    signals: Option<&RepositorySignals>,
) -> DerivedScores {
    let Some(metrics) = metrics else {
        return DerivedScores::default();
    };

    let avg_ms = metrics.latency_avg_ms.unwrap_or(0.0);
    let p95_ms = metrics.latency_p95_ms.unwrap_or(0.0);
    let throughput = metrics.throughput_rps.unwrap_or(0.0);
    let failure_rate = metrics.failure_rate.unwrap_or(0.0);
    let server_error_rate = metrics.server_error_rate.unwrap_or(0.0);
    let vus = metrics.vus.unwrap_or(0);

    let conversion_loss_pct = round1(avg_ms / 1000.0 * 7.0);
    let ad_spend_risk = (failure_rate * throughput * 150.0 * 5.0).round() as i64;
    let stability_risk_score = (100.0 - failure_rate * 500.0 - p95_ms / 20.0).max(0.0);
    let collapse_factor = if failure_rate > COLLAPSE_FAILURE_THRESHOLD {
        0.9
    } else {
        1.5
    };
    let collapse_point_vus = (f64::from(vus) * collapse_factor).round() as u32;

    // Trigger order is part of the contract; do not reorder.
    let mut remediations = Vec::new();
    if p95_ms > 500.0 {
        remediations.push(
            "Add a caching layer (CDN or reverse proxy) to bring p95 latency under 500ms"
                .to_string(),
        );
    }
    if throughput < 100.0 {
        remediations.push(
            "Increase serving capacity or add response caching; sustained throughput is below 100 req/s"
                .to_string(),
        );
    }
    if server_error_rate > 0.0 {
        remediations.push(
            "Enable auto-scaling and investigate 5xx responses observed under load".to_string(),
        );
    }
    if let Some(signals) = signals {
        if !signals.cicd {
            remediations.push(
                "Set up a CI/CD pipeline so fixes for the issues above ship safely".to_string(),
            );
        }
    }

    DerivedScores {
        conversion_loss_pct,
        ad_spend_risk,
        stability_risk_score,
        collapse_point_vus,
        remediations,
    }
}
