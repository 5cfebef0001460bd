//! Normalization of raw load-engine summaries.
//!
//! The load engine's summary export is semi-structured JSON. It is parsed
//! here, at one narrow boundary, into [`UnifiedMetrics`]; invalid shapes
//! are rejected here rather than leaking downstream into the score
//! formulas.

use serde_json::Value;
use sitepulse_core::{ProbeError, Result, UnifiedMetrics};

/// Read a named numeric field from a sub-metric object, treating missing
/// or non-finite values as unavailable.
fn metric_field(metrics: &Value, metric: &str, field: &str) -> Option<f64> {
    let n = metrics.get(metric)?.get(field)?.as_f64()?;
    n.is_finite().then_some(n)
}

/// Clamp a fraction into [0,1].
fn clamp_rate(rate: f64) -> f64 {
    rate.clamp(0.0, 1.0)
}

/// Floor a magnitude at zero.
fn non_negative(n: f64) -> f64 {
    n.max(0.0)
}

/// Transform a raw load-engine summary into the canonical metrics schema.
///
/// Pure function, no I/O. `configured_vus` is the virtual-user count the
/// run was requested with; it is used when the summary itself does not
/// report one.
///
/// The summary must be a JSON object with a `metrics` object; anything
/// else is a [`ProbeError::MalformedOutput`]. Within `metrics`, each
/// sub-metric is optional: a field that is missing or non-finite becomes
/// `None` in the output, never NaN.
pub fn normalize(raw: &Value, configured_vus: u32) -> Result<UnifiedMetrics> {
    let metrics = raw
        .get("metrics")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            ProbeError::MalformedOutput("summary is missing a `metrics` object".to_string())
        })?;
    let metrics = Value::Object(metrics.clone());

    let latency_avg_ms =
        metric_field(&metrics, "http_req_duration", "avg").map(non_negative);
    let latency_p95_ms =
        metric_field(&metrics, "http_req_duration", "p(95)").map(non_negative);
    let throughput_rps = metric_field(&metrics, "http_reqs", "rate").map(non_negative);

    // checks failed / checks total; a run with zero checks has no failure
    // rate rather than a zero one.
    let failure_rate = match (
        metric_field(&metrics, "checks", "passes"),
        metric_field(&metrics, "checks", "fails"),
    ) {
        (Some(passes), Some(fails)) if passes + fails > 0.0 => {
            Some(clamp_rate(fails / (passes + fails)))
        }
        _ => None,
    };

    let server_error_rate =
        metric_field(&metrics, "http_req_failed", "value").map(clamp_rate);

    let vus = metric_field(&metrics, "vus_max", "value")
        .map(|v| non_negative(v) as u32)
        .or(Some(configured_vus));

    Ok(UnifiedMetrics {
        latency_avg_ms,
        latency_p95_ms,
        throughput_rps,
        failure_rate,
        server_error_rate,
        vus,
    })
}
