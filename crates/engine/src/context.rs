// Copyright 2025 SitePulse Contributors
// SPDX-License-Identifier: Apache-2.0

//! Bounded textual context assembly for narrative generation.
//!
//! The context is a deterministic, human-readable summary of whatever the
//! probes produced, assembled in a fixed section order (runtime metrics,
//! then repository signals, then browser audit) with each section omitted
//! entirely when its data is absent. The result is hard-capped so the
//! downstream text-completion collaborator always receives a bounded
//! payload.

use std::fmt::Write as _;

use sitepulse_core::{
    BrowserAudit, DerivedScores, ReadinessSummary, RepositorySignals, UnifiedMetrics,
};

/// Hard cap on the assembled context, in characters.
pub const MAX_CONTEXT_CHARS: usize = 6000;

fn push_metric_line(out: &mut String, label: &str, value: Option<f64>, unit: &str) {
    if let Some(v) = value {
        // Infallible for String.
        let _ = writeln!(out, "- {label}: {v:.1}{unit}");
    }
}

/// Assemble the narrative context from whatever data is available.
pub fn build_context(
    metrics: Option<&UnifiedMetrics>,
    signals: Option<&RepositorySignals>,
    readiness: Option<&ReadinessSummary>,
    audit: Option<&BrowserAudit>,
    scores: &DerivedScores,
) -> String {
    let mut out = String::new();

    if let Some(metrics) = metrics.filter(|m| m.has_data()) {
        out.push_str("## Runtime metrics\n");
        push_metric_line(&mut out, "average latency", metrics.latency_avg_ms, "ms");
        push_metric_line(&mut out, "p95 latency", metrics.latency_p95_ms, "ms");
        push_metric_line(&mut out, "throughput", metrics.throughput_rps, " req/s");
        push_metric_line(
            &mut out,
            "check failure rate",
            metrics.failure_rate.map(|r| r * 100.0),
            "%",
        );
        push_metric_line(
            &mut out,
            "server error rate",
            metrics.server_error_rate.map(|r| r * 100.0),
            "%",
        );
        if let Some(vus) = metrics.vus {
            let _ = writeln!(out, "- virtual users: {vus}");
        }
        let _ = writeln!(
            out,
            "- derived: conversion loss {:.1}%, ad spend at risk ${}, stability {:.0}/100, projected collapse at {} VUs",
            scores.conversion_loss_pct,
            scores.ad_spend_risk,
            scores.stability_risk_score,
            scores.collapse_point_vus
        );
        for item in &scores.remediations {
            let _ = writeln!(out, "- remediation: {item}");
        }
        out.push('\n');
    }

    if let Some(signals) = signals {
        out.push_str("## Repository signals\n");
        let _ = writeln!(out, "- containerized: {}", yes_no(signals.docker));
        let _ = writeln!(out, "- ci/cd pipeline: {}", yes_no(signals.cicd));
        let _ = writeln!(out, "- kubernetes manifests: {}", yes_no(signals.kubernetes));
        let _ = writeln!(out, "- start script: {}", yes_no(signals.has_start_script));
        if let Some(readiness) = readiness {
            let _ = writeln!(
                out,
                "- devops score {}/100, production ready: {}, risk level: {}",
                readiness.devops_score,
                yes_no(readiness.production_ready),
                readiness.risk_level
            );
        }
        out.push('\n');
    }

    if let Some(audit) = audit {
        out.push_str("## Browser audit\n");
        if audit.is_simulated {
            out.push_str("- note: scores are simulated, no real navigation was performed\n");
        }
        let _ = writeln!(out, "- performance: {}/100", audit.performance);
        let _ = writeln!(out, "- accessibility: {}/100", audit.accessibility);
        let _ = writeln!(out, "- best practices: {}/100", audit.best_practices);
        let _ = writeln!(out, "- seo: {}/100", audit.seo);
        let _ = writeln!(out, "- interactivity: {}/100", audit.interactivity);
        if let Some(ms) = audit.load_time_ms {
            let _ = writeln!(out, "- page load time: {ms}ms");
        }
    }

    truncate_chars(out, MAX_CONTEXT_CHARS)
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

/// Truncate to at most `max` characters, on a char boundary.
fn truncate_chars(mut s: String, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => {
            s.truncate(idx);
            s
        }
        None => s,
    }
}
