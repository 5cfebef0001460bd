// Copyright 2025 SitePulse Contributors
// SPDX-License-Identifier: Apache-2.0

//! Narrative-generation collaborator seam.
//!
//! The narrative verdict comes from an external text-completion service.
//! The engine's only obligations are to hand it the bounded context plus a
//! fixed instruction payload, and to substitute fallback text whenever the
//! collaborator errors or returns nothing usable. A collaborator failure
//! never fails an orchestration.

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use sitepulse_core::DerivedScores;

#[cfg(test)]
use mockall::automock;

/// Fixed instruction payload sent with every context.
pub const NARRATIVE_INSTRUCTION: &str = "You are a performance consultant. Using only the \
measurements in the provided context, write a short plain-language verdict on the target's \
production readiness and business risk. Lead with the most severe finding. Do not invent \
numbers that are not in the context.";

/// Errors surfaced by a narrative collaborator.
#[derive(Debug, Error)]
pub enum NarrativeError {
    /// No collaborator is configured.
    #[error("narrative generation unavailable: {0}")]
    Unavailable(String),

    /// The collaborator call failed.
    #[error("narrative generation failed: {0}")]
    Failed(String),
}

/// External text-completion collaborator.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// Generate a verdict from the assembled context and instruction.
    async fn generate(&self, context: &str, instruction: &str)
        -> Result<String, NarrativeError>;
}

/// A generator stub for deployments without a text-completion service;
/// always routes callers onto the fallback text.
#[derive(Debug, Default)]
pub struct DisabledNarrative;

#[async_trait]
impl NarrativeGenerator for DisabledNarrative {
    async fn generate(&self, _: &str, _: &str) -> Result<String, NarrativeError> {
        Err(NarrativeError::Unavailable(
            "no narrative collaborator configured".to_string(),
        ))
    }
}

/// Deterministic fallback verdict used when generation fails.
pub fn fallback_narrative(has_metrics: bool, scores: &DerivedScores) -> String {
    if !has_metrics {
        return "No runtime metrics were collected for this run; the load probe did not \
                produce telemetry, so no performance verdict can be given."
            .to_string();
    }
    let mut text = format!(
        "Automated verdict: estimated conversion loss {:.1}%, stability score {:.0}/100, \
         projected collapse at {} virtual users.",
        scores.conversion_loss_pct, scores.stability_risk_score, scores.collapse_point_vus
    );
    if !scores.remediations.is_empty() {
        text.push_str(" Top remediation: ");
        text.push_str(&scores.remediations[0]);
        text.push('.');
    }
    text
}

/// Obtain the narrative text, substituting the fallback on any error or
/// empty response.
pub async fn narrate(
    generator: &dyn NarrativeGenerator,
    context: &str,
    has_metrics: bool,
    scores: &DerivedScores,
) -> String {
    match generator.generate(context, NARRATIVE_INSTRUCTION).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            warn!("narrative collaborator returned empty text, using fallback");
            fallback_narrative(has_metrics, scores)
        }
        Err(error) => {
            warn!(%error, "narrative generation failed, using fallback");
            fallback_narrative(has_metrics, scores)
        }
    }
}
