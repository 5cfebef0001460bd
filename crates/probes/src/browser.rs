// Copyright 2025 SitePulse Contributors
// SPDX-License-Identifier: Apache-2.0

//! Browser-experience probe adapter.
//!
//! Measures navigation timing and a fixed set of in-page heuristics
//! (accessibility, SEO, best-practice signals) through a pluggable
//! [`BrowserEngine`]. The probe is infallible to its caller: audit
//! strategy is selected explicitly up front (`Real` vs `Simulated`), and
//! the real branch degrades to exactly one invocation of the simulated
//! branch on any engine error. The simulated branch never recurses, so a
//! failed real audit always surfaces as a result flagged `is_simulated`,
//! never as an orchestration failure.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use sitepulse_core::BrowserAudit;

#[cfg(test)]
use mockall::automock;

/// Fixed navigation timeout for real audits.
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed delay before a simulated audit is returned.
const SIMULATED_DELAY: Duration = Duration::from_millis(300);

/// In-page snapshot script. Returns the raw facts the heuristics need;
/// all scoring happens on this side of the boundary.
const PAGE_SNAPSHOT_SCRIPT: &str = r#"(() => {
    const images = Array.from(document.querySelectorAll("img"));
    return {
        imageCount: images.length,
        imagesWithAlt: images.filter(i => i.alt && i.alt.trim().length > 0).length,
        title: document.title || "",
        hasMetaDescription: !!document.querySelector('meta[name="description"]'),
    };
})()"#;

/// Errors surfaced by a browser engine.
#[derive(Debug, Error)]
pub enum BrowserEngineError {
    /// The engine could not open a session.
    #[error("browser session launch failed: {0}")]
    Launch(String),

    /// Navigation failed or timed out.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// In-page script evaluation failed or returned an unusable shape.
    #[error("script evaluation failed: {0}")]
    Evaluation(String),
}

/// An open browser session.
///
/// The adapter depends only on "navigate, wait for idle, evaluate script,
/// close"; timing is measured on this side of the seam.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate to `url` and wait for network idleness, bounded by
    /// `timeout`.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserEngineError>;

    /// Evaluate a script in the page and return its JSON result.
    async fn evaluate(&mut self, script: &str) -> Result<Value, BrowserEngineError>;

    /// Close the session. Called on success and failure paths alike.
    async fn close(&mut self);
}

/// A browser-automation engine capable of opening isolated sessions.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Open a fresh isolated session.
    async fn open_session(&self) -> Result<Box<dyn BrowserSession>, BrowserEngineError>;
}

/// Raw facts extracted from the page by [`PAGE_SNAPSHOT_SCRIPT`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageSnapshot {
    image_count: u32,
    images_with_alt: u32,
    #[serde(default)]
    title: String,
    #[serde(default)]
    has_meta_description: bool,
}

/// Audit strategy, selected once at construction.
enum AuditStrategy {
    /// Synthetic audit with plausible randomized scores.
    Simulated,
    /// Real audit through an engine, degrading to one simulated audit on
    /// failure.
    Real(Arc<dyn BrowserEngine>),
}

/// Browser-experience probe.
pub struct BrowserProbe {
    strategy: AuditStrategy,
}

impl BrowserProbe {
    /// Build a probe that always produces simulated audits.
    pub fn simulated() -> Self {
        Self {
            strategy: AuditStrategy::Simulated,
        }
    }

    /// Build a probe that audits through the given engine.
    pub fn real(engine: Arc<dyn BrowserEngine>) -> Self {
        Self {
            strategy: AuditStrategy::Real(engine),
        }
    }

    /// Audit `target_url`.
    ///
    /// Infallible: the worst case is a simulated audit flagged as such.
    pub async fn run(&self, target_url: &str) -> BrowserAudit {
        match &self.strategy {
            AuditStrategy::Simulated => simulated_audit().await,
            AuditStrategy::Real(engine) => {
                match real_audit(engine.as_ref(), target_url).await {
                    Ok(audit) => audit,
                    Err(error) => {
                        warn!(%error, "real audit failed, degrading to simulated");
                        simulated_audit().await
                    }
                }
            }
        }
    }
}

/// Produce a synthetic audit after a short fixed delay.
async fn simulated_audit() -> BrowserAudit {
    tokio::time::sleep(SIMULATED_DELAY).await;
    let mut rng = rand::thread_rng();
    BrowserAudit {
        performance: rng.gen_range(75..=95),
        accessibility: rng.gen_range(85..=95),
        best_practices: rng.gen_range(80..=95),
        seo: rng.gen_range(90..=100),
        interactivity: rng.gen_range(70..=95),
        load_time_ms: None,
        is_simulated: true,
    }
}

/// Run a real audit through the engine, closing the session on all paths.
async fn real_audit(
    engine: &dyn BrowserEngine,
    target_url: &str,
) -> Result<BrowserAudit, BrowserEngineError> {
    let mut session = engine.open_session().await?;
    let result = audit_in_session(session.as_mut(), target_url).await;
    session.close().await;
    result
}

async fn audit_in_session(
    session: &mut dyn BrowserSession,
    target_url: &str,
) -> Result<BrowserAudit, BrowserEngineError> {
    let started = Instant::now();
    session.navigate(target_url, NAVIGATION_TIMEOUT).await?;
    let load_time_ms = started.elapsed().as_millis() as u64;

    let raw = session.evaluate(PAGE_SNAPSHOT_SCRIPT).await?;
    let snapshot: PageSnapshot = serde_json::from_value(raw)
        .map_err(|e| BrowserEngineError::Evaluation(format!("unexpected snapshot shape: {e}")))?;

    info!(target = target_url, load_time_ms, "real audit completed");
    Ok(score_audit(&snapshot, target_url, load_time_ms))
}

/// Apply the fixed heuristics to the page snapshot.
fn score_audit(snapshot: &PageSnapshot, target_url: &str, load_time_ms: u64) -> BrowserAudit {
    let accessibility = if snapshot.image_count == 0 {
        100
    } else {
        (f64::from(snapshot.images_with_alt) / f64::from(snapshot.image_count) * 100.0).round()
            as u8
    };

    let title_ok = !snapshot.title.trim().is_empty();
    let seo = ((u8::from(title_ok) + u8::from(snapshot.has_meta_description)) as f64 / 2.0 * 100.0)
        .round() as u8;

    // One term is a hard-coded 100; kept as found for score compatibility,
    // so this can never drop below 50.
    let https = target_url.starts_with("https://");
    let best_practices = ((if https { 100.0f64 } else { 0.0 } + 100.0) / 2.0).round() as u8;

    let performance = (100.0 - load_time_ms as f64 / 100.0).max(0.0).round() as u8;
    let interactivity = (performance + 5).min(100);

    BrowserAudit {
        performance,
        accessibility,
        best_practices,
        seo,
        interactivity,
        load_time_ms: Some(load_time_ms),
        is_simulated: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(images: u32, with_alt: u32, title: &str, meta: bool) -> PageSnapshot {
        PageSnapshot {
            image_count: images,
            images_with_alt: with_alt,
            title: title.to_string(),
            has_meta_description: meta,
        }
    }

    #[test]
    fn test_accessibility_is_alt_coverage() {
        let audit = score_audit(&snapshot(4, 3, "t", true), "https://x", 0);
        assert_eq!(audit.accessibility, 75);
    }

    #[test]
    fn test_accessibility_with_no_images_is_perfect() {
        let audit = score_audit(&snapshot(0, 0, "t", true), "https://x", 0);
        assert_eq!(audit.accessibility, 100);
    }

    #[test]
    fn test_seo_averages_title_and_meta_checks() {
        assert_eq!(score_audit(&snapshot(0, 0, "t", true), "https://x", 0).seo, 100);
        assert_eq!(score_audit(&snapshot(0, 0, "t", false), "https://x", 0).seo, 50);
        assert_eq!(score_audit(&snapshot(0, 0, " ", false), "https://x", 0).seo, 0);
    }

    #[test]
    fn test_best_practices_floor_is_fifty() {
        assert_eq!(
            score_audit(&snapshot(0, 0, "t", true), "https://x", 0).best_practices,
            100
        );
        assert_eq!(
            score_audit(&snapshot(0, 0, "t", true), "http://x", 0).best_practices,
            50
        );
    }

    #[test]
    fn test_performance_decays_linearly_with_load_time() {
        assert_eq!(score_audit(&snapshot(0, 0, "t", true), "https://x", 0).performance, 100);
        assert_eq!(
            score_audit(&snapshot(0, 0, "t", true), "https://x", 5000).performance,
            50
        );
        assert_eq!(
            score_audit(&snapshot(0, 0, "t", true), "https://x", 20_000).performance,
            0
        );
    }

    #[test]
    fn test_interactivity_tracks_performance_capped_at_100() {
        let fast = score_audit(&snapshot(0, 0, "t", true), "https://x", 0);
        assert_eq!(fast.interactivity, 100);
        let mid = score_audit(&snapshot(0, 0, "t", true), "https://x", 5000);
        assert_eq!(mid.interactivity, 55);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_scores_stay_in_documented_ranges() {
        for _ in 0..25 {
            let audit = BrowserProbe::simulated().run("https://example.com").await;
            assert!(audit.is_simulated);
            assert!(audit.load_time_ms.is_none());
            assert!((75..=95).contains(&audit.performance));
            assert!((85..=95).contains(&audit.accessibility));
            assert!((80..=95).contains(&audit.best_practices));
            assert!((90..=100).contains(&audit.seo));
            assert!((70..=95).contains(&audit.interactivity));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_real_audit_scores_from_engine_snapshot() {
        let mut engine = MockBrowserEngine::new();
        engine.expect_open_session().returning(|| {
            let mut session = MockBrowserSession::new();
            session.expect_navigate().returning(|_, _| Ok(()));
            session.expect_evaluate().returning(|_| {
                Ok(json!({
                    "imageCount": 2,
                    "imagesWithAlt": 2,
                    "title": "Storefront",
                    "hasMetaDescription": true
                }))
            });
            session.expect_close().times(1).returning(|| ());
            Ok(Box::new(session) as Box<dyn BrowserSession>)
        });

        let probe = BrowserProbe::real(Arc::new(engine));
        let audit = probe.run("https://example.com").await;
        assert!(!audit.is_simulated);
        assert_eq!(audit.accessibility, 100);
        assert_eq!(audit.seo, 100);
        assert_eq!(audit.best_practices, 100);
        assert!(audit.load_time_ms.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_failure_degrades_to_flagged_simulated() {
        let mut engine = MockBrowserEngine::new();
        engine.expect_open_session().returning(|| {
            let mut session = MockBrowserSession::new();
            session.expect_navigate().returning(|_, _| {
                Err(BrowserEngineError::Navigation("net::ERR_TIMED_OUT".to_string()))
            });
            // Session still closed even though navigation failed.
            session.expect_close().times(1).returning(|| ());
            Ok(Box::new(session) as Box<dyn BrowserSession>)
        });

        let probe = BrowserProbe::real(Arc::new(engine));
        let audit = probe.run("https://unreachable.invalid").await;
        assert!(audit.is_simulated);
        assert!((75..=95).contains(&audit.performance));
    }

    #[tokio::test(start_paused = true)]
    async fn test_launch_failure_degrades_to_flagged_simulated() {
        let mut engine = MockBrowserEngine::new();
        engine.expect_open_session().returning(|| {
            Err(BrowserEngineError::Launch("no browser binary".to_string()))
        });

        let probe = BrowserProbe::real(Arc::new(engine));
        let audit = probe.run("https://example.com").await;
        assert!(audit.is_simulated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_snapshot_degrades_to_flagged_simulated() {
        let mut engine = MockBrowserEngine::new();
        engine.expect_open_session().returning(|| {
            let mut session = MockBrowserSession::new();
            session.expect_navigate().returning(|_, _| Ok(()));
            session
                .expect_evaluate()
                .returning(|_| Ok(json!("not an object")));
            session.expect_close().times(1).returning(|| ());
            Ok(Box::new(session) as Box<dyn BrowserSession>)
        });

        let probe = BrowserProbe::real(Arc::new(engine));
        let audit = probe.run("https://example.com").await;
        assert!(audit.is_simulated);
    }
}
