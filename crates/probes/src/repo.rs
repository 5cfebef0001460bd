// Copyright 2025 SitePulse Contributors
// SPDX-License-Identifier: Apache-2.0

//! Repository probe seam.
//!
//! Static repository analysis is a collaborator: the orchestrator depends
//! only on the [`RepositoryAnalyzer`] trait and treats any failure as "no
//! repository signals available". A filesystem implementation for local
//! checkouts ships here so the CLI works end to end; richer analyzers
//! (remote hosting APIs, deeper manifest parsing) plug in behind the same
//! trait.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use sitepulse_core::{ProbeError, ProbeOutcome, RepositorySignals};

#[cfg(test)]
use mockall::automock;

/// Probe name recorded on failures.
const PROBE_NAME: &str = "repository";

/// Collaborator seam for static repository analysis.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RepositoryAnalyzer: Send + Sync {
    /// Inspect the repository named by `ident` for deployment and
    /// operational signals.
    async fn analyze(&self, ident: &str) -> ProbeOutcome<RepositorySignals>;
}

/// CI/CD definitions recognized by the filesystem analyzer.
const CICD_MARKERS: &[&str] = &[
    ".github/workflows",
    ".gitlab-ci.yml",
    ".circleci/config.yml",
    "Jenkinsfile",
];

/// Container build definitions recognized by the filesystem analyzer.
const DOCKER_MARKERS: &[&str] = &["Dockerfile", "docker-compose.yml", "docker-compose.yaml"];

/// Orchestration manifest locations recognized by the filesystem analyzer.
const KUBERNETES_MARKERS: &[&str] = &["k8s", "kubernetes", "deployment.yaml", "deployment.yml"];

/// Filesystem-based analyzer for locally checked-out repositories.
///
/// The identifier passed to [`RepositoryAnalyzer::analyze`] is resolved
/// relative to the configured root (or taken as an absolute path).
#[derive(Debug, Default)]
pub struct FsRepositoryAnalyzer {
    root: Option<PathBuf>,
}

impl FsRepositoryAnalyzer {
    /// Analyzer resolving identifiers against the given root directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, ident: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(ident),
            None => PathBuf::from(ident),
        }
    }
}

fn any_marker_present(repo: &Path, markers: &[&str]) -> bool {
    markers.iter().any(|m| repo.join(m).exists())
}

/// Whether the manifest declares a start script.
fn has_start_script(repo: &Path) -> bool {
    let manifest = repo.join("package.json");
    let Ok(raw) = std::fs::read_to_string(manifest) else {
        return false;
    };
    serde_json::from_str::<serde_json::Value>(&raw)
        .ok()
        .and_then(|v| v.get("scripts")?.get("start").cloned())
        .is_some()
}

#[async_trait]
impl RepositoryAnalyzer for FsRepositoryAnalyzer {
    async fn analyze(&self, ident: &str) -> ProbeOutcome<RepositorySignals> {
        let repo = self.resolve(ident);
        if !repo.is_dir() {
            return ProbeOutcome::failure(
                PROBE_NAME,
                ProbeError::RepositoryAnalysisFailed(format!(
                    "{} is not an accessible directory",
                    repo.display()
                )),
            );
        }

        // Marker checks are cheap stat calls; run them off the async path.
        let signals = tokio::task::spawn_blocking(move || RepositorySignals {
            docker: any_marker_present(&repo, DOCKER_MARKERS),
            cicd: any_marker_present(&repo, CICD_MARKERS),
            kubernetes: any_marker_present(&repo, KUBERNETES_MARKERS),
            has_start_script: has_start_script(&repo),
        })
        .await;

        match signals {
            Ok(signals) => {
                debug!(?signals, ident, "repository analysis complete");
                ProbeOutcome::success(signals)
            }
            Err(e) => ProbeOutcome::failure(
                PROBE_NAME,
                ProbeError::RepositoryAnalysisFailed(format!("analysis task failed: {e}")),
            ),
        }
    }
}
