// Copyright 2025 SitePulse Contributors
// SPDX-License-Identifier: Apache-2.0

//! Load-generation probe adapter.
//!
//! Invokes an external k6-compatible load engine against a target URL for
//! a bounded duration and virtual-user count, directing the engine's
//! machine-readable summary to a uniquely-named temporary artifact, and
//! surfaces the parsed summary or a classified failure.
//!
//! # Contract with the engine
//!
//! The adapter depends only on the engine's observable behavior: a
//! `version` subcommand that exits zero when the binary is runnable, a
//! `run` subcommand accepting `--vus`, `--duration`, `--summary-export`,
//! and a workload script path, and the summary JSON it writes on exit.
//!
//! # Timeouts and artifacts
//!
//! The invocation is bounded by the requested duration plus a fixed grace
//! period; exceeding it kills the child and is reported as an execution
//! failure, never a hang. Artifact names embed a fresh UUID per
//! invocation, so concurrent orchestrations on one host cannot collide.
//! Artifacts are deleted best-effort on the success path.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde_json::Value;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use sitepulse_core::{LoadParams, ProbeError, ProbeOutcome};

/// Probe name recorded on failures.
const PROBE_NAME: &str = "load";

/// Minimal workload script handed to the engine. The target URL is
/// injected through the environment, not spliced into the script.
const WORKLOAD_SCRIPT: &str = r#"import http from "k6/http";
import { check } from "k6";

export default function () {
    const res = http.get(__ENV.SITEPULSE_TARGET_URL);
    check(res, { "status below 500": (r) => r.status < 500 });
}
"#;

/// Environment variable carrying the target URL into the workload script.
const TARGET_URL_ENV: &str = "SITEPULSE_TARGET_URL";

/// Configuration for the load engine invocation.
#[derive(Debug, Clone)]
pub struct LoadEngineConfig {
    /// Path or name of the load-generation binary.
    pub binary: PathBuf,
    /// Grace period added to the requested duration before the run is
    /// treated as hung.
    pub grace: Duration,
    /// Cap on captured stdout+stderr bytes; exceeding it fails the run.
    pub max_output_bytes: usize,
    /// Directory for per-invocation artifacts.
    pub temp_dir: PathBuf,
}

impl Default for LoadEngineConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("k6"),
            grace: Duration::from_secs(30),
            max_output_bytes: 1024 * 1024,
            temp_dir: std::env::temp_dir(),
        }
    }
}

/// Parse a bounded duration string of the form `"30s"`, `"2m"`, `"1h"`,
/// or bare seconds (`"45"`).
pub fn parse_duration(s: &str) -> Result<Duration, ProbeError> {
    let s = s.trim();
    let err = || ProbeError::InvalidRequest(format!("invalid duration string: {s:?}"));
    if s.is_empty() {
        return Err(err());
    }
    let (digits, unit) = match s.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => s.split_at(idx),
        None => (s, "s"),
    };
    let n: u64 = digits.parse().map_err(|_| err())?;
    if n == 0 {
        return Err(err());
    }
    let secs = match unit {
        "s" => n,
        "m" => n * 60,
        "h" => n * 3600,
        _ => return Err(err()),
    };
    Ok(Duration::from_secs(secs))
}

/// Adapter for the external load-generation engine.
pub struct LoadProbe {
    config: LoadEngineConfig,
}

impl LoadProbe {
    /// Create a probe with the given engine configuration.
    pub fn new(config: LoadEngineConfig) -> Self {
        Self { config }
    }

    /// Create a probe with default configuration (`k6` on PATH).
    pub fn with_defaults() -> Self {
        Self::new(LoadEngineConfig::default())
    }

    /// Run the load engine against `target_url` with the given parameters.
    ///
    /// Never panics and never returns a raw I/O error; every failure mode
    /// is converted into a classified [`ProbeOutcome::Failure`].
    pub async fn run(&self, target_url: &str, params: &LoadParams) -> ProbeOutcome<Value> {
        match self.run_inner(target_url, params).await {
            Ok(summary) => ProbeOutcome::success(summary),
            Err(error) => {
                warn!(%error, "load probe failed");
                ProbeOutcome::failure(PROBE_NAME, error)
            }
        }
    }

    async fn run_inner(&self, target_url: &str, params: &LoadParams) -> Result<Value, ProbeError> {
        if target_url.trim().is_empty() {
            return Err(ProbeError::InvalidRequest(
                "target URL must not be empty".to_string(),
            ));
        }
        if params.vus == 0 {
            return Err(ProbeError::InvalidRequest(
                "vus must be greater than zero".to_string(),
            ));
        }
        let run_duration = parse_duration(&params.duration)?;

        self.check_engine().await?;

        let run_id = Uuid::new_v4();
        let summary_path = self
            .config
            .temp_dir
            .join(format!("sitepulse-load-{run_id}.json"));
        let script_path = self
            .config
            .temp_dir
            .join(format!("sitepulse-script-{run_id}.js"));

        tokio::fs::write(&script_path, WORKLOAD_SCRIPT)
            .await
            .map_err(|e| {
                ProbeError::ExecutionFailed(format!("failed to stage workload script: {e}"))
            })?;

        info!(
            target = target_url,
            vus = params.vus,
            duration = %params.duration,
            "starting load run"
        );

        let result = self
            .execute(target_url, params, run_duration, &summary_path, &script_path)
            .await;

        // The script is ours on every path; the summary only once parsed.
        remove_best_effort(&script_path).await;
        let summary = result?;
        remove_best_effort(&summary_path).await;
        Ok(summary)
    }

    /// Verify the engine binary is present and runnable before a real run.
    async fn check_engine(&self) -> Result<(), ProbeError> {
        let status = Command::new(&self.config.binary)
            .arg("version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        match status {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(ProbeError::EngineUnavailable(format!(
                "{} version check exited with {status}",
                self.config.binary.display()
            ))),
            Err(e) => Err(ProbeError::EngineUnavailable(format!(
                "{} is not runnable: {e}",
                self.config.binary.display()
            ))),
        }
    }

    async fn execute(
        &self,
        target_url: &str,
        params: &LoadParams,
        run_duration: Duration,
        summary_path: &Path,
        script_path: &Path,
    ) -> Result<Value, ProbeError> {
        let mut cmd = Command::new(&self.config.binary);
        cmd.arg("run")
            .arg("--vus")
            .arg(params.vus.to_string())
            .arg("--duration")
            .arg(&params.duration)
            .arg("--summary-export")
            .arg(summary_path)
            .arg(script_path)
            .env(TARGET_URL_ENV, target_url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| ProbeError::ExecutionFailed(format!("failed to spawn engine: {e}")))?;

        let deadline = run_duration + self.config.grace;
        let output = match timeout(deadline, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ProbeError::ExecutionFailed(format!(
                    "engine process error: {e}"
                )))
            }
            Err(_) => {
                // kill_on_drop has already reaped the child here.
                return Err(ProbeError::ExecutionFailed(format!(
                    "engine exceeded {}s deadline",
                    deadline.as_secs()
                )));
            }
        };

        let captured = output.stdout.len() + output.stderr.len();
        if captured > self.config.max_output_bytes {
            return Err(ProbeError::ExecutionFailed(format!(
                "engine output of {captured} bytes exceeds the {} byte cap",
                self.config.max_output_bytes
            )));
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProbeError::ExecutionFailed(format!(
                "engine exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let raw = tokio::fs::read_to_string(summary_path).await.map_err(|e| {
            ProbeError::OutputMissing(format!(
                "summary artifact {} unreadable: {e}",
                summary_path.display()
            ))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| ProbeError::MalformedOutput(format!("summary is not valid JSON: {e}")))
    }
}

/// Delete an artifact, logging rather than failing on error.
async fn remove_best_effort(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        debug!(path = %path.display(), error = %e, "artifact cleanup skipped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(vus: u32, duration: &str) -> LoadParams {
        LoadParams {
            vus,
            duration: duration.to_string(),
        }
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("45").unwrap(), Duration::from_secs(45));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("10x").is_err());
        assert!(parse_duration("fast").is_err());
        assert!(parse_duration("-5s").is_err());
    }

    #[tokio::test]
    async fn test_missing_binary_fails_fast_as_engine_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let probe = LoadProbe::new(LoadEngineConfig {
            binary: dir.path().join("definitely-not-k6"),
            temp_dir: dir.path().to_path_buf(),
            ..LoadEngineConfig::default()
        });
        let outcome = probe.run("https://example.com", &params(5, "1s")).await;
        let failure = outcome.failure_ref().expect("expected failure");
        assert!(matches!(failure.error, ProbeError::EngineUnavailable(_)));
        assert_eq!(failure.probe, "load");
    }

    #[tokio::test]
    async fn test_invalid_duration_is_rejected_before_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let probe = LoadProbe::new(LoadEngineConfig {
            binary: dir.path().join("definitely-not-k6"),
            temp_dir: dir.path().to_path_buf(),
            ..LoadEngineConfig::default()
        });
        let outcome = probe.run("https://example.com", &params(5, "sideways")).await;
        let failure = outcome.failure_ref().expect("expected failure");
        assert!(matches!(failure.error, ProbeError::InvalidRequest(_)));
    }

    #[cfg(unix)]
    mod with_fake_engine {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Write an executable shell stub standing in for the engine.
        /// `body` runs for the `run` subcommand with `$out` bound to the
        /// `--summary-export` path.
        fn fake_engine(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("fake-engine");
            let script = format!(
                "#!/bin/sh\n\
                 if [ \"$1\" = \"version\" ]; then echo fake-engine v0.0.1; exit 0; fi\n\
                 out=\"\"\n\
                 prev=\"\"\n\
                 for a in \"$@\"; do\n\
                 \x20\x20if [ \"$prev\" = \"--summary-export\" ]; then out=\"$a\"; fi\n\
                 \x20\x20prev=\"$a\"\n\
                 done\n\
                 {body}\n"
            );
            std::fs::write(&path, script).unwrap();
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
            path
        }

        fn probe_with(dir: &Path, binary: PathBuf) -> LoadProbe {
            LoadProbe::new(LoadEngineConfig {
                binary,
                temp_dir: dir.to_path_buf(),
                grace: Duration::from_secs(5),
                ..LoadEngineConfig::default()
            })
        }

        #[tokio::test]
        async fn test_successful_run_parses_summary_and_cleans_up() {
            let dir = tempfile::tempdir().unwrap();
            let binary = fake_engine(
                dir.path(),
                r#"echo '{"metrics":{"http_reqs":{"rate":55.5}}}' > "$out""#,
            );
            let probe = probe_with(dir.path(), binary);

            let outcome = probe.run("https://example.com", &params(5, "1s")).await;
            let summary = outcome.ok().expect("expected success");
            assert_eq!(summary["metrics"]["http_reqs"]["rate"], 55.5);

            // Both the summary artifact and the staged script are gone.
            let leftovers: Vec<_> = std::fs::read_dir(dir.path())
                .unwrap()
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|name| name.starts_with("sitepulse-"))
                .collect();
            assert!(leftovers.is_empty(), "leftover artifacts: {leftovers:?}");
        }

        #[tokio::test]
        async fn test_nonzero_exit_is_execution_failed() {
            let dir = tempfile::tempdir().unwrap();
            let binary = fake_engine(dir.path(), "echo boom >&2; exit 3");
            let probe = probe_with(dir.path(), binary);

            let outcome = probe.run("https://example.com", &params(5, "1s")).await;
            let failure = outcome.failure_ref().expect("expected failure");
            assert!(matches!(failure.error, ProbeError::ExecutionFailed(_)));
            assert!(failure.error.to_string().contains("boom"));
        }

        #[tokio::test]
        async fn test_missing_artifact_is_output_missing() {
            let dir = tempfile::tempdir().unwrap();
            let binary = fake_engine(dir.path(), "exit 0");
            let probe = probe_with(dir.path(), binary);

            let outcome = probe.run("https://example.com", &params(5, "1s")).await;
            let failure = outcome.failure_ref().expect("expected failure");
            assert!(matches!(failure.error, ProbeError::OutputMissing(_)));
        }

        #[tokio::test]
        async fn test_unparsable_artifact_is_malformed_output() {
            let dir = tempfile::tempdir().unwrap();
            let binary = fake_engine(dir.path(), r#"echo 'not json at all' > "$out""#);
            let probe = probe_with(dir.path(), binary);

            let outcome = probe.run("https://example.com", &params(5, "1s")).await;
            let failure = outcome.failure_ref().expect("expected failure");
            assert!(matches!(failure.error, ProbeError::MalformedOutput(_)));
        }

        #[tokio::test]
        async fn test_hung_engine_is_killed_and_reported() {
            let dir = tempfile::tempdir().unwrap();
            let binary = fake_engine(dir.path(), "sleep 60");
            let probe = LoadProbe::new(LoadEngineConfig {
                binary,
                temp_dir: dir.path().to_path_buf(),
                grace: Duration::from_millis(200),
                ..LoadEngineConfig::default()
            });

            let outcome = probe.run("https://example.com", &params(5, "1s")).await;
            let failure = outcome.failure_ref().expect("expected failure");
            assert!(matches!(failure.error, ProbeError::ExecutionFailed(_)));
            assert!(failure.error.to_string().contains("deadline"));
        }

        #[tokio::test]
        async fn test_oversized_output_is_execution_failed() {
            let dir = tempfile::tempdir().unwrap();
            let binary = fake_engine(
                dir.path(),
                r#"head -c 4096 /dev/zero | tr '\0' 'x'; echo '{}' > "$out""#,
            );
            let probe = LoadProbe::new(LoadEngineConfig {
                binary,
                temp_dir: dir.path().to_path_buf(),
                grace: Duration::from_secs(5),
                max_output_bytes: 1024,
                ..LoadEngineConfig::default()
            });

            let outcome = probe.run("https://example.com", &params(5, "1s")).await;
            let failure = outcome.failure_ref().expect("expected failure");
            assert!(matches!(failure.error, ProbeError::ExecutionFailed(_)));
            assert!(failure.error.to_string().contains("cap"));
        }

        #[tokio::test]
        async fn test_concurrent_runs_do_not_collide() {
            let dir = tempfile::tempdir().unwrap();
            let binary = fake_engine(
                dir.path(),
                r#"echo "{\"metrics\":{\"vus_max\":{\"value\":$3}}}" > "$out""#,
            );
            let probe = std::sync::Arc::new(probe_with(dir.path(), binary));

            let a = {
                let probe = probe.clone();
                tokio::spawn(async move { probe.run("https://a.example", &params(7, "1s")).await })
            };
            let b = {
                let probe = probe.clone();
                tokio::spawn(async move { probe.run("https://b.example", &params(9, "1s")).await })
            };
            let (a, b) = (a.await.unwrap(), b.await.unwrap());
            assert!(a.is_success());
            assert!(b.is_success());
        }
    }
}
