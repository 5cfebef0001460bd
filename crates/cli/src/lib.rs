//! CLI for SitePulse.
//!
//! This crate provides the command-line interface for SitePulse: the
//! `probe` subcommand runs one complete orchestration against a target
//! URL and/or repository checkout and writes the result snapshot, and
//! `status` prints the effective configuration.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sitepulse_core::{LoadParams, ProbeRequest};
use sitepulse_engine::{
    DisabledNarrative, EngineConfig, JsonFileStore, Orchestrator, SnapshotStore,
};
use sitepulse_probes::FsRepositoryAnalyzer;

/// SitePulse CLI.
#[derive(Parser, Debug)]
#[command(name = "sitepulse")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe a target and write the result snapshot.
    ///
    /// Runs the load, browser, and repository probes concurrently for
    /// whichever targets were supplied, derives the risk scores, and
    /// writes one JSON snapshot per run under the output directory.
    Probe {
        /// Target URL to probe.
        #[arg(short, long)]
        url: Option<String>,

        /// Local repository checkout to analyze.
        #[arg(short, long)]
        repo: Option<PathBuf>,

        /// Virtual users for the load run.
        #[arg(long, default_value_t = 10)]
        vus: u32,

        /// Load run duration (e.g. 30s, 2m).
        #[arg(long, default_value = "30s")]
        duration: String,

        /// Load engine binary.
        #[arg(long, env = "SITEPULSE_LOAD_BINARY", default_value = "k6")]
        load_binary: PathBuf,

        /// Output directory for run snapshots.
        #[arg(short, long, env = "SITEPULSE_OUTPUT_DIR", default_value = "sitepulse-output")]
        output: PathBuf,

        /// Print the full snapshot JSON to stdout.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show probe configuration.
    Status {
        /// Show detailed status information.
        #[arg(short, long)]
        detailed: bool,
    },
}

/// Run the CLI with the given arguments.
pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Probe {
            url,
            repo,
            vus,
            duration,
            load_binary,
            output,
            verbose,
        } => {
            let config = EngineConfig {
                load_binary,
                output_dir: output,
                ..EngineConfig::default()
            };

            let request = ProbeRequest {
                target_url: url,
                repository: repo.map(|p| p.to_string_lossy().into_owned()),
                load: LoadParams { vus, duration },
            };

            let orchestrator =
                Orchestrator::from_config(&config, Arc::new(FsRepositoryAnalyzer::default()));
            let snapshot = orchestrator
                .execute_to_snapshot(&request, &DisabledNarrative)
                .await
                .context("orchestration failed")?;

            let store = JsonFileStore::new(&config.output_dir);
            store
                .persist(&snapshot)
                .await
                .context("failed to persist snapshot")?;

            println!("Run {} complete", snapshot.run_id);
            if let Some(metrics) = &snapshot.metrics {
                if let Some(avg) = metrics.latency_avg_ms {
                    println!("  avg latency:     {avg:.1}ms");
                }
                if let Some(rps) = metrics.throughput_rps {
                    println!("  throughput:      {rps:.1} req/s");
                }
                println!(
                    "  stability:       {:.0}/100",
                    snapshot.scores.stability_risk_score
                );
                println!(
                    "  collapse point:  {} VUs",
                    snapshot.scores.collapse_point_vus
                );
            } else {
                println!("  no runtime metrics were collected");
            }
            if let Some(readiness) = &snapshot.readiness {
                println!(
                    "  devops score:    {}/100 ({} risk)",
                    readiness.devops_score, readiness.risk_level
                );
            }
            for item in &snapshot.scores.remediations {
                println!("  remediation:     {item}");
            }
            println!("Snapshot written to {}", store.path_for(&snapshot).display());

            if verbose {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }

            Ok(())
        }
        Commands::Status { detailed } => {
            let config = EngineConfig::default();
            println!("SitePulse Probe Engine");
            println!("Version: {}", env!("CARGO_PKG_VERSION"));

            if detailed {
                println!("\nDefaults:");
                println!("  load engine:   {}", config.load_binary.display());
                println!("  grace period:  {}s", config.load_grace_secs);
                println!("  output dir:    {}", config.output_dir.display());
                println!("  browser audit: simulated");
            }

            Ok(())
        }
    }
}
