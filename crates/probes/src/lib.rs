// Copyright 2025 SitePulse Contributors
// SPDX-License-Identifier: Apache-2.0

//! Probe adapters for SitePulse.
//!
//! This crate provides the three heterogeneous probes the orchestrator
//! fans out over:
//!
//! - **Load probe**: drives an external load-generation binary against a
//!   target URL and captures its machine-readable summary.
//! - **Browser probe**: measures the in-browser experience via a pluggable
//!   browser engine, degrading to a flagged synthetic audit when the real
//!   audit cannot complete.
//! - **Repository probe**: the collaborator seam for static repository
//!   analysis, plus a filesystem-based implementation for local checkouts.
//!
//! Each adapter owns its own process/session handles and temporary
//! artifacts exclusively; nothing is shared across probes, so concurrent
//! orchestrations need no locking.
//!
//! # Example
//!
//! ```ignore
//! use sitepulse_probes::load::{LoadEngineConfig, LoadProbe};
//!
//! let probe = LoadProbe::new(LoadEngineConfig::default());
//! let outcome = probe.run("https://example.com", &params).await;
//! ```

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod browser;
pub mod load;
pub mod repo;

pub use browser::{BrowserEngine, BrowserProbe, BrowserSession};
pub use load::{LoadEngineConfig, LoadProbe};
pub use repo::{FsRepositoryAnalyzer, RepositoryAnalyzer};
