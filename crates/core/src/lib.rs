// Copyright 2025 SitePulse Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core types for SitePulse.
//!
//! This crate defines the data model shared by every SitePulse component:
//! the inbound probe request, the unified metrics schema produced by
//! normalization, the browser audit and repository signal shapes, the
//! derived business-risk scores, and the tagged [`ProbeOutcome`] type that
//! every probe adapter returns.
//!
//! All entities here are created fresh per orchestration run and hold no
//! cross-request state.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod error;
pub mod outcome;
pub mod snapshot;
pub mod types;

pub use error::{ProbeError, Result};
pub use outcome::{ProbeFailure, ProbeOutcome};
pub use snapshot::ResultSnapshot;
pub use types::{
    BrowserAudit, DerivedScores, LoadParams, ProbeRequest, ReadinessSummary, RepositorySignals,
    RiskLevel, UnifiedMetrics,
};
