// Copyright 2025 SitePulse Contributors
// SPDX-License-Identifier: Apache-2.0

//! Orchestration engine for SitePulse.
//!
//! Composes the probe adapters into one run: fans out the load, browser,
//! and repository probes concurrently with per-probe failure isolation,
//! joins their tagged outcomes, drives normalization and score derivation,
//! assembles the bounded narrative context, and hands the completed
//! snapshot to the persistence collaborator.
//!
//! The contract for callers is "always returns a result object; inspect
//! field presence to know what succeeded" — the engine fails a request
//! only when the request itself names no target of any kind.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;
pub mod context;
pub mod narrative;
pub mod orchestrator;
pub mod store;

pub use config::{BrowserMode, EngineConfig};
pub use context::{build_context, MAX_CONTEXT_CHARS};
pub use narrative::{
    narrate, DisabledNarrative, NarrativeError, NarrativeGenerator, NARRATIVE_INSTRUCTION,
};
pub use orchestrator::{OrchestrationResult, Orchestrator};
pub use store::{JsonFileStore, SnapshotStore, StoreError};
