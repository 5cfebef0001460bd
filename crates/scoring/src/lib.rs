//! Metrics normalization and deterministic risk scoring.
//!
//! This crate holds the pure half of SitePulse: the normalizer that maps a
//! raw load-engine summary into the canonical
//! [`sitepulse_core::UnifiedMetrics`] schema, the readiness summary over
//! repository signals, and the derived-score calculator. Nothing here
//! performs I/O; every function is deterministic over its inputs so scores
//! are reproducible and auditable.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod derive;
pub mod normalize;
pub mod readiness;

pub use derive::compute;
pub use normalize::normalize;
pub use readiness::summarize;
