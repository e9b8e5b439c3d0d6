//! Core infrastructure for finch: locations, content hashes, diagnostics,
//! the finality facts store, the JSON output contract, and the unified
//! error type.
//!
//! The checking components themselves live in `finch-python`; this crate
//! holds everything they share:
//! - [`types::Location`]: source locations with deterministic ordering
//! - [`hash::ContentHash`] / [`hash::SnapshotId`]: snapshot identity
//! - [`diagnostics`]: the finality violation taxonomy and sink
//! - [`facts::FinalityStore`]: classes, methods, qualified symbols, bindings
//! - [`output`]: the agent-facing JSON response schema
//! - [`error::FinchError`]: operational errors with stable exit codes

pub mod diagnostics;
pub mod error;
pub mod facts;
pub mod hash;
pub mod output;
pub mod types;
