//! finch: finality checking for Python declaration snapshots.
//!
//! Enforces the two finality contracts as static-analysis diagnostics:
//! `@final` classes and methods must not be subclassed or overridden, and
//! `Final` variables and attributes must be bound exactly once. The checker
//! is layered over a host frontend's declaration-level view of a program
//! and never executes or mutates anything.

// Core infrastructure - re-exported from finch-core
pub use finch_core::diagnostics;
pub use finch_core::error;
pub use finch_core::facts;
pub use finch_core::hash;
pub use finch_core::output;
pub use finch_core::types;

// Python finality checking
pub use finch_python as python;

// Front doors
pub mod cli;
pub mod snapshot;
