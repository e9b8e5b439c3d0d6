//! Python finality checking for finch.
//!
//! This crate implements the three cooperating components of the check:
//! - [`collect`]: the Declaration Collector — scans module declarations and
//!   builds the [`finch_core::facts::FinalityStore`]
//! - [`hierarchy`]: the Hierarchy Validator — final-class subclassing and
//!   final-method/attribute overriding
//! - [`assign`]: the Assignment Validator — single-assignment, missing
//!   initializers, qualifier placement, literal hints
//!
//! Input is a *declaration snapshot*: the serde-serializable module model
//! in [`decl`], produced by a host frontend. [`check::check_modules`] is
//! the front door that runs all three components and returns a sorted,
//! deterministic diagnostic stream.

pub mod assign;
pub mod check;
pub mod collect;
pub mod decl;
pub mod hierarchy;
pub mod options;
pub mod qualifiers;
pub mod test_helpers;
