//! Configuration for the finality check.

use serde::{Deserialize, Serialize};

/// Options controlling leniency and recording behavior.
///
/// Defaults are lenient: loop-body rebinding passes silently, literal
/// hints are recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalityOptions {
    /// Flag re-bindings of final names that occur inside loop bodies.
    ///
    /// A qualifier use inside a loop can produce multiple runtime bindings
    /// of the same name; checkers are permitted but not required to flag
    /// it, so this defaults to off.
    pub flag_loop_assignments: bool,
    /// Record literal initializer values for downstream substitution.
    pub record_literal_hints: bool,
}

impl Default for FinalityOptions {
    fn default() -> Self {
        FinalityOptions {
            flag_loop_assignments: false,
            record_literal_hints: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_lenient() {
        let options = FinalityOptions::default();
        assert!(!options.flag_loop_assignments);
        assert!(options.record_literal_hints);
    }
}
