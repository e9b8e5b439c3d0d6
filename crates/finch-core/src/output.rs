//! JSON output types and serialization for CLI responses.
//!
//! These types form the agent contract for `finch check`:
//!
//! 1. **Structured JSON:** all structured CLI output is valid JSON
//! 2. **Status first:** every response has `status` as first field
//! 3. **Deterministic:** same input produces byte-identical output
//! 4. **Versioned:** schema version in every response enables forward
//!    compatibility

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostic;
use crate::error::{FinchError, OutputErrorCode};
use crate::facts::LiteralValue;
use crate::types::Location;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Response Payload Types
// ============================================================================

/// Diagnostic information for JSON output.
///
/// Named `DiagnosticInfo` to distinguish from [`Diagnostic`] (the internal
/// type); the "Info" suffix marks an information carrier for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticInfo {
    /// Stable violation code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Where the violation occurred.
    pub location: Location,
}

impl From<&Diagnostic> for DiagnosticInfo {
    fn from(d: &Diagnostic) -> Self {
        DiagnosticInfo {
            code: d.kind.code().to_string(),
            message: d.message.clone(),
            location: d.location.clone(),
        }
    }
}

/// Summary counts for a completed check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryInfo {
    /// Modules analyzed.
    pub modules: usize,
    /// Classes registered.
    pub classes: usize,
    /// Final classes.
    pub final_classes: usize,
    /// Final methods.
    pub final_methods: usize,
    /// Final variables/attributes.
    pub final_symbols: usize,
    /// Violations reported.
    pub violations: usize,
}

/// A recorded literal-substitution hint for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiteralHintInfo {
    /// Qualified symbol name (`pkg.mod.RATE`, `pkg.mod.Cls.x`).
    pub symbol: String,
    /// The literal the symbol is bound to.
    pub value: LiteralValue,
}

// ============================================================================
// Responses
// ============================================================================

/// Response for a completed check (with or without violations).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResponse {
    /// "ok" when no violations, "violations" otherwise.
    pub status: String,
    /// Output schema version.
    pub schema_version: String,
    /// Identity of the checked snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    /// Summary counts.
    pub summary: SummaryInfo,
    /// Violations, sorted by (location, code, message).
    pub diagnostics: Vec<DiagnosticInfo>,
    /// Literal-substitution hints, when recorded.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub literal_hints: Vec<LiteralHintInfo>,
}

impl CheckResponse {
    /// Status string for a clean check.
    pub const STATUS_OK: &'static str = "ok";
    /// Status string when violations were reported.
    pub const STATUS_VIOLATIONS: &'static str = "violations";
}

/// Error information for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable integer code (matches the CLI exit code).
    pub code: u8,
    /// Stable kind string.
    pub kind: String,
    /// Human-readable message.
    pub message: String,
}

impl ErrorInfo {
    /// Build error info from a unified error.
    pub fn from_error(err: &FinchError) -> Self {
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Response envelope for operational failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always "error".
    pub status: String,
    /// Output schema version.
    pub schema_version: String,
    /// The failure.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Build an error response from a unified error.
    pub fn from_error(err: &FinchError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Serialize a response as JSON followed by a newline.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    serde_json::to_writer(&mut *writer, response).map_err(io::Error::other)?;
    writeln!(writer)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;

    fn sample_summary() -> SummaryInfo {
        SummaryInfo {
            modules: 1,
            classes: 2,
            final_classes: 1,
            final_methods: 0,
            final_symbols: 1,
            violations: 1,
        }
    }

    #[test]
    fn status_is_first_field() {
        let response = CheckResponse {
            status: CheckResponse::STATUS_OK.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            snapshot_id: None,
            summary: sample_summary(),
            diagnostics: vec![],
            literal_hints: vec![],
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.starts_with("{\"status\":\"ok\""), "got: {}", json);
    }

    #[test]
    fn empty_hints_are_omitted() {
        let response = CheckResponse {
            status: CheckResponse::STATUS_VIOLATIONS.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            snapshot_id: Some("snap_0011223344556677".to_string()),
            summary: sample_summary(),
            diagnostics: vec![],
            literal_hints: vec![],
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("literal_hints"));
        assert!(json.contains("snap_0011223344556677"));
    }

    #[test]
    fn diagnostic_info_carries_stable_code() {
        let d = Diagnostic::new(
            DiagnosticKind::MissingInitializer,
            "final attribute `x` without an initializer",
            Location::new("mod.py", 3, 5),
        );
        let info = DiagnosticInfo::from(&d);
        assert_eq!(info.code, "missing-initializer");
        assert_eq!(info.location.line, 3);
    }

    #[test]
    fn error_response_mirrors_exit_code() {
        let err = FinchError::snapshot_not_found("gone.json");
        let response = ErrorResponse::from_error(&err);
        assert_eq!(response.status, "error");
        assert_eq!(response.error.code, 3);
        assert_eq!(response.error.kind, "snapshot-not-found");
    }

    #[test]
    fn emit_response_appends_newline() {
        let err = FinchError::invalid_args("nope");
        let response = ErrorResponse::from_error(&err);
        let mut buf = Vec::new();
        emit_response(&response, &mut buf).unwrap();
        assert!(buf.ends_with(b"\n"));
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("{\"status\":\"error\""));
    }
}
