//! Unified diagnostic type used across all phases.
//!
//! Diagnostics never abort compilation on their own: every phase pushes into a
//! shared [`Diagnostics`] sink and keeps going with a best-effort tree.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::parse::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Parse,
    Transform,
    Validate,
    Heal,
    Graph,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Parse => write!(f, "Parse"),
            Phase::Transform => write!(f, "Transform"),
            Phase::Validate => write!(f, "Validate"),
            Phase::Heal => write!(f, "Heal"),
            Phase::Graph => write!(f, "Graph"),
        }
    }
}

/// How recoverable a diagnostic is.
///
/// Errors mark structurally required data that is missing, warnings mark
/// repairs the compiler made on the author's behalf, and information marks
/// constructs that were ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Numeric severity used by editor protocols (LSP `DiagnosticSeverity`).
    pub fn lsp_code(&self) -> u8 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Information => 3,
            Severity::Hint => 4,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Information => write!(f, "information"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("[{phase}:{code}] {severity}: {message}")]
pub struct Diagnostic {
    pub code: String,
    pub phase: Phase,
    pub severity: Severity,
    pub message: String,
    pub range: Option<Span>,
}

impl Diagnostic {
    pub fn new(
        phase: Phase,
        severity: Severity,
        code: &str,
        message: impl Into<String>,
        range: Option<Span>,
    ) -> Self {
        Diagnostic {
            code: code.into(),
            phase,
            severity,
            message: message.into(),
            range,
        }
    }

    pub fn parse(code: &str, message: impl Into<String>) -> Self {
        Diagnostic::new(Phase::Parse, Severity::Error, code, message, None)
    }

    pub fn transform(
        severity: Severity,
        code: &str,
        message: impl Into<String>,
        range: Span,
    ) -> Self {
        Diagnostic::new(Phase::Transform, severity, code, message, Some(range))
    }

    pub fn validate(
        severity: Severity,
        code: &str,
        message: impl Into<String>,
        range: Span,
    ) -> Self {
        Diagnostic::new(Phase::Validate, severity, code, message, Some(range))
    }

    pub fn heal(severity: Severity, code: &str, message: impl Into<String>) -> Self {
        Diagnostic::new(Phase::Heal, severity, code, message, None)
    }
}

/// Order-stable diagnostic collection. A second diagnostic with the same
/// message text is dropped.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: IndexMap<String, Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when an identical message was already recorded.
    pub fn push(&mut self, diagnostic: Diagnostic) -> bool {
        if self.entries.contains_key(&diagnostic.message) {
            return false;
        }
        log::debug!(
            code = diagnostic.code.as_str(),
            severity:% = diagnostic.severity;
            "{}",
            diagnostic.message
        );
        self.entries.insert(diagnostic.message.clone(), diagnostic);
        true
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    pub fn has_errors(&self) -> bool {
        self.entries.values().any(|d| d.severity.is_error())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.values()
    }

    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.entries.values().filter(move |d| d.code == code)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries.into_values().collect()
    }
}

impl Serialize for Diagnostics {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_messages_are_suppressed() {
        let mut diagnostics = Diagnostics::new();
        assert!(diagnostics.push(Diagnostic::parse("P001", "bad input")));
        assert!(!diagnostics.push(Diagnostic::parse("P002", "bad input")));
        assert!(diagnostics.push(Diagnostic::heal(Severity::Warning, "H001", "other")));

        let codes: Vec<&str> = diagnostics.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["P001", "H001"]);
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn lsp_severity_mapping() {
        assert_eq!(Severity::Error.lsp_code(), 1);
        assert_eq!(Severity::Warning.lsp_code(), 2);
        assert_eq!(Severity::Information.lsp_code(), 3);
        assert_eq!(Severity::Hint.lsp_code(), 4);
    }

    #[test]
    fn display_includes_phase_and_code() {
        let d = Diagnostic::heal(Severity::Warning, "H001", "synthesized final state");
        assert_eq!(d.to_string(), "[Heal:H001] warning: synthesized final state");
    }
}
