//! Diagnostic extraction from rolldown errors and warnings.
//!
//! rolldown's diagnostic types change between releases, so they are read
//! through their `Debug` output and reduced to [`ExtractedDiagnostic`], which
//! the rest of the crate can store, compare and print.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Extracted diagnostic information from rolldown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDiagnostic {
    pub kind: DiagnosticKind,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub help: Option<String>,
}

/// Diagnostic kind (mirrors the rolldown event kinds we care about).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MissingExport,
    ParseError,
    CircularDependency,
    UnresolvedEntry,
    UnresolvedImport,
    MissingGlobalName,
    Other,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::MissingExport => "MissingExport",
            DiagnosticKind::ParseError => "ParseError",
            DiagnosticKind::CircularDependency => "CircularDependency",
            DiagnosticKind::UnresolvedEntry => "UnresolvedEntry",
            DiagnosticKind::UnresolvedImport => "UnresolvedImport",
            DiagnosticKind::MissingGlobalName => "MissingGlobalName",
            DiagnosticKind::Other => "Error",
        };
        f.write_str(name)
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// Extract diagnostics from a rolldown error value.
///
/// Batched errors are split into one diagnostic per entry.
pub fn extract_from_rolldown_error(error: &dyn fmt::Debug) -> Vec<ExtractedDiagnostic> {
    let error_str = format!("{error:?}");

    let parts: Vec<&str> = error_str
        .split("BuildDiagnostic")
        .filter(|s| s.chars().any(|c| c.is_alphanumeric()))
        .collect();

    if parts.len() > 1 {
        parts
            .iter()
            .map(|part| extract_single(part, DiagnosticSeverity::Error))
            .collect()
    } else {
        vec![extract_single(&error_str, DiagnosticSeverity::Error)]
    }
}

/// Extract a warning emitted alongside a successful bundle.
pub fn extract_warning(warning: &dyn fmt::Debug) -> ExtractedDiagnostic {
    extract_single(&format!("{warning:?}"), DiagnosticSeverity::Warning)
}

fn extract_single(text: &str, severity: DiagnosticSeverity) -> ExtractedDiagnostic {
    let kind = classify(text);
    let help = extract_help_text(text).or_else(|| default_help(&kind));

    ExtractedDiagnostic {
        message: text.trim().to_string(),
        file: extract_file_path(text),
        line: extract_line_number(text),
        kind,
        severity,
        help,
    }
}

fn classify(text: &str) -> DiagnosticKind {
    if text.contains("MissingExport") {
        DiagnosticKind::MissingExport
    } else if text.contains("MissingNameOptionForIife") || text.contains("MissingGlobalName") {
        DiagnosticKind::MissingGlobalName
    } else if text.contains("UnresolvedEntry") {
        DiagnosticKind::UnresolvedEntry
    } else if text.contains("UnresolvedImport") || text.contains("Could not resolve") {
        DiagnosticKind::UnresolvedImport
    } else if text.contains("CircularDependency") {
        DiagnosticKind::CircularDependency
    } else if text.contains("ParseError") || text.contains("Unexpected token") {
        DiagnosticKind::ParseError
    } else {
        DiagnosticKind::Other
    }
}

fn default_help(kind: &DiagnosticKind) -> Option<String> {
    match kind {
        DiagnosticKind::UnresolvedImport => Some(
            "Install the missing package, or list it under `bundler.external` to leave it unbundled."
                .to_string(),
        ),
        DiagnosticKind::UnresolvedEntry => {
            Some("The component file disappeared while it was being built.".to_string())
        }
        _ => None,
    }
}

/// Extract file path from error message.
fn extract_file_path(text: &str) -> Option<String> {
    for ext in [".js", ".mjs", ".cjs", ".ts", ".jsx", ".tsx"] {
        let Some(pos) = text.find(ext) else {
            continue;
        };
        let before = &text[..pos + ext.len()];
        let start = before
            .rfind(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == '(')
            .map(|i| i + 1)
            .unwrap_or(0);
        let path = before[start..].trim();
        if !path.is_empty() {
            return Some(path.to_string());
        }
    }
    None
}

/// Extract line number from "line 5" or "file.js:5:10" patterns.
fn extract_line_number(text: &str) -> Option<u32> {
    if let Some(pos) = text.find("line ") {
        let digits: String = text[pos + 5..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if let Ok(line) = digits.parse() {
            return Some(line);
        }
    }

    for ext in [".js:", ".mjs:", ".ts:"] {
        if let Some(pos) = text.find(ext) {
            let digits: String = text[pos + ext.len()..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if let Ok(line) = digits.parse() {
                return Some(line);
            }
        }
    }
    None
}

/// Extract help text from error message.
fn extract_help_text(text: &str) -> Option<String> {
    for indicator in ["help: ", "Help: ", "hint: ", "Hint: "] {
        if let Some(pos) = text.find(indicator) {
            let help = text[pos + indicator.len()..]
                .lines()
                .next()
                .unwrap_or("")
                .trim()
                .trim_end_matches('"');
            if !help.is_empty() {
                return Some(help.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_unresolved_imports() {
        let diags = extract_from_rolldown_error(&"UnresolvedImport: Could not resolve 'lit' in components/widget.js");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::UnresolvedImport);
        assert_eq!(diags[0].file.as_deref(), Some("components/widget.js"));
        assert!(diags[0].help.as_deref().unwrap().contains("bundler.external"));
    }

    #[test]
    fn splits_batched_diagnostics() {
        let text = "[BuildDiagnostic { kind: ParseError, file: a.js }, BuildDiagnostic { kind: MissingExport }]";
        let diags = extract_from_rolldown_error(&text);
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].kind, DiagnosticKind::ParseError);
        assert_eq!(diags[1].kind, DiagnosticKind::MissingExport);
    }

    #[test]
    fn extracts_line_numbers() {
        assert_eq!(extract_line_number("at widget.js:12:4"), Some(12));
        assert_eq!(extract_line_number("error on line 7"), Some(7));
        assert_eq!(extract_line_number("no position"), None);
    }

    #[test]
    fn warnings_keep_their_severity() {
        let diag = extract_warning(&"CircularDependency a.js -> b.js -> a.js");
        assert_eq!(diag.severity, DiagnosticSeverity::Warning);
        assert_eq!(diag.kind, DiagnosticKind::CircularDependency);
    }
}
