//! Argument validation errors.

use std::fmt;

/// One failing argument field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Argument name (e.g., "date"); empty when the issue concerns the whole object.
    pub field: String,
    /// What is wrong with it.
    pub reason: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, "required field is missing")
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "{}: {}", self.field, self.reason)
        }
    }
}

/// Arguments of a tool call do not satisfy the tool's declared parameters.
///
/// Surfaced to the model session as a failed result, never raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid arguments for '{tool}': {}", format_issues(.issues))]
pub struct ValidationError {
    pub tool: String,
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn new(tool: impl Into<String>, mut issues: Vec<FieldIssue>) -> Self {
        issues.sort_by(|a, b| a.field.cmp(&b.field));
        Self {
            tool: tool.into(),
            issues,
        }
    }

    /// Issue list without the tool prefix, suitable for the model.
    pub fn detail(&self) -> String {
        format_issues(&self.issues)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.issues.iter().map(|i| i.field.as_str())
    }
}

fn format_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
