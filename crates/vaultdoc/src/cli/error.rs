//! Helpful error types for CLI commands
//!
//! Every error carries what went wrong, optional context and `TRY:`
//! suggestions for fixing it.

use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_suggestions(mut self, suggestions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.suggestions.extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    /// Required modules do not import in the target interpreter
    pub fn missing_dependencies(missing: &[String]) -> Self {
        Self::new(format!("Missing dependencies: {}", missing.join(", ")))
            .with_context("Every required module must import before any suite runs")
            .with_suggestions([
                format!("TRY: pip install {}", missing.join(" ")),
                "TRY: pip install -r requirements.txt".to_string(),
                "TRY: Activate the project environment first: source venv/bin/activate".to_string(),
            ])
    }

    /// No usable interpreter
    pub fn python_not_found(details: &str) -> Self {
        Self::new("Python interpreter not found")
            .with_context(details.to_string())
            .with_suggestions([
                "TRY: Pass an interpreter explicitly: vaultdoc --python /path/to/python3 run".to_string(),
                "TRY: Set VAULTDOC_PYTHON to the interpreter path".to_string(),
                "TRY: Check that python3 is on PATH: python3 --version".to_string(),
            ])
    }

    /// Config file unreadable, malformed or out of range
    pub fn invalid_config(path: &Path, details: &str) -> Self {
        Self::new(format!("Invalid configuration: {}", details))
            .with_context(format!(
                "While resolving settings from {} and VAULTDOC_* variables",
                path.display()
            ))
            .with_suggestions([
                format!("TRY: Inspect the file: cat {}", path.display()),
                "TRY: Timeouts are whole seconds greater than zero".to_string(),
                "TRY: Check VAULTDOC_*_TIMEOUT_SECS in your environment".to_string(),
            ])
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}
