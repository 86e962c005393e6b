//! Core data model shared by the checkers, the suites and the orchestrator.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// What part of the SDK surface a fact talks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FactKind {
    /// Client construction with a documented option set
    ConstructorOption,
    /// A documented method is present and invocable
    MethodPresence,
    /// A documented exception name resolves to an error subtype
    ExceptionType,
    /// A documented argument structure can be issued against a method
    ParameterShape,
}

impl FactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FactKind::ConstructorOption => "constructor-option",
            FactKind::MethodPresence => "method-presence",
            FactKind::ExceptionType => "exception-type",
            FactKind::ParameterShape => "parameter-shape",
        }
    }
}

impl fmt::Display for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A documented argument structure: positional values followed by named values.
///
/// Named values keep the documented spelling (`allowedNetworks`, `per_page`, ...),
/// the SDK decides whether that spelling binds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CallShape {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub kwargs: Map<String, Value>,
}

impl CallShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Add a named argument
    pub fn kwarg(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.to_string(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }

    pub fn keyword_names(&self) -> impl Iterator<Item = &str> {
        self.kwargs.keys().map(String::as_str)
    }

    /// Render like a call site, e.g. `get_vault(network='mainnet', ...)`
    pub fn render(&self, method: &str) -> String {
        let mut parts: Vec<String> = self.args.iter().map(render_value).collect();
        parts.extend(
            self.kwargs
                .iter()
                .map(|(name, value)| format!("{}={}", name, render_value(value))),
        );
        format!("{}({})", method, parts.join(", "))
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => "None".to_string(),
        Value::Array(items) => format!(
            "[{}]",
            items.iter().map(render_value).collect::<Vec<_>>().join(", ")
        ),
        other => other.to_string(),
    }
}

/// The predicate a fact asserts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "predicate", rename_all = "kebab-case")]
pub enum Expectation {
    /// Construction with these options succeeds and yields an instance
    Constructs { options: CallShape },
    /// Construction with these options raises
    Rejects { options: CallShape },
    /// The named member exists on the client and is callable
    Callable,
    /// The named type is a subclass of `base`
    SubtypeOf { module: String, base: String },
    /// The method accepts this argument structure
    Binds { shape: CallShape },
}

/// A single documented expectation about the SDK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractFact {
    pub kind: FactKind,
    /// Method, option set or exception name the fact is about
    pub subject: String,
    pub expected: Expectation,
    /// Short label shown in reports
    pub label: String,
}

impl ContractFact {
    pub fn constructs(label: &str, options: CallShape) -> Self {
        Self {
            kind: FactKind::ConstructorOption,
            subject: label.to_string(),
            expected: Expectation::Constructs { options },
            label: format!("construct client ({})", label),
        }
    }

    pub fn rejects(label: &str, options: CallShape) -> Self {
        Self {
            kind: FactKind::ConstructorOption,
            subject: label.to_string(),
            expected: Expectation::Rejects { options },
            label: format!("reject client ({})", label),
        }
    }

    pub fn callable(method: &str) -> Self {
        Self {
            kind: FactKind::MethodPresence,
            subject: method.to_string(),
            expected: Expectation::Callable,
            label: format!("method {} is callable", method),
        }
    }

    pub fn subtype_of(name: &str, module: &str, base: &str) -> Self {
        Self {
            kind: FactKind::ExceptionType,
            subject: name.to_string(),
            expected: Expectation::SubtypeOf {
                module: module.to_string(),
                base: base.to_string(),
            },
            label: format!("{}.{} subclasses {}", module, name, base),
        }
    }

    pub fn binds(method: &str, variant: &str, shape: CallShape) -> Self {
        Self {
            kind: FactKind::ParameterShape,
            subject: method.to_string(),
            label: format!("{} [{}]", shape.render(method), variant),
            expected: Expectation::Binds { shape },
        }
    }
}

/// Result classification for one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Passed,
    Failed,
    /// Precondition unmet; neither pass nor fail
    Skipped,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Passed => "PASS",
            OutcomeStatus::Failed => "FAIL",
            OutcomeStatus::Skipped => "SKIP",
        }
    }
}

/// Result of evaluating one fact or workflow step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub name: String,
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl TestOutcome {
    pub fn passed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: OutcomeStatus::Passed,
            detail: None,
        }
    }

    pub fn failed(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: OutcomeStatus::Failed,
            detail: Some(detail.into()),
        }
    }

    pub fn skipped(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: OutcomeStatus::Skipped,
            detail: Some(reason.into()),
        }
    }

    /// Build from a boolean verdict.
    pub fn from_check(name: impl Into<String>, holds: bool, detail: impl Into<String>) -> Self {
        if holds {
            Self::passed(name)
        } else {
            Self::failed(name, detail)
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn is_passed(&self) -> bool {
        self.status == OutcomeStatus::Passed
    }

    pub fn is_failed(&self) -> bool {
        self.status == OutcomeStatus::Failed
    }

    pub fn is_skipped(&self) -> bool {
        self.status == OutcomeStatus::Skipped
    }
}

/// Aggregate of the outcomes of one suite. Skipped outcomes are excluded
/// from `total_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteResult {
    pub file: String,
    pub passed_count: usize,
    pub total_count: usize,
    pub skipped_count: usize,
    pub outcomes: Vec<TestOutcome>,
}

impl SuiteResult {
    pub fn from_outcomes(file: impl Into<String>, outcomes: Vec<TestOutcome>) -> Self {
        let passed_count = outcomes.iter().filter(|o| o.is_passed()).count();
        let skipped_count = outcomes.iter().filter(|o| o.is_skipped()).count();
        Self {
            file: file.into(),
            passed_count,
            total_count: outcomes.len() - skipped_count,
            skipped_count,
            outcomes,
        }
    }

    pub fn failed_count(&self) -> usize {
        self.total_count - self.passed_count
    }

    pub fn is_success(&self) -> bool {
        self.passed_count == self.total_count
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }
}
