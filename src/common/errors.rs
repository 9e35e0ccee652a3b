//! Error types for the application

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using our PlanError
pub type Result<T> = std::result::Result<T, PlanError>;

/// Upstream dependency an error is attributed to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Generative text service
    Analysis,
    /// A named market-data provider
    Provider(String),
    /// Cache / in-flight registry machinery
    Registry,
}

impl Source {
    /// Shorthand for a named provider
    pub fn provider(name: impl Into<String>) -> Self {
        Source::Provider(name.into())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Analysis => write!(f, "analysis"),
            Source::Provider(name) => write!(f, "provider:{}", name),
            Source::Registry => write!(f, "in-flight registry"),
        }
    }
}

/// Identity of one orchestrated sub-task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Analysis,
    Market,
    Financials,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Analysis => write!(f, "analysis"),
            TaskKind::Market => write!(f, "market"),
            TaskKind::Financials => write!(f, "financials"),
        }
    }
}

/// A single violated field in a validated document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Dotted path of the offending field, e.g. `financialInputs.price`
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// One failed sub-task of an orchestration, with its own error
#[derive(Debug, Clone)]
pub struct TaskFailure {
    pub task: TaskKind,
    pub error: PlanError,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.task, self.error)
    }
}

/// Main error type for plan operations
///
/// `Clone` so that a single in-flight outcome can be handed to every waiter.
#[derive(Error, Debug, Clone)]
pub enum PlanError {
    /// Malformed caller input, every violation listed
    #[error("{message}: {}", join(.violations))]
    Validation {
        message: String,
        violations: Vec<Violation>,
    },

    /// A named upstream dependency failed after its own retry policy
    #[error("{origin} failed: {message}")]
    Source { origin: Source, message: String },

    /// Upstream call succeeded but the payload broke the expected shape
    #[error("{origin} returned an invalid payload: {}", join(.violations))]
    Contract {
        origin: Source,
        violations: Vec<Violation>,
    },

    /// One or more orchestrated tasks failed
    #[error("plan orchestration failed: {}", join(.0))]
    TasksFailed(Vec<TaskFailure>),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlanError {
    /// Validation failure with a single violation
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        PlanError::Validation {
            message: "invalid input".to_string(),
            violations: vec![Violation::new(field, message)],
        }
    }

    /// Source failure attributed to `origin`
    pub fn upstream(origin: Source, message: impl Into<String>) -> Self {
        PlanError::Source {
            origin,
            message: message.into(),
        }
    }

    /// Violations carried by validation or contract failures
    pub fn violations(&self) -> &[Violation] {
        match self {
            PlanError::Validation { violations, .. } | PlanError::Contract { violations, .. } => {
                violations
            }
            _ => &[],
        }
    }

    /// Tasks named by an aggregated orchestration failure
    pub fn failed_tasks(&self) -> Vec<TaskKind> {
        match self {
            PlanError::TasksFailed(failures) => failures.iter().map(|f| f.task).collect(),
            _ => Vec::new(),
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<serde_json::Error> for PlanError {
    fn from(err: serde_json::Error) -> Self {
        PlanError::Internal(format!("JSON error: {}", err))
    }
}
