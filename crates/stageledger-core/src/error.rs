//! Error types for stageledger-core
//!
//! The cost/allocation engine itself never fails. Errors only come from the
//! layer around it: reading config and ledger files, validating records,
//! running aggregation on the blocking pool.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for stageledger operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // IO Errors
    // ===================
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    // ===================
    // Parse Errors
    // ===================
    #[error("Failed to parse JSON in {path}: {message}")]
    JsonParse {
        path: PathBuf,
        message: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse TOML in {path}: {message}")]
    TomlParse {
        path: PathBuf,
        message: String,
        #[source]
        source: toml::de::Error,
    },

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // ===================
    // Record Errors
    // ===================
    #[error("Invalid event {event_id}: {reason}")]
    InvalidEvent { event_id: u64, reason: String },

    #[error("Duplicate event id: {event_id}")]
    DuplicateEvent { event_id: u64 },

    #[error("Event {event_id} references unknown association {association_id}")]
    UnknownAssociation { event_id: u64, association_id: u64 },

    #[error("Association not found: {association_id}")]
    AssociationNotFound { association_id: u64 },

    // ===================
    // Runtime
    // ===================
    #[error("Aggregation task failed: {message}")]
    TaskFailed { message: String },
}

/// Severity level for errors during load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Record kept or repaired, worth telling the user
    Warning,
    /// Record skipped
    Error,
    /// Nothing usable was loaded
    Fatal,
}

/// Individual error entry in load report
#[derive(Debug, Clone)]
pub struct LoadError {
    pub source: String,
    pub message: String,
    pub severity: ErrorSeverity,
    /// Actionable suggestion for user (optional)
    pub suggestion: Option<String>,
}

impl LoadError {
    pub fn warning(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity: ErrorSeverity::Warning,
            suggestion: None,
        }
    }

    pub fn error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity: ErrorSeverity::Error,
            suggestion: None,
        }
    }

    pub fn fatal(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity: ErrorSeverity::Fatal,
            suggestion: None,
        }
    }

    /// Add an actionable suggestion to this error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Create user-friendly error from CoreError with context-aware suggestions
    pub fn from_core_error(source: impl Into<String>, error: &CoreError) -> Self {
        let source = source.into();
        let suggestion = match error {
            CoreError::FileNotFound { path } => {
                Some(format!("Check the ledger path: ls {}", path.display()))
            }
            CoreError::JsonParse { .. } => {
                Some("Validate JSON syntax with: jq . <file>".to_string())
            }
            CoreError::InvalidEvent { .. } => {
                Some("Stage size must be a finite, non-negative number of square meters".to_string())
            }
            CoreError::UnknownAssociation { association_id, .. } => Some(format!(
                "Add association {} to the ledger's associations list",
                association_id
            )),
            _ => None,
        };

        Self {
            source,
            message: error.to_string(),
            severity: ErrorSeverity::Error,
            suggestion,
        }
    }
}

/// Report of problems encountered while loading a ledger
///
/// Invalid records are skipped and recorded here instead of failing the
/// whole load.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub errors: Vec<LoadError>,
    pub associations_loaded: usize,
    pub events_loaded: usize,
    pub events_skipped: usize,
    pub assignments_skipped: usize,
}

impl LoadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: LoadError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.errors.push(LoadError::warning(source, message));
    }

    pub fn add_fatal(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.errors.push(LoadError::fatal(source, message));
    }

    /// Returns true if there are any fatal errors
    pub fn has_fatal_errors(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.severity == ErrorSeverity::Fatal)
    }

    /// Returns true if there are any errors (including warnings)
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns only warnings
    pub fn warnings(&self) -> impl Iterator<Item = &LoadError> {
        self.errors
            .iter()
            .filter(|e| e.severity == ErrorSeverity::Warning)
    }

    /// Returns count by severity
    pub fn error_count(&self) -> (usize, usize, usize) {
        let count = |severity: ErrorSeverity| {
            self.errors
                .iter()
                .filter(|e| e.severity == severity)
                .count()
        };
        (
            count(ErrorSeverity::Warning),
            count(ErrorSeverity::Error),
            count(ErrorSeverity::Fatal),
        )
    }
}
