//! Error types for the ECS pod layer.
//!
//! Two families of errors live here:
//!
//! - [`Error`]: the crate-wide error returned by every fallible operation.
//! - [`ValidationErrors`]: the aggregate produced by option validation. It
//!   collects every violation found in one pass instead of stopping at the
//!   first one, and is carried inside [`Error::Validation`].

use std::fmt;

/// Result type alias for ECS pod operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the ECS pod layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Input Errors
    // =========================================================================
    /// One or more option invariants were violated.
    #[error("validation failed:\n{0}")]
    Validation(#[from] ValidationErrors),

    /// Input could not be interpreted (e.g. a malformed manifest).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // =========================================================================
    // Lookup Errors
    // =========================================================================
    /// A resource looked up by identifier does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    // =========================================================================
    // Pod State Errors
    // =========================================================================
    /// Pod is in the wrong state for the requested operation.
    #[error("cannot {operation} pod '{id}' in state '{state}'")]
    InvalidState {
        id: String,
        state: String,
        operation: String,
    },

    // =========================================================================
    // External Errors
    // =========================================================================
    /// The orchestration API client reported a failure.
    #[error("ECS request '{operation}' failed: {reason}")]
    Client { operation: String, reason: String },

    /// The secrets vault reported a failure.
    #[error("secret vault request '{operation}' failed: {reason}")]
    Vault { operation: String, reason: String },

    /// A cache backend reported a failure.
    #[error("cache error: {0}")]
    Cache(String),

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    // =========================================================================
    // Wrapping
    // =========================================================================
    /// An error annotated with the operation that produced it.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Creates a not-found error for the given resource kind.
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Wraps this error with additional context.
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns true if this error, or any error it wraps, is a not-found error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Context { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Returns the validation violations carried by this error, if any.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errs) => Some(errs),
            Self::Context { source, .. } => source.validation_errors(),
            _ => None,
        }
    }
}

/// Extension for attaching context to results.
pub trait ResultExt<T> {
    /// Wraps the error, if any, with `context`.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(context))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A single invariant violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A field is missing or has an illegal value.
    #[error("{0}")]
    Invalid(String),

    /// Two fields that cannot be set together were both set.
    #[error("cannot specify both {first} and {second}")]
    MutuallyExclusive {
        first: &'static str,
        second: &'static str,
    },

    /// A violation found inside a nested entity.
    #[error("{context}: {source}")]
    Nested {
        context: String,
        source: Box<ValidationError>,
    },
}

impl ValidationError {
    /// Returns true if this is (or wraps) a mutual-exclusivity violation.
    pub fn is_mutually_exclusive(&self) -> bool {
        match self {
            Self::MutuallyExclusive { .. } => true,
            Self::Nested { source, .. } => source.is_mutually_exclusive(),
            Self::Invalid(_) => false,
        }
    }
}

/// Accumulates every violation found while validating an options structure.
///
/// Validation never stops at the first problem: each check appends to this
/// aggregate and the caller decides at the end whether anything went wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Creates an empty aggregate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a violation.
    pub fn add(&mut self, err: ValidationError) {
        self.errors.push(err);
    }

    /// Appends an [`ValidationError::Invalid`] violation.
    pub fn invalid(&mut self, msg: impl Into<String>) {
        self.add(ValidationError::Invalid(msg.into()));
    }

    /// Appends an [`ValidationError::Invalid`] violation if `cond` holds.
    pub fn invalid_when(&mut self, cond: bool, msg: impl Into<String>) {
        if cond {
            self.invalid(msg);
        }
    }

    /// Appends a [`ValidationError::MutuallyExclusive`] violation if `cond` holds.
    pub fn exclusive_when(&mut self, cond: bool, first: &'static str, second: &'static str) {
        if cond {
            self.add(ValidationError::MutuallyExclusive { first, second });
        }
    }

    /// Appends every violation of `other`, each labelled with `context`.
    pub fn nest(&mut self, context: impl Into<String>, other: ValidationErrors) {
        if other.is_empty() {
            return;
        }
        let context = context.into();
        self.errors
            .extend(other.errors.into_iter().map(|e| ValidationError::Nested {
                context: context.clone(),
                source: Box::new(e),
            }));
    }

    /// Returns true if no violation was recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true if at least one violation was recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Number of recorded violations.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterates over the recorded violations.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Returns true if any recorded violation is a mutual-exclusivity conflict.
    pub fn has_mutually_exclusive(&self) -> bool {
        self.errors.iter().any(ValidationError::is_mutually_exclusive)
    }

    /// Converts the aggregate into a result: `Ok` when empty.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
