//! Error types for the contentmap core library
//!
//! Mapping itself is best-effort: a field that cannot be resolved or coerced is
//! left at its current value. The variants below cover the conditions that are
//! programmer errors (unregistered function references, failing custom
//! functions) or that happen outside the engine (parsing source documents,
//! loading configuration files).

use std::fmt;
use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Main error type for contentmap operations
#[derive(Error, Debug)]
pub enum Error {
    /// A named function referenced by an override is not registered
    #[error("Unresolved {kind} reference '{name}' on field {field}")]
    UnresolvedReference {
        kind: ReferenceKind,
        name: String,
        field: String,
    },

    /// A user supplied custom mapping or value getter failed
    #[error("Custom mapping failed for field {field}: {message}")]
    CustomMapping {
        field: String,
        message: String,
        #[source]
        source: anyhow::Error,
    },

    /// JSON parsing errors for JSON sources and override files
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// XML parsing errors for XML sources
    #[error("XML error: {message}")]
    Xml {
        message: String,
        #[source]
        source: roxmltree::Error,
    },

    /// Configuration errors (mapper configuration and override files)
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of function a named reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceKind {
    /// String formatter applied before assignment
    Formatter,
    /// Custom mapping producing the whole field value
    CustomMapping,
    /// Getter replacing the convention-based property lookup
    ValueGetter,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Formatter => write!(f, "formatter"),
            ReferenceKind::CustomMapping => write!(f, "custom mapping"),
            ReferenceKind::ValueGetter => write!(f, "value getter"),
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<roxmltree::Error> for Error {
    fn from(err: roxmltree::Error) -> Self {
        Error::Xml {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Configuration {
            message: err.to_string(),
            source: Some(err.into()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}
