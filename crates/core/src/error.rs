use std::io;
use std::path::PathBuf;

use crate::sink::MessageLevel;

/// Errors that can occur during enhancer-runner operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A single metadata file could not be parsed. Scanning continues without it.
    #[error("Malformed metadata file {}: {reason}", path.display())]
    Discovery { path: PathBuf, reason: String },

    /// The host could not answer one annotation query. Scanning continues without it.
    #[error("Type search for @{annotation} failed in module {module}: {reason}")]
    TypeSearch {
        module: String,
        annotation: String,
        reason: String,
    },

    /// The module's isolation boundary does not contain the enhancer.
    #[error("enhancer not found in classpath for module: {module} (missing {type_name})")]
    ClasspathMissing { module: String, type_name: String },

    /// The enhancer is present but an expected member is absent or has the wrong shape.
    #[error("enhancer method not found for module: {module} ({member}: {reason})")]
    IntegrationMismatch {
        module: String,
        member: String,
        reason: String,
    },

    /// The enhancer ran and failed.
    #[error("enhancer failed in module {module}: {detail}")]
    EnhancerInvocation {
        module: String,
        detail: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Build manifest error: {0}")]
    ManifestError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn invocation(module: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::EnhancerInvocation {
            module: module.into(),
            detail: detail.into(),
            source: None,
        }
    }

    /// Severity a per-module failure is reported with.
    pub fn classification(&self) -> MessageLevel {
        match self {
            Error::ClasspathMissing { .. } | Error::TypeSearch { .. } => MessageLevel::Warning,
            _ => MessageLevel::Error,
        }
    }

    /// Whether the failure belongs to the known taxonomy. Anything else gets its full
    /// cause chain written to the message sink.
    pub fn is_classified(&self) -> bool {
        matches!(
            self,
            Error::Discovery { .. }
                | Error::TypeSearch { .. }
                | Error::ClasspathMissing { .. }
                | Error::IntegrationMismatch { .. }
                | Error::EnhancerInvocation { .. }
        )
    }

    /// The error followed by every `source()` in its chain, one per line.
    pub fn diagnostic(&self) -> String {
        let mut out = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(inner) = cause {
            out.push_str("\ncaused by: ");
            out.push_str(&inner.to_string());
            cause = inner.source();
        }
        out
    }
}

/// Result type alias for enhancer-runner operations
pub type Result<T> = std::result::Result<T, Error>;
