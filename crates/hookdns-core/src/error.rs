//! Error types for hookdns
//!
//! This module defines all error types used throughout the crate.
//!
//! Variants are grouped by where they can occur relative to the change batch
//! submission. See [`Error::is_retryable`].

use thiserror::Error;

/// Result type alias for hookdns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for hookdns
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed notification payload (any JSON layer)
    #[error("Decode error: {0}")]
    Decode(String),

    /// The instance directory returned no matching instance
    #[error("Instance not found: {0}")]
    InstanceNotFound(String),

    /// Transport failure while looking up an instance
    #[error("Instance lookup error: {0}")]
    Lookup(String),

    /// No published record set matches the requested name and type
    #[error("Resource record set {name} {record_type} not found")]
    RecordNotFound {
        /// Requested record name
        name: String,
        /// Requested record type
        record_type: String,
    },

    /// Transport failure while listing record sets
    #[error("Record query error: {0}")]
    Query(String),

    /// A template string is not well-formed
    #[error("Template syntax error in {template:?}: {message}")]
    TemplateSyntax {
        /// The offending template source
        template: String,
        /// What is wrong with it
        message: String,
    },

    /// A well-formed template failed while being evaluated
    #[error("Template evaluation error: {0}")]
    TemplateEval(String),

    /// The DNS service rejected the change batch
    #[error("Change batch submission failed: {0}")]
    Submit(String),

    /// The change was accepted but never reported INSYNC
    #[error("Change {change_id} did not reach INSYNC after {attempts} status checks")]
    PropagationTimeout {
        /// Change identifier returned on submission
        change_id: String,
        /// Number of status polls performed
        attempts: u32,
    },

    /// The lifecycle controller did not accept the outcome signal
    #[error("Lifecycle action completion failed: {0}")]
    Report(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create an instance-not-found error
    pub fn instance_not_found(instance_id: impl Into<String>) -> Self {
        Self::InstanceNotFound(instance_id.into())
    }

    /// Create an instance lookup error
    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    /// Create a record-not-found error
    pub fn record_not_found(name: impl Into<String>, record_type: impl Into<String>) -> Self {
        Self::RecordNotFound {
            name: name.into(),
            record_type: record_type.into(),
        }
    }

    /// Create a record query error
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Create a template syntax error
    pub fn template_syntax(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TemplateSyntax {
            template: template.into(),
            message: message.into(),
        }
    }

    /// Create a template evaluation error
    pub fn template_eval(msg: impl Into<String>) -> Self {
        Self::TemplateEval(msg.into())
    }

    /// Create a submission error
    pub fn submit(msg: impl Into<String>) -> Self {
        Self::Submit(msg.into())
    }

    /// Create a lifecycle completion error
    pub fn report(msg: impl Into<String>) -> Self {
        Self::Report(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the transport may safely redeliver the notification.
    ///
    /// Everything that can fail before the change batch is submitted is
    /// retryable: nothing external has happened yet. Submission, propagation
    /// and completion failures are not, since redelivery could re-apply a
    /// mutation or re-report an already completed lifecycle action.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Decode(_)
            | Error::InstanceNotFound(_)
            | Error::Lookup(_)
            | Error::RecordNotFound { .. }
            | Error::Query(_)
            | Error::TemplateSyntax { .. }
            | Error::TemplateEval(_)
            | Error::Json(_) => true,
            Error::Submit(_)
            | Error::PropagationTimeout { .. }
            | Error::Report(_)
            | Error::Config(_)
            | Error::Other(_) => false,
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
