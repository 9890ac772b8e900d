//! Error types for the OAI-PMH responder.
//!
//! Recoverable protocol errors are rendered as OAI error documents by the
//! dispatcher; configuration errors abort the request.

use thiserror::Error;

/// Main error type for the responder library.
#[derive(Debug, Error)]
pub enum OaiError {
    /// The requested verb is missing or not one of the supported verbs.
    #[error("Unsupported OAI verb: '{0}'")]
    UnsupportedVerb(String),

    /// A required operational setting is absent.
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    /// An operational setting is present but has an unusable value.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The resumption token could not be decoded.
    #[error("Malformed resumption token: {0}")]
    MalformedToken(String),

    /// The resumption token decoded but does not match the request context.
    #[error("Invalid resumption token: {0}")]
    InvalidToken(String),

    /// A timestamp matches neither supported granularity.
    #[error("Invalid date format: '{0}'. Expected YYYY-MM-DD or YYYY-MM-DDThh:mm:ssZ")]
    InvalidInputFormat(String),

    /// A request argument has an illegal value.
    #[error("Bad argument: {0}")]
    BadArgument(String),

    /// JSON serialization of a token payload failed.
    #[error("JSON serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OaiError {
    /// OAI-PMH error code for errors that are reported inside an error document.
    ///
    /// Returns `None` for errors that must abort the request instead.
    #[must_use]
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedVerb(_) => Some("badVerb"),
            Self::MalformedToken(_) | Self::InvalidToken(_) => Some("badResumptionToken"),
            Self::InvalidInputFormat(_) | Self::BadArgument(_) => Some("badArgument"),
            Self::MissingConfiguration(_)
            | Self::InvalidConfiguration(_)
            | Self::Serialization(_)
            | Self::Io(_) => None,
        }
    }

    /// Whether the error document still echoes the request's verb and arguments.
    ///
    /// OAI-PMH drops them only when the verb or an argument was not understood.
    #[must_use]
    pub fn echoes_request(&self) -> bool {
        !matches!(
            self.error_code(),
            None | Some("badVerb") | Some("badArgument")
        )
    }
}

/// Result type alias for responder operations.
pub type Result<T> = std::result::Result<T, OaiError>;
