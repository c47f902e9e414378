//! Error types carried by [`Outcome`](crate::Outcome) failures

use std::sync::Arc;

use thiserror::Error;

use crate::recover::PanicError;

/// Default error type for [`Outcome`](crate::Outcome)
///
/// Covers the two origins a failure can have: a declared failure built by
/// calling code (`Message` / `External`) and a panic captured by a chaining
/// operator (`Panicked`).
#[derive(Error, Debug, Clone)]
pub enum OutcomeError {
    /// Declared failure with a plain message
    #[error("{message}")]
    Message {
        /// Failure description
        message: String,
    },

    /// Panic raised by a guarded callback
    #[error(transparent)]
    Panicked(#[from] PanicError),

    /// Any external error
    #[error(transparent)]
    External(Arc<dyn std::error::Error + Send + Sync>),
}

impl OutcomeError {
    /// Create a declared failure from a message
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    /// Wrap an external error
    pub fn external<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::External(Arc::new(error))
    }

    /// Whether this failure came from a captured panic
    #[must_use]
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked(_))
    }

    /// The captured panic, if this failure came from one
    #[must_use]
    pub fn as_panic(&self) -> Option<&PanicError> {
        match self {
            Self::Panicked(panic) => Some(panic),
            _ => None,
        }
    }
}

impl PartialEq for OutcomeError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Message { message: a }, Self::Message { message: b }) => a == b,
            (Self::Panicked(a), Self::Panicked(b)) => a == b,
            (Self::External(a), Self::External(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for OutcomeError {
    fn from(message: &str) -> Self {
        Self::message(message)
    }
}

impl From<String> for OutcomeError {
    fn from(message: String) -> Self {
        Self::message(message)
    }
}

/// Errors raised while configuring the recovery facility
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A process-wide recovery configuration is already in place
    #[error("recovery configuration is already installed")]
    AlreadyInstalled,

    /// Configuration failed validation
    #[error("invalid recovery configuration: {message}")]
    Invalid {
        /// What was wrong
        message: String,
    },
}

impl ConfigError {
    /// Create an invalid config error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn message_from_str_and_string() {
        assert_eq!(OutcomeError::from("no"), OutcomeError::message("no"));
        assert_eq!(
            OutcomeError::from(String::from("no")),
            OutcomeError::message("no")
        );
        assert_eq!(OutcomeError::message("no").to_string(), "no");
    }

    #[test]
    fn external_compares_by_identity() {
        let io = OutcomeError::external(std::io::Error::other("disk gone"));
        let same = io.clone();
        let other = OutcomeError::external(std::io::Error::other("disk gone"));

        assert_eq!(io, same);
        assert_ne!(io, other);
        assert_eq!(io.to_string(), "disk gone");
        assert!(!io.is_panic());
    }

    #[test]
    fn config_error_display() {
        assert_eq!(
            ConfigError::invalid("max_message_len must be greater than 0").to_string(),
            "invalid recovery configuration: max_message_len must be greater than 0"
        );
    }
}
