//! Runtime error types for the interpreter
//!
//! This module defines [`RuntimeError`], which represents all errors that can occur
//! during program execution (as opposed to parse errors).
//!
//! All runtime errors are fatal to the run, but never to the caller:
//! [`Interpreter::execute`](super::Interpreter::execute) catches them and records
//! a terminal `error` step carrying the message.

use crate::parser::ast::SourceLocation;
use thiserror::Error;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// The trace reached its step ceiling
    #[error("Maximum step limit ({limit}) exceeded")]
    StepLimitExceeded { limit: usize },

    #[error("Maximum call stack size exceeded")]
    CallDepthExceeded {
        limit: usize,
        location: SourceLocation,
    },

    /// A single loop ran past its iteration ceiling
    #[error("Maximum loop iterations exceeded")]
    LoopLimitExceeded {
        limit: usize,
        location: SourceLocation,
    },

    /// A script asked for an array longer than the configured ceiling
    #[error("Maximum array length ({limit}) exceeded")]
    ArrayLengthExceeded {
        limit: usize,
        location: SourceLocation,
    },

    #[error("Maximum string length ({limit}) exceeded")]
    StringLengthExceeded {
        limit: usize,
        location: SourceLocation,
    },

    #[error("{callee} is not a function")]
    NotAFunction {
        callee: String,
        location: SourceLocation,
    },

    #[error("{callee} is not a constructor")]
    NotAConstructor {
        callee: String,
        location: SourceLocation,
    },

    #[error("{value} is not iterable")]
    NotIterable {
        value: String,
        location: SourceLocation,
    },

    /// Reading or writing a property of `null` / `undefined`
    #[error("Cannot read properties of {value} (reading '{property}')")]
    PropertyOfNullish {
        value: String,
        property: String,
        location: SourceLocation,
    },

    #[error("Invalid assignment target")]
    InvalidAssignmentTarget { location: SourceLocation },

    #[error("Assignment to constant variable '{name}'")]
    ConstAssignment {
        name: String,
        location: SourceLocation,
    },

    /// An array method that needs a callback got something else
    #[error("{method} requires a callback function")]
    CallbackRequired {
        method: String,
        location: SourceLocation,
    },

    #[error("Reduce of empty array with no initial value")]
    EmptyReduce { location: SourceLocation },

    /// A `throw` statement; the value is already formatted
    #[error("Uncaught {value}")]
    Thrown {
        value: String,
        location: SourceLocation,
    },
}

impl RuntimeError {
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            RuntimeError::StepLimitExceeded { .. } => None,
            RuntimeError::CallDepthExceeded { location, .. }
            | RuntimeError::LoopLimitExceeded { location, .. }
            | RuntimeError::ArrayLengthExceeded { location, .. }
            | RuntimeError::StringLengthExceeded { location, .. }
            | RuntimeError::NotAFunction { location, .. }
            | RuntimeError::NotAConstructor { location, .. }
            | RuntimeError::NotIterable { location, .. }
            | RuntimeError::PropertyOfNullish { location, .. }
            | RuntimeError::InvalidAssignmentTarget { location }
            | RuntimeError::ConstAssignment { location, .. }
            | RuntimeError::CallbackRequired { location, .. }
            | RuntimeError::EmptyReduce { location }
            | RuntimeError::Thrown { location, .. } => Some(location),
        }
    }

    /// Whether the error comes from a resource ceiling rather than the program
    pub fn is_limit(&self) -> bool {
        matches!(
            self,
            RuntimeError::StepLimitExceeded { .. }
                | RuntimeError::CallDepthExceeded { .. }
                | RuntimeError::LoopLimitExceeded { .. }
                | RuntimeError::ArrayLengthExceeded { .. }
                | RuntimeError::StringLengthExceeded { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let loc = SourceLocation::new(3, 4, 10, 12);
        assert_eq!(
            RuntimeError::StepLimitExceeded { limit: 10 }.to_string(),
            "Maximum step limit (10) exceeded"
        );
        assert_eq!(
            RuntimeError::NotAFunction {
                callee: "foo".to_string(),
                location: loc
            }
            .to_string(),
            "foo is not a function"
        );
        assert_eq!(
            RuntimeError::PropertyOfNullish {
                value: "undefined".to_string(),
                property: "x".to_string(),
                location: loc
            }
            .to_string(),
            "Cannot read properties of undefined (reading 'x')"
        );
    }

    #[test]
    fn test_location_and_limit_classification() {
        let loc = SourceLocation::new(2, 0, 5, 9);
        let err = RuntimeError::LoopLimitExceeded {
            limit: 1000,
            location: loc,
        };
        assert_eq!(err.location(), Some(&loc));
        assert!(err.is_limit());
        assert!(RuntimeError::StepLimitExceeded { limit: 1 }.location().is_none());
        assert!(!RuntimeError::EmptyReduce { location: loc }.is_limit());
    }
}
