//! Unified error type for every failure mode a test can settle with.
//!
//! Assertion mismatches, timeouts, continuation errors, and uncaught
//! failures (returned or panicked) all collapse into one enum so the
//! execution protocol can treat them uniformly: any [`HarnessError`] becomes
//! a failed outcome, and no variant changes the orchestrator's control flow.

use std::any::Any;
use std::time::Duration;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error, Diagnostic, Serialize)]
pub enum HarnessError {
    /// An `expect` mismatch raised by a test body. Carries the rendered
    /// operands so the reporter can show the difference.
    #[error("{message}")]
    #[diagnostic(code(attest::assertion))]
    Assertion {
        message: String,
        expected: String,
        actual: String,
    },

    /// A future-shaped test outlived the suite's bound.
    #[error("Test exceeded {seconds} seconds")]
    #[diagnostic(code(attest::timeout))]
    Timeout { seconds: f64 },

    /// The error handed to a continuation's completion callback, or a
    /// completion handle dropped without ever settling.
    #[error("{message}")]
    #[diagnostic(code(attest::continuation))]
    Continuation { message: String },

    /// Any other failure a test body surfaces by returning `Err`.
    #[error("{message}")]
    #[diagnostic(code(attest::failure))]
    Failure { message: String },

    /// A panic unwound out of a test body.
    #[error("test panicked: {message}")]
    #[diagnostic(code(attest::panic))]
    Panicked { message: String },
}

impl HarnessError {
    /// A generic test failure with the given message.
    pub fn failure(message: impl Into<String>) -> Self {
        HarnessError::Failure {
            message: message.into(),
        }
    }

    /// A continuation-style failure with the given message.
    pub fn continuation(message: impl Into<String>) -> Self {
        HarnessError::Continuation {
            message: message.into(),
        }
    }

    pub(crate) fn timeout(limit: Duration) -> Self {
        HarnessError::Timeout {
            seconds: limit.as_secs_f64(),
        }
    }

    pub(crate) fn panicked(payload: Box<dyn Any + Send>) -> Self {
        HarnessError::Panicked {
            message: panic_message(payload.as_ref()),
        }
    }
}

/// Renders a panic payload the way the standard test harness would: string
/// payloads verbatim, anything else opaquely.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
