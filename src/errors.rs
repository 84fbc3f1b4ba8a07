//! Pipeline error taxonomy, mapped one-to-one onto HTTP status codes by the
//! server layer.

use core::fmt;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum PipelineError {
    /// Malformed or out-of-bound input; carries every violated rule so the
    /// caller can fix all of them at once.
    Validation(Vec<String>),
    /// Duplicate (employee_id, interval_start) submission.
    Conflict(String),
    /// No interval/score exists for the requested scope.
    NotFound(String),
    /// Storage or unexpected computation failure. The message is logged but
    /// callers only see a generic body.
    Internal(String),
}

impl PipelineError {
    pub fn internal(e: impl Display) -> Self {
        PipelineError::Internal(e.to_string())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            PipelineError::Validation(_) => 400,
            PipelineError::Conflict(_) => 409,
            PipelineError::NotFound(_) => 404,
            PipelineError::Internal(_) => 500,
        }
    }
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Validation(violations) => {
                write!(f, "validation failed: {}", violations.join("; "))
            }
            PipelineError::Conflict(s) => write!(f, "conflict: {}", s),
            PipelineError::NotFound(s) => write!(f, "not found: {}", s),
            PipelineError::Internal(s) => write!(f, "internal error: {}", s),
        }
    }
}

impl Error for PipelineError {}

impl From<diesel::result::Error> for PipelineError {
    fn from(value: diesel::result::Error) -> Self {
        PipelineError::Internal(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(PipelineError::Validation(vec![]).status_code(), 400);
        assert_eq!(PipelineError::Conflict("dup".into()).status_code(), 409);
        assert_eq!(PipelineError::NotFound("none".into()).status_code(), 404);
        assert_eq!(PipelineError::Internal("db".into()).status_code(), 500);
    }

    #[test]
    fn validation_display_lists_every_violation() {
        let err = PipelineError::Validation(vec!["typing must be >= 0".into(), "sum exceeds window".into()]);
        let text = err.to_string();
        assert!(text.contains("typing must be >= 0"));
        assert!(text.contains("sum exceeds window"));
    }
}
