//! Grid query errors and their baseline mapping to [`Problem`].

use http::StatusCode;
use thiserror::Error;

use crate::problem::Problem;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid filter model: {0}")]
    InvalidFilter(String),

    #[error("invalid sort model: {0}")]
    InvalidSort(String),

    #[error("invalid row range: {0}")]
    InvalidRange(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("type mismatch for field {field}: expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: String,
        got: String,
    },

    #[error("database error: {0}")]
    Db(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Stable machine-readable code used in problem responses.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidFilter(_) | Error::TypeMismatch { .. } => "grid.invalid_filter",
            Error::InvalidSort(_) => "grid.invalid_sort",
            Error::InvalidRange(_) => "grid.invalid_range",
            Error::UnknownField(_) => "grid.unknown_field",
            Error::Db(_) => "grid.internal",
        }
    }
}

impl From<Error> for Problem {
    fn from(err: Error) -> Self {
        let code = err.code();
        let problem = match &err {
            Error::InvalidFilter(_) | Error::TypeMismatch { .. } => Problem::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid Filter",
                err.to_string(),
            ),
            Error::InvalidSort(_) => {
                Problem::new(StatusCode::UNPROCESSABLE_ENTITY, "Invalid Sort", err.to_string())
            }
            Error::InvalidRange(_) => Problem::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid Row Range",
                err.to_string(),
            ),
            Error::UnknownField(_) => Problem::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Unknown Field",
                err.to_string(),
            ),
            // Never leak driver messages to clients.
            Error::Db(_) => Problem::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "An internal error occurred while processing the grid query",
            ),
        };
        problem.with_code(code)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn filter_error_is_422() {
        let problem: Problem = Error::InvalidFilter("expected value at line 1".to_owned()).into();
        assert_eq!(problem.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(problem.title, "Invalid Filter");
        assert_eq!(problem.code, "grid.invalid_filter");
        assert!(problem.detail.contains("line 1"));
    }

    #[test]
    fn type_mismatch_reports_as_filter_error() {
        let err = Error::TypeMismatch {
            field: "age".to_owned(),
            expected: "I64".to_owned(),
            got: "string".to_owned(),
        };
        let problem: Problem = err.into();
        assert_eq!(problem.code, "grid.invalid_filter");
        assert!(problem.detail.contains("age"));
    }

    #[test]
    fn db_error_hides_details() {
        let problem: Problem = Error::Db("no such table: users".to_owned()).into();
        assert_eq!(problem.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!problem.detail.contains("users"));
        assert_eq!(problem.code, "grid.internal");
    }
}
