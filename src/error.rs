//! Mapping of service errors onto client-facing categories.
//!
//! Every service error implements [`Categorize`], which picks one of five
//! [`ErrorCategory`] values. A request handler turns that into an HTTP status
//! and an [`ErrorBody`]. Only `internal` errors reach the error log.

use crate::task::{
    domain::PermissionError,
    ports::TaskRepositoryError,
    services::{TaskCommentError, TaskLifecycleError},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Client-facing error class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// No authenticated caller.
    Unauthorized,
    /// Caller lacks the rights for the operation.
    Forbidden,
    /// A referenced record does not exist.
    NotFound,
    /// The request was malformed or broke a business rule.
    Validation,
    /// Infrastructure failure.
    Internal,
}

impl ErrorCategory {
    /// Returns the HTTP status code for the category.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Validation => 400,
            Self::Internal => 500,
        }
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that know their client-facing category.
pub trait Categorize: std::error::Error {
    /// Returns the category of this error.
    fn category(&self) -> ErrorCategory;
}

/// JSON body returned to clients for a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// HTTP status code.
    pub status: u16,
    /// Error category.
    pub category: ErrorCategory,
    /// Human-readable message. Internal errors carry a generic message.
    pub error: String,
}

impl ErrorBody {
    /// Builds the body for a categorised error.
    #[must_use]
    pub fn from_error<E: Categorize + ?Sized>(err: &E) -> Self {
        let category = err.category();
        let error = match category {
            ErrorCategory::Internal => "internal server error".to_owned(),
            _ => err.to_string(),
        };
        Self {
            status: category.http_status(),
            category,
            error,
        }
    }
}

impl Categorize for PermissionError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Unauthenticated => ErrorCategory::Unauthorized,
            Self::Forbidden { .. } => ErrorCategory::Forbidden,
        }
    }
}

impl Categorize for TaskRepositoryError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::DuplicateDefectOrigin { .. } => ErrorCategory::Validation,
            Self::DuplicateTask(_) | Self::Persistence(_) => ErrorCategory::Internal,
        }
    }
}

impl Categorize for TaskLifecycleError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Permission(err) => err.category(),
            Self::InvalidStatus(_) | Self::CategoryNotFound(_) | Self::Domain(_) => {
                ErrorCategory::Validation
            }
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::Repository(err) => err.category(),
            Self::Category(_) | Self::Comment(_) => ErrorCategory::Internal,
        }
    }
}

impl Categorize for TaskCommentError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::Permission(err) => err.category(),
            Self::TaskNotFound(_) | Self::NotFound(_) => ErrorCategory::NotFound,
            Self::Domain(_) => ErrorCategory::Validation,
            Self::Task(err) => err.category(),
            Self::Repository(_) => ErrorCategory::Internal,
        }
    }
}
