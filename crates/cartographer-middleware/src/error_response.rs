//! The default response written when validation fails.
//!
//! The body is a JSON error envelope:
//!
//! ```text
//! {
//!   "error": {
//!     "code": "VALIDATION_ERROR",
//!     "message": "Request body validation failed",
//!     "phase": "body",
//!     "issues": [{"path": "name", "code": "invalid_type", "message": "Expected string, received number"}]
//!   }
//! }
//! ```

use cartographer_core::{IssueCode, Response, ValidationFailure, ValidationPhase};
use http::StatusCode;
use serde::Serialize;

/// Error code carried by every validation error envelope.
pub const VALIDATION_ERROR_CODE: &str = "VALIDATION_ERROR";

/// How the default error path answers a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponsePolicy {
    /// Status code of the error response.
    pub status: StatusCode,
    /// Whether field-level issues are listed in the body.
    pub expose_issues: bool,
}

impl Default for ErrorResponsePolicy {
    fn default() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            expose_issues: true,
        }
    }
}

impl ErrorResponsePolicy {
    /// Sets the status code.
    #[must_use]
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Sets whether issues are listed.
    #[must_use]
    pub fn expose_issues(mut self, expose: bool) -> Self {
        self.expose_issues = expose;
        self
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'static str,
    message: String,
    phase: ValidationPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    issues: Option<Vec<IssueBody<'a>>>,
}

#[derive(Serialize)]
struct IssueBody<'a> {
    path: String,
    code: IssueCode,
    message: &'a str,
}

/// Writes the error envelope for `failure` to `res`.
pub fn write_error_response(policy: &ErrorResponsePolicy, failure: &ValidationFailure, res: &mut Response) {
    let issues = policy.expose_issues.then(|| {
        failure
            .error
            .issues
            .iter()
            .map(|issue| IssueBody {
                path: issue.dotted_path(),
                code: issue.code,
                message: &issue.message,
            })
            .collect()
    });

    let envelope = Envelope {
        error: ErrorBody {
            code: VALIDATION_ERROR_CODE,
            message: format!("Request {} validation failed", failure.phase),
            phase: failure.phase,
            issues,
        },
    };

    res.status(policy.status);
    let written = res.json_as(&envelope).map(|_| ());
    if let Err(error) = written {
        tracing::warn!(%error, "failed to serialize validation error response");
        res.text("validation failed");
    }
}
