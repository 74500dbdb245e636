//! The validator handler factory.
//!
//! [`validate`] turns a [`ValidationSpec`] into a [`Handler`] that checks the
//! query string and then the body of each request before handing over to the
//! next handler. On success the request data is replaced by the validated
//! value, so coercions, defaults and transforms are visible downstream.
//!
//! The spec stays attached to the handler, which is how documentation tooling
//! finds it.

use std::sync::Arc;

use cartographer_core::{
    Handler, Next, Request, Response, SchemaError, ValidationFailure, ValidationPhase,
    ValidationSpec,
};
use metrics::{counter, describe_counter};

use crate::error_response::{write_error_response, ErrorResponsePolicy};

/// Name given to validator handlers.
pub const VALIDATOR_NAME: &str = "validate";

/// Counter incremented for every failed validation phase.
pub const VALIDATION_FAILURES_METRIC: &str = "cartographer_validation_failures_total";

/// Builds validator handlers sharing one default error policy.
///
/// # Example
///
/// ```rust
/// use cartographer_core::{Schema, ValidationSpec};
/// use cartographer_middleware::{ErrorResponsePolicy, ValidatorFactory};
/// use http::StatusCode;
///
/// let factory = ValidatorFactory::new()
///     .policy(ErrorResponsePolicy::default().status(StatusCode::UNPROCESSABLE_ENTITY));
///
/// let handler = factory.validate(
///     ValidationSpec::builder()
///         .body([("name", Schema::string())])
///         .build(),
/// );
/// assert!(handler.validation_spec().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValidatorFactory {
    policy: ErrorResponsePolicy,
}

impl ValidatorFactory {
    /// Creates a factory with the default policy (400, issues listed).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the policy used when a spec has no custom error handler.
    #[must_use]
    pub fn policy(mut self, policy: ErrorResponsePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builds a validator handler for `spec`.
    pub fn validate(&self, spec: ValidationSpec) -> Handler {
        let spec = Arc::new(spec);
        let runtime = Arc::clone(&spec);
        let policy = self.policy.clone();

        Handler::named(VALIDATOR_NAME, move |req, res, next| {
            run(&runtime, &policy, req, res, next);
        })
        .with_validation(spec)
    }
}

/// Builds a validator handler with the default error policy.
///
/// # Example
///
/// ```rust
/// use cartographer_core::{Next, Request, Schema, Response, ValidationSpec};
/// use cartographer_middleware::validate;
/// use serde_json::json;
///
/// let validator = validate(ValidationSpec::builder().query([("q", Schema::string())]).build());
///
/// let mut req = Request::builder().uri("/search?q=rust").build().unwrap();
/// let mut res = Response::new();
/// let mut called = false;
/// validator.call(&mut req, &mut res, Next::new(|_, _, _| called = true));
///
/// assert!(called);
/// assert_eq!(req.query, json!({"q": "rust"}));
/// ```
pub fn validate(spec: ValidationSpec) -> Handler {
    ValidatorFactory::new().validate(spec)
}

/// Registers the validator metric descriptions with the installed recorder.
pub fn describe_metrics() {
    describe_counter!(
        VALIDATION_FAILURES_METRIC,
        "Total request validation failures by phase and outcome"
    );
}

fn run(
    spec: &ValidationSpec,
    policy: &ErrorResponsePolicy,
    req: &mut Request,
    res: &mut Response,
    next: Next<'_>,
) {
    for phase in [ValidationPhase::Query, ValidationPhase::Body] {
        let (schema, throws) = match phase {
            ValidationPhase::Query => (spec.query.as_ref(), spec.query_throws_error),
            ValidationPhase::Body => (spec.body.as_ref(), spec.body_throws_error),
        };
        let Some(schema) = schema else {
            continue;
        };

        let target = match phase {
            ValidationPhase::Query => &mut req.query,
            ValidationPhase::Body => &mut req.body,
        };

        match schema.validate(target) {
            Ok(validated) => *target = validated,
            Err(error) if throws => {
                record_failure(phase, &error, "rejected");
                let failure = ValidationFailure { phase, error };
                reject(spec, policy, failure, req, res, next);
                return;
            }
            Err(error) => record_failure(phase, &error, "suppressed"),
        }
    }

    next.run(req, res);
}

fn reject(
    spec: &ValidationSpec,
    policy: &ErrorResponsePolicy,
    failure: ValidationFailure,
    req: &mut Request,
    res: &mut Response,
    next: Next<'_>,
) {
    match &spec.error_handler {
        Some(handler) => handler(failure, req, res, next),
        None => write_error_response(policy, &failure, res),
    }
}

fn record_failure(phase: ValidationPhase, error: &SchemaError, outcome: &'static str) {
    tracing::debug!(
        phase = phase.as_str(),
        outcome,
        issues = error.issues.len(),
        error = %error,
        "request validation failed"
    );
    counter!(
        VALIDATION_FAILURES_METRIC,
        "phase" => phase.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}
