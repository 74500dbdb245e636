//! Validator behaviour as seen by the next handler.

use std::cell::{Cell, RefCell};

use cartographer_core::{
    Handler, IssueCode, Next, Request, Response, Schema, ValidationPhase, ValidationSpec,
};
use cartographer_middleware::validate;
use cartographer_router::{Dispatch, Router};
use http::{Method, StatusCode};
use serde_json::{json, Value};

/// Runs `handler` with a counting continuation and returns the call count.
fn next_calls(handler: &Handler, req: &mut Request, res: &mut Response) -> usize {
    let calls = Cell::new(0);
    handler.call(
        req,
        res,
        Next::new(|_, _, error| {
            assert!(error.is_none(), "validator must continue without an error");
            calls.set(calls.get() + 1);
        }),
    );
    calls.get()
}

fn request(query: Value, body: Value) -> Request {
    let mut req = Request::builder().build().unwrap();
    req.query = query;
    req.body = body;
    req
}

#[test]
fn test_calls_next_without_config() {
    let mut req = request(json!({}), Value::Null);
    let mut res = Response::new();
    assert_eq!(next_calls(&validate(ValidationSpec::default()), &mut req, &mut res), 1);
}

mod body {
    use super::*;

    #[test]
    fn test_invalid_body_stops_chain() {
        let mut req = request(json!({}), json!({"name": 3}));
        let mut res = Response::new();
        let handler = validate(ValidationSpec::builder().body([("name", Schema::string())]).build());
        assert_eq!(next_calls(&handler, &mut req, &mut res), 0);
    }

    #[test]
    fn test_valid_body_continues() {
        let mut req = request(json!({}), json!({"name": "a string"}));
        let mut res = Response::new();
        let handler = validate(ValidationSpec::builder().body([("name", Schema::string())]).build());
        assert_eq!(next_calls(&handler, &mut req, &mut res), 1);
    }

    #[test]
    fn test_body_replaced_by_parsed_result() {
        let mut req = request(json!({}), json!({"name": "abc"}));
        let mut res = Response::new();
        let handler = validate(
            ValidationSpec::builder()
                .body([(
                    "name",
                    Schema::string().transform(|v| {
                        Ok(json!(format!("{}123", v.as_str().unwrap_or_default())))
                    }),
                )])
                .build(),
        );
        next_calls(&handler, &mut req, &mut res);
        assert_eq!(req.body["name"], "abc123");
    }

    #[test]
    fn test_suppressed_body_failure_continues() {
        let mut req = request(json!({}), json!({"name": "max"}));
        let mut res = Response::new();
        let handler = validate(
            ValidationSpec::builder()
                .body([("firstName", Schema::string())])
                .body_throws_error(false)
                .build(),
        );
        assert_eq!(next_calls(&handler, &mut req, &mut res), 1);
    }

    #[test]
    fn test_missing_body_fails_required_schema() {
        let mut req = request(json!({}), Value::Null);
        let mut res = Response::new();
        let handler = validate(ValidationSpec::builder().body([("name", Schema::string())]).build());
        assert_eq!(next_calls(&handler, &mut req, &mut res), 0);
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }
}

mod query {
    use super::*;

    #[test]
    fn test_invalid_query_stops_chain() {
        let mut req = request(json!({"name": "max"}), Value::Null);
        let mut res = Response::new();
        let handler = validate(ValidationSpec::builder().query([("firstName", Schema::string())]).build());
        assert_eq!(next_calls(&handler, &mut req, &mut res), 0);
    }

    #[test]
    fn test_valid_query_continues() {
        let mut req = request(json!({"name": "max"}), Value::Null);
        let mut res = Response::new();
        let handler = validate(ValidationSpec::builder().query([("name", Schema::string())]).build());
        assert_eq!(next_calls(&handler, &mut req, &mut res), 1);
    }

    #[test]
    fn test_query_replaced_by_parsed_result() {
        let mut req = request(json!({"name": "abc"}), Value::Null);
        let mut res = Response::new();
        let handler = validate(
            ValidationSpec::builder()
                .query([(
                    "name",
                    Schema::string().transform(|v| {
                        Ok(json!(format!("{}123", v.as_str().unwrap_or_default())))
                    }),
                )])
                .build(),
        );
        next_calls(&handler, &mut req, &mut res);
        assert_eq!(req.query["name"], "abc123");
    }

    #[test]
    fn test_suppressed_query_failure_continues() {
        let mut req = request(json!({"name": "max"}), Value::Null);
        let mut res = Response::new();
        let handler = validate(
            ValidationSpec::builder()
                .query([("firstName", Schema::string())])
                .query_throws_error(false)
                .build(),
        );
        assert_eq!(next_calls(&handler, &mut req, &mut res), 1);
        assert_eq!(req.query, json!({"name": "max"}));
    }
}

mod body_and_query {
    use super::*;

    fn spec() -> ValidationSpec {
        ValidationSpec::builder()
            .query([("queryField", Schema::string())])
            .body([("bodyField", Schema::string())])
            .build()
    }

    #[test]
    fn test_both_valid_continues() {
        let mut req = request(json!({"queryField": "q"}), json!({"bodyField": "b"}));
        let mut res = Response::new();
        assert_eq!(next_calls(&validate(spec()), &mut req, &mut res), 1);
    }

    #[test]
    fn test_valid_query_invalid_body_stops() {
        let mut req = request(json!({"queryField": "q"}), json!({"bodyField2": "b"}));
        let mut res = Response::new();
        assert_eq!(next_calls(&validate(spec()), &mut req, &mut res), 0);
    }

    #[test]
    fn test_valid_body_invalid_query_stops() {
        let mut req = request(json!({"queryField2": "q"}), json!({"bodyField": "b"}));
        let mut res = Response::new();
        assert_eq!(next_calls(&validate(spec()), &mut req, &mut res), 0);
    }
}

mod error_handler {
    use super::*;

    #[test]
    fn test_custom_error_handler_receives_failure_and_continuation() {
        let seen = RefCell::new(Vec::new());
        let handler_calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = std::sync::Arc::clone(&handler_calls);

        let handler = validate(
            ValidationSpec::builder()
                .body([("name", Schema::string())])
                .error_handler(move |failure, req, res, next| {
                    counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    assert_eq!(failure.phase, ValidationPhase::Body);
                    assert_eq!(failure.error.issues[0].code, IssueCode::Required);
                    assert_eq!(req.body, json!({"invalid": "invalid"}));
                    assert!(!res.is_sent());
                    next.run(req, res);
                })
                .build(),
        );

        let mut req = request(json!({}), json!({"invalid": "invalid"}));
        let mut res = Response::new();
        handler.call(
            &mut req,
            &mut res,
            Next::new(|_, _, _| seen.borrow_mut().push("next")),
        );

        assert_eq!(handler_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        // The continuation handed to the error handler is the validator's own.
        assert_eq!(*seen.borrow(), vec!["next"]);
        // No default response was written.
        assert!(!res.is_sent());
        assert_eq!(res.status, StatusCode::OK);
    }
}

#[test]
fn test_validator_in_router_chain() {
    let mut router = Router::new();
    router.post(
        "/users",
        [
            validate(
                ValidationSpec::builder()
                    .body([("name", Schema::string().min_length(1))])
                    .build(),
            ),
            Handler::new(|req, res, _| {
                res.status(StatusCode::CREATED).json(&req.body);
            }),
        ],
    );

    let mut ok = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .json(json!({"name": "max", "extra": true}))
        .build()
        .unwrap();
    let mut res = Response::new();
    assert!(matches!(router.dispatch(&mut ok, &mut res), Dispatch::Handled));
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body_json(), Some(json!({"name": "max"})));

    let mut bad = Request::builder()
        .method(Method::POST)
        .uri("/users")
        .json(json!({"name": ""}))
        .build()
        .unwrap();
    let mut res = Response::new();
    assert!(matches!(router.dispatch(&mut bad, &mut res), Dispatch::Handled));
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.body_json().unwrap()["error"]["issues"][0]["code"],
        "too_small"
    );
}
