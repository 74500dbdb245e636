//! Handler records and the continuation passed between them.
//!
//! A [`Handler`] is the unit registered on a route or mounted as middleware.
//! It pairs the callable with optional [`ValidationSpec`] metadata so that
//! documentation tooling can read what a handler validates without invoking
//! it.
//!
//! Handlers follow the `(request, response, next)` calling convention. The
//! [`Next`] continuation is consumed by value, so a handler can continue the
//! chain at most once:
//!
//! ```rust
//! use cartographer_core::{Handler, Next, Request, Response};
//!
//! let logger = Handler::named("logger", |req: &mut Request, res: &mut Response, next: Next<'_>| {
//!     tracing::debug!(path = %req.path, "request");
//!     next.run(req, res);
//! });
//!
//! let mut req = Request::builder().uri("/ping").build().unwrap();
//! let mut res = Response::new();
//! logger.call(&mut req, &mut res, Next::noop());
//! ```

use std::fmt;
use std::sync::Arc;

use crate::request::Request;
use crate::response::Response;
use crate::validation::ValidationSpec;

/// The callable part of a [`Handler`].
pub type HandlerFn = dyn Fn(&mut Request, &mut Response, Next<'_>) + Send + Sync;

type Continuation<'a> = Box<dyn FnOnce(&mut Request, &mut Response, Option<anyhow::Error>) + 'a>;

/// Continuation handed to a handler.
///
/// Calling [`Next::run`] passes control to the next handler in the chain.
/// Calling [`Next::fail`] abandons the chain with an error. Dropping it
/// without calling either ends the chain; the handler is then expected to
/// have written the response.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// Remaining chain.
    Continue(Continuation<'a>),
    /// Nothing left to run.
    End,
}

impl<'a> Next<'a> {
    /// Creates a continuation from a closure.
    ///
    /// The closure receives `None` on the success path and `Some(error)`
    /// when the handler failed.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&mut Request, &mut Response, Option<anyhow::Error>) + 'a,
    {
        Self {
            inner: NextInner::Continue(Box::new(f)),
        }
    }

    /// A continuation that does nothing.
    #[must_use]
    pub fn noop() -> Self {
        Self {
            inner: NextInner::End,
        }
    }

    /// Continues with the next handler.
    pub fn run(self, req: &mut Request, res: &mut Response) {
        if let NextInner::Continue(f) = self.inner {
            f(req, res, None);
        }
    }

    /// Abandons the chain with `error`.
    pub fn fail(self, req: &mut Request, res: &mut Response, error: impl Into<anyhow::Error>) {
        if let NextInner::Continue(f) = self.inner {
            f(req, res, Some(error.into()));
        }
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.inner {
            NextInner::Continue(_) => "continue",
            NextInner::End => "end",
        };
        f.debug_struct("Next").field("state", &state).finish()
    }
}

/// A registered request handler.
///
/// Cloning is cheap: the callable and the validation metadata are shared.
#[derive(Clone)]
pub struct Handler {
    name: String,
    run: Arc<HandlerFn>,
    validation: Option<Arc<ValidationSpec>>,
}

impl Handler {
    /// Wraps a closure as an anonymous handler.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Request, &mut Response, Next<'_>) + Send + Sync + 'static,
    {
        Self::named("anonymous", f)
    }

    /// Wraps a closure as a named handler.
    pub fn named<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Request, &mut Response, Next<'_>) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            run: Arc::new(f),
            validation: None,
        }
    }

    /// Attaches validation metadata.
    #[must_use]
    pub fn with_validation(mut self, spec: impl Into<Arc<ValidationSpec>>) -> Self {
        self.validation = Some(spec.into());
        self
    }

    /// Returns the handler name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the attached validation metadata, if any.
    #[must_use]
    pub fn validation_spec(&self) -> Option<&ValidationSpec> {
        self.validation.as_deref()
    }

    /// Invokes the handler.
    pub fn call(&self, req: &mut Request, res: &mut Response, next: Next<'_>) {
        (self.run)(req, res, next);
    }

    /// Returns true if both values share the same callable.
    #[must_use]
    pub fn ptr_eq(&self, other: &Handler) -> bool {
        Arc::ptr_eq(&self.run, &other.run)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("validated", &self.validation.is_some())
            .finish_non_exhaustive()
    }
}
