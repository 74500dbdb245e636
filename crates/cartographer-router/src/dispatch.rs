//! Request dispatch.
//!
//! Dispatch walks the same layers retrospection does, collecting every
//! handler that applies to the request: middleware whose prefix matches,
//! route handlers whose method and full pattern match, and the contents of
//! mounted routers whose prefix matches. The collected handlers then run as
//! one chain, each handing over through its [`Next`].

use std::cell::RefCell;

use cartographer_core::{Handler, HttpMethod, Next, Params, Request, Response};

use crate::layer::{Layer, LayerShape};
use crate::router::Router;

/// Outcome of [`Router::dispatch`].
#[derive(Debug)]
pub enum Dispatch {
    /// A handler ended the chain.
    Handled,
    /// Every matching handler continued and nothing answered the request.
    NotFound,
    /// A handler failed the chain.
    Failed(anyhow::Error),
}

impl Dispatch {
    /// Returns true for [`Dispatch::Handled`].
    #[must_use]
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled)
    }

    /// Returns true for [`Dispatch::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

struct Step<'r> {
    handler: &'r Handler,
    params: Params,
}

pub(crate) fn dispatch(router: &Router, req: &mut Request, res: &mut Response) -> Dispatch {
    let Ok(method) = HttpMethod::try_from(&req.method) else {
        tracing::debug!(method = %req.method, "unsupported method");
        return Dispatch::NotFound;
    };

    let mut steps = Vec::new();
    let path = req.path.clone();
    collect(router, method, &path, &Params::new(), &mut steps);
    tracing::debug!(method = %req.method, path = %req.path, steps = steps.len(), "dispatching");

    let outcome = RefCell::new(None);
    run(&steps, 0, req, res, &outcome);

    match outcome.into_inner() {
        None => Dispatch::Handled,
        Some(Dispatch::NotFound) if res.is_sent() => Dispatch::Handled,
        Some(result) => result,
    }
}

fn collect<'r>(
    router: &'r Router,
    method: HttpMethod,
    path: &str,
    inherited: &Params,
    steps: &mut Vec<Step<'r>>,
) {
    for layer in router.layers() {
        if let Layer::Middleware(middleware) = layer {
            if let Some((params, _)) = middleware.pattern().match_prefix(path) {
                steps.push(Step {
                    handler: middleware.handler(),
                    params: merged(inherited, &params),
                });
            }
            continue;
        }

        match layer.shape() {
            LayerShape::Route {
                pattern,
                methods,
                handlers,
            } => {
                if !methods.contains(&method) {
                    continue;
                }
                if let Some(params) = pattern.match_exact(path) {
                    let params = merged(inherited, &params);
                    steps.extend(handlers.iter().map(|handler| Step {
                        handler,
                        params: params.clone(),
                    }));
                }
            }
            LayerShape::Mount { pattern, router } => {
                if let Some((params, rest)) = pattern.match_prefix(path) {
                    collect(router, method, &rest, &merged(inherited, &params), steps);
                }
            }
            LayerShape::Opaque => {}
        }
    }
}

fn merged(inherited: &Params, own: &Params) -> Params {
    let mut params = inherited.clone();
    params.extend_from(own);
    params
}

fn run(
    steps: &[Step<'_>],
    index: usize,
    req: &mut Request,
    res: &mut Response,
    outcome: &RefCell<Option<Dispatch>>,
) {
    let Some(step) = steps.get(index) else {
        *outcome.borrow_mut() = Some(Dispatch::NotFound);
        return;
    };

    req.params = step.params.clone();
    let next = Next::new(move |req: &mut Request, res: &mut Response, error| match error {
        None => run(steps, index + 1, req, res, outcome),
        Some(error) => {
            tracing::debug!(handler = step.handler.name(), error = %error, "handler failed");
            *outcome.borrow_mut() = Some(Dispatch::Failed(error));
        }
    });
    step.handler.call(req, res, next);
}
