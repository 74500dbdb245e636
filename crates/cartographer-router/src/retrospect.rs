//! Route retrospection.
//!
//! Recovers the flat list of effective routes from a [`Router`] tree. The
//! walk is depth-first and pre-order over sibling layers in registration
//! order, so routes of a nested router appear exactly where the router was
//! mounted.
//!
//! ```rust
//! use cartographer_core::Handler;
//! use cartographer_router::{retrospect, Router};
//!
//! let h = Handler::new(|_, _, _| {});
//!
//! let mut sub = Router::new();
//! sub.get("/path", h.clone());
//! let mut router = Router::new();
//! router.mount("/sub", sub);
//! let mut app = Router::new();
//! app.mount("/router", router);
//!
//! let routes = retrospect(&app);
//! assert_eq!(routes.len(), 1);
//! assert_eq!(routes[0].path, "/router/sub/path");
//! ```

use cartographer_core::{Handler, HttpMethod, ValidationSpec};

use crate::layer::LayerShape;
use crate::path::{join_paths, parse_params, PathParam};
use crate::router::Router;

/// One reachable (method, path) pair.
#[derive(Debug, Clone)]
pub struct RouteRecord {
    /// Bound method.
    pub method: HttpMethod,
    /// Absolute path pattern, placeholders kept.
    pub path: String,
    /// Placeholders of `path`, left to right.
    pub params: Vec<PathParam>,
    /// Handler chain as registered. Never empty.
    pub handlers: Vec<Handler>,
}

impl RouteRecord {
    /// Returns the validation metadata of the first handler carrying any.
    #[must_use]
    pub fn validation_spec(&self) -> Option<&ValidationSpec> {
        self.handlers.iter().find_map(Handler::validation_spec)
    }
}

/// Lists every route reachable from `router`.
///
/// Each route layer yields one record per bound method, all sharing the
/// same path, parameters and handler chain. Layers that register no route
/// are skipped.
#[must_use]
pub fn retrospect(router: &Router) -> Vec<RouteRecord> {
    let mut records = Vec::new();
    walk(router, "", &mut records);
    tracing::debug!(routes = records.len(), "retrospected router");
    records
}

fn walk(router: &Router, prefix: &str, records: &mut Vec<RouteRecord>) {
    for layer in router.layers() {
        match layer.shape() {
            LayerShape::Route {
                pattern,
                methods,
                handlers,
            } => {
                let path = join_paths(prefix, pattern.as_str());
                let params = parse_params(&path);
                records.extend(methods.iter().map(|method| RouteRecord {
                    method: *method,
                    path: path.clone(),
                    params: params.clone(),
                    handlers: handlers.to_vec(),
                }));
            }
            LayerShape::Mount { pattern, router } => {
                walk(router, &join_paths(prefix, pattern.as_str()), records);
            }
            LayerShape::Opaque => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Route;

    fn handler() -> Handler {
        Handler::new(|_, _, _| {})
    }

    #[test]
    fn test_empty_router() {
        assert!(retrospect(&Router::new()).is_empty());
    }

    #[test]
    fn test_one_record_per_method() {
        let mut router = Router::new();
        router.route(Route::new("/items/:id").get().delete().handler(handler()));

        let routes = retrospect(&router);
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].method, HttpMethod::Get);
        assert_eq!(routes[1].method, HttpMethod::Delete);
        assert_eq!(routes[0].path, routes[1].path);
        assert_eq!(routes[0].params, routes[1].params);
        assert!(routes[0].handlers[0].ptr_eq(&routes[1].handlers[0]));
    }

    #[test]
    fn test_root_mount_adds_no_prefix() {
        let mut sub = Router::new();
        sub.get("/users", handler());
        let mut app = Router::new();
        app.mount("/", sub.clone());
        app.mount("", sub);

        let routes = retrospect(&app);
        assert_eq!(routes[0].path, "/users");
        assert_eq!(routes[1].path, "/users");
    }

    #[test]
    fn test_mount_prefix_params_are_listed() {
        let mut sub = Router::new();
        sub.get("/users/:userId", handler());
        let mut app = Router::new();
        app.mount("/orgs/:orgId", sub);

        let routes = retrospect(&app);
        let names: Vec<_> = routes[0].params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["orgId", "userId"]);
    }

    #[test]
    fn test_validation_spec_lookup() {
        let plain = handler();
        let validated = handler().with_validation(ValidationSpec::default());

        let mut router = Router::new();
        router.get("/plain", plain.clone());
        router.post("/validated", [plain, validated]);

        let routes = retrospect(&router);
        assert!(routes[0].validation_spec().is_none());
        assert!(routes[1].validation_spec().is_some());
    }
}
