//! Router layers and their classification.
//!
//! Every registration on a [`Router`] appends one [`Layer`]. Readers of the
//! tree never match on layers directly; they ask for the layer's
//! [`LayerShape`], which folds malformed registrations into
//! [`LayerShape::Opaque`] so that traversal never fails on them.

use cartographer_core::{Handler, HttpMethod};

use crate::path::PathPattern;
use crate::router::Router;

/// One registration entry of a [`Router`].
#[derive(Debug, Clone)]
pub enum Layer {
    /// Methods bound to a handler chain at a path.
    Route(RouteLayer),
    /// A nested router under a path prefix.
    Mount(MountLayer),
    /// A handler that runs for every request under a path prefix.
    Middleware(MiddlewareLayer),
}

/// A route binding.
#[derive(Debug, Clone)]
pub struct RouteLayer {
    pub(crate) pattern: PathPattern,
    pub(crate) methods: Vec<HttpMethod>,
    pub(crate) handlers: Vec<Handler>,
}

impl RouteLayer {
    pub(crate) fn new(path: &str, methods: Vec<HttpMethod>, handlers: Vec<Handler>) -> Self {
        let mut unique = Vec::with_capacity(methods.len());
        for method in methods {
            if !unique.contains(&method) {
                unique.push(method);
            }
        }
        Self {
            pattern: PathPattern::parse(path),
            methods: unique,
            handlers,
        }
    }
}

/// A sub-router mount.
#[derive(Debug, Clone)]
pub struct MountLayer {
    pub(crate) pattern: PathPattern,
    pub(crate) router: Router,
}

/// A plain middleware registration.
#[derive(Debug, Clone)]
pub struct MiddlewareLayer {
    pub(crate) pattern: PathPattern,
    pub(crate) handler: Handler,
}

impl MiddlewareLayer {
    /// Returns the handler.
    #[must_use]
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Returns the path prefix the middleware applies under.
    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }
}

/// What a layer contributes to the route tree.
#[derive(Debug, Clone, Copy)]
pub enum LayerShape<'a> {
    /// A usable route binding.
    Route {
        /// Local path pattern.
        pattern: &'a PathPattern,
        /// Bound methods, never empty.
        methods: &'a [HttpMethod],
        /// Handler chain, never empty.
        handlers: &'a [Handler],
    },
    /// A nested router.
    Mount {
        /// Mount prefix.
        pattern: &'a PathPattern,
        /// The nested router.
        router: &'a Router,
    },
    /// Registers no route.
    Opaque,
}

impl Layer {
    /// Classifies the layer.
    #[must_use]
    pub fn shape(&self) -> LayerShape<'_> {
        match self {
            Self::Route(route) if route.methods.is_empty() || route.handlers.is_empty() => {
                tracing::debug!(
                    path = route.pattern.as_str(),
                    methods = route.methods.len(),
                    handlers = route.handlers.len(),
                    "skipping route layer without methods or handlers"
                );
                LayerShape::Opaque
            }
            Self::Route(route) => LayerShape::Route {
                pattern: &route.pattern,
                methods: &route.methods,
                handlers: &route.handlers,
            },
            Self::Mount(mount) => LayerShape::Mount {
                pattern: &mount.pattern,
                router: &mount.router,
            },
            Self::Middleware(_) => LayerShape::Opaque,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> Handler {
        Handler::new(|_, _, _| {})
    }

    #[test]
    fn test_route_shape() {
        let layer = Layer::Route(RouteLayer::new("/a", vec![HttpMethod::Get], vec![handler()]));
        match layer.shape() {
            LayerShape::Route { pattern, methods, handlers } => {
                assert_eq!(pattern.as_str(), "/a");
                assert_eq!(methods, &[HttpMethod::Get]);
                assert_eq!(handlers.len(), 1);
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_methods_collapse() {
        let route = RouteLayer::new(
            "/a",
            vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Get],
            vec![handler()],
        );
        assert_eq!(route.methods, vec![HttpMethod::Get, HttpMethod::Post]);
    }

    #[test]
    fn test_malformed_routes_are_opaque() {
        let no_methods = Layer::Route(RouteLayer::new("/a", vec![], vec![handler()]));
        assert!(matches!(no_methods.shape(), LayerShape::Opaque));

        let no_handlers = Layer::Route(RouteLayer::new("/a", vec![HttpMethod::Get], vec![]));
        assert!(matches!(no_handlers.shape(), LayerShape::Opaque));
    }

    #[test]
    fn test_middleware_is_opaque() {
        let layer = Layer::Middleware(MiddlewareLayer {
            pattern: PathPattern::parse("/"),
            handler: handler(),
        });
        assert!(matches!(layer.shape(), LayerShape::Opaque));
    }

    #[test]
    fn test_mount_shape() {
        let layer = Layer::Mount(MountLayer {
            pattern: PathPattern::parse("/api"),
            router: Router::new(),
        });
        assert!(matches!(layer.shape(), LayerShape::Mount { .. }));
    }
}
