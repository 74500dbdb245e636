//! The mountable router.

use cartographer_core::{Handler, HttpMethod, Request, Response};

use crate::dispatch::{self, Dispatch};
use crate::layer::{Layer, MiddlewareLayer, MountLayer, RouteLayer};
use crate::path::PathPattern;
use crate::retrospect::{retrospect, RouteRecord};

/// Conversion into an ordered handler chain.
///
/// Implemented for a single [`Handler`], vectors and arrays, so routes can
/// be registered with one handler or a chain:
///
/// ```rust
/// use cartographer_core::Handler;
/// use cartographer_router::Router;
///
/// let auth = Handler::named("auth", |req, res, next| next.run(req, res));
/// let list = Handler::named("list", |_, res, _| { res.text("[]"); });
///
/// let mut router = Router::new();
/// router.get("/public", list.clone());
/// router.get("/private", [auth, list]);
/// assert_eq!(router.routes()[1].handlers.len(), 2);
/// ```
pub trait IntoHandlers {
    /// Returns the handlers in order.
    fn into_handlers(self) -> Vec<Handler>;
}

impl IntoHandlers for Handler {
    fn into_handlers(self) -> Vec<Handler> {
        vec![self]
    }
}

impl IntoHandlers for Vec<Handler> {
    fn into_handlers(self) -> Vec<Handler> {
        self
    }
}

impl<const N: usize> IntoHandlers for [Handler; N] {
    fn into_handlers(self) -> Vec<Handler> {
        self.into()
    }
}

/// Several methods bound to one handler chain at one path.
///
/// ```rust
/// use cartographer_core::{Handler, HttpMethod};
/// use cartographer_router::{Route, Router};
///
/// let mut router = Router::new();
/// router.route(
///     Route::new("/items/:id")
///         .get()
///         .put()
///         .handler(Handler::new(|_, _, _| {})),
/// );
///
/// let methods: Vec<_> = router.routes().iter().map(|r| r.method).collect();
/// assert_eq!(methods, vec![HttpMethod::Get, HttpMethod::Put]);
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct Route {
    path: String,
    methods: Vec<HttpMethod>,
    handlers: Vec<Handler>,
}

macro_rules! route_methods {
    ($($name:ident => $method:ident),* $(,)?) => {
        $(
            #[doc = concat!("Binds `", stringify!($name), "`.")]
            pub fn $name(self) -> Self {
                self.method(HttpMethod::$method)
            }
        )*
    };
}

impl Route {
    /// Starts a route at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            methods: Vec::new(),
            handlers: Vec::new(),
        }
    }

    /// Binds a method.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.methods.push(method);
        self
    }

    route_methods! {
        get => Get,
        post => Post,
        put => Put,
        delete => Delete,
        patch => Patch,
        head => Head,
        options => Options,
        trace => Trace,
    }

    /// Binds every method in [`HttpMethod::ALL`].
    pub fn all(mut self) -> Self {
        self.methods.extend(HttpMethod::ALL);
        self
    }

    /// Appends a handler to the chain.
    pub fn handler(mut self, handler: Handler) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Appends handlers to the chain.
    pub fn handlers(mut self, handlers: impl IntoHandlers) -> Self {
        self.handlers.extend(handlers.into_handlers());
        self
    }
}

/// A tree of routes, middleware and nested routers.
///
/// Registration order is significant: it is the order in which dispatch
/// runs matching handlers and the order in which [`Router::routes`] lists
/// routes.
#[derive(Debug, Clone, Default)]
pub struct Router {
    layers: Vec<Layer>,
}

macro_rules! router_methods {
    ($($name:ident => $method:ident),* $(,)?) => {
        $(
            #[doc = concat!("Registers a `", stringify!($name), "` route.")]
            pub fn $name(&mut self, path: &str, handlers: impl IntoHandlers) -> &mut Self {
                self.on([HttpMethod::$method], path, handlers)
            }
        )*
    };
}

impl Router {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    router_methods! {
        get => Get,
        post => Post,
        put => Put,
        delete => Delete,
        patch => Patch,
        head => Head,
        options => Options,
        trace => Trace,
    }

    /// Registers a route for several methods.
    pub fn on(
        &mut self,
        methods: impl IntoIterator<Item = HttpMethod>,
        path: &str,
        handlers: impl IntoHandlers,
    ) -> &mut Self {
        self.push(Layer::Route(RouteLayer::new(
            path,
            methods.into_iter().collect(),
            handlers.into_handlers(),
        )))
    }

    /// Registers a route built with [`Route`].
    pub fn route(&mut self, route: Route) -> &mut Self {
        self.push(Layer::Route(RouteLayer::new(
            &route.path,
            route.methods,
            route.handlers,
        )))
    }

    /// Mounts a nested router under `prefix`.
    pub fn mount(&mut self, prefix: &str, router: Router) -> &mut Self {
        self.push(Layer::Mount(MountLayer {
            pattern: PathPattern::parse(prefix),
            router,
        }))
    }

    /// Registers middleware for every request.
    pub fn use_handler(&mut self, handler: Handler) -> &mut Self {
        self.use_at("/", handler)
    }

    /// Registers middleware for requests under `path`.
    pub fn use_at(&mut self, path: &str, handler: Handler) -> &mut Self {
        self.push(Layer::Middleware(MiddlewareLayer {
            pattern: PathPattern::parse(path),
            handler,
        }))
    }

    /// Returns the layers in registration order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Returns the number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Lists every reachable route. See [`retrospect`].
    #[must_use]
    pub fn routes(&self) -> Vec<RouteRecord> {
        retrospect(self)
    }

    /// Runs the handlers matching `req`. See [`Dispatch`].
    pub fn dispatch(&self, req: &mut Request, res: &mut Response) -> Dispatch {
        dispatch::dispatch(self, req, res)
    }

    fn push(&mut self, layer: Layer) -> &mut Self {
        self.layers.push(layer);
        self
    }
}
