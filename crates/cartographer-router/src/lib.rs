//! Mountable router with route retrospection for Cartographer.
//!
//! A [`Router`] is an ordered list of layers: route bindings, nested router
//! mounts and plain middleware. The same tree serves two purposes:
//!
//! - [`Router::dispatch`] runs the handlers matching a request
//! - [`retrospect`] recovers the flat list of effective routes, with full
//!   paths, methods, path parameters and handler chains
//!
//! # Example
//!
//! ```rust
//! use cartographer_core::{Handler, HttpMethod};
//! use cartographer_router::Router;
//!
//! let list = Handler::named("list", |_, res, _| { res.text("[]"); });
//! let show = Handler::named("show", |_, res, _| { res.text("{}"); });
//!
//! let mut users = Router::new();
//! users.get("/", list).get("/:id", show);
//!
//! let mut app = Router::new();
//! app.mount("/users", users);
//!
//! let routes = app.routes();
//! assert_eq!(routes[0].path, "/users");
//! assert_eq!(routes[1].path, "/users/:id");
//! assert_eq!(routes[1].method, HttpMethod::Get);
//! assert_eq!(routes[1].params[0].name, "id");
//! ```

#![doc(html_root_url = "https://docs.rs/cartographer-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod dispatch;
mod layer;
mod path;
mod retrospect;
mod router;

pub use dispatch::Dispatch;
pub use layer::{Layer, LayerShape, MiddlewareLayer, MountLayer, RouteLayer};
pub use path::{join_paths, parse_params, PathParam, PathPattern};
pub use retrospect::{retrospect, RouteRecord};
pub use router::{IntoHandlers, Route, Router};
