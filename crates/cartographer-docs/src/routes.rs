//! Serving a generated document from a [`Router`].

use std::sync::Arc;

use cartographer_core::Handler;
use cartographer_router::Router;
use serde_json::Value;

use crate::error::{DocsError, DocsResult};
use crate::openapi::OpenApi;
use crate::swagger::SwaggerUi;

/// Documentation endpoints for one document.
///
/// Mounting registers two routes:
///
/// - `GET <path>/openapi.json` serving the document
/// - `GET <path>` serving the Swagger UI page
///
/// ```rust
/// use cartographer_docs::{DocsRoutes, Info, OpenApi};
/// use cartographer_router::Router;
///
/// let doc = OpenApi::new(Info::new("api", "1.0.0"));
/// let mut router = Router::new();
/// DocsRoutes::new("/docs", &doc).unwrap().mount(&mut router);
///
/// let paths: Vec<_> = router.routes().into_iter().map(|r| r.path).collect();
/// assert_eq!(paths, vec!["/docs/openapi.json", "/docs"]);
/// ```
#[derive(Debug, Clone)]
pub struct DocsRoutes {
    swagger: SwaggerUi,
    document: Arc<Value>,
    page: Arc<String>,
}

impl DocsRoutes {
    /// Prepares the endpoints under `path`.
    ///
    /// The document is serialized once, here.
    pub fn new(path: impl Into<String>, doc: &OpenApi) -> DocsResult<Self> {
        Self::with_swagger(SwaggerUi::new(path, doc), doc)
    }

    /// Prepares the endpoints with a customised Swagger UI page.
    pub fn with_swagger(swagger: SwaggerUi, doc: &OpenApi) -> DocsResult<Self> {
        if !swagger.path().starts_with('/') {
            return Err(DocsError::InvalidPath {
                path: swagger.path().to_string(),
                reason: "must start with '/'".to_string(),
            });
        }
        let document = Arc::new(serde_json::to_value(doc)?);
        let page = Arc::new(swagger.html());
        Ok(Self {
            swagger,
            document,
            page,
        })
    }

    /// Returns the Swagger UI configuration.
    #[must_use]
    pub fn swagger(&self) -> &SwaggerUi {
        &self.swagger
    }

    /// Registers the endpoints on `router`.
    pub fn mount(&self, router: &mut Router) {
        let document = Arc::clone(&self.document);
        let page = Arc::clone(&self.page);
        let page_path = self.swagger.path().trim_end_matches('/');
        let page_path = if page_path.is_empty() { "/" } else { page_path };

        router
            .get(
                &self.swagger.spec_path(),
                Handler::named("openapi.json", move |_, res, _| {
                    res.json(&document);
                }),
            )
            .get(
                page_path,
                Handler::named("swagger-ui", move |_, res, _| {
                    res.html(page.as_str());
                }),
            );
        tracing::debug!(path = page_path, "mounted documentation routes");
    }
}
