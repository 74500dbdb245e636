//! Swagger UI page generation.
//!
//! The page loads Swagger UI from a CDN and points it at the JSON document
//! served next to it, at [`SwaggerUi::spec_path`].

use crate::openapi::OpenApi;

/// Swagger UI configuration and HTML generation.
#[derive(Debug, Clone)]
pub struct SwaggerUi {
    path: String,
    title: String,
    deep_linking: bool,
    doc_expansion: DocExpansion,
    swagger_version: String,
}

/// Document expansion level for Swagger UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocExpansion {
    /// Show all operations collapsed.
    None,
    /// Show only the list of operations.
    #[default]
    List,
    /// Expand all operations fully.
    Full,
}

impl DocExpansion {
    fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::List => "list",
            Self::Full => "full",
        }
    }
}

impl SwaggerUi {
    /// Creates a page served at `path` for `doc`.
    #[must_use]
    pub fn new(path: impl Into<String>, doc: &OpenApi) -> Self {
        Self {
            path: path.into(),
            title: format!("{} - Swagger UI", doc.info.title),
            deep_linking: true,
            doc_expansion: DocExpansion::List,
            swagger_version: "5.18.2".to_string(),
        }
    }

    /// Sets the page title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Enables or disables deep linking.
    #[must_use]
    pub fn deep_linking(mut self, enabled: bool) -> Self {
        self.deep_linking = enabled;
        self
    }

    /// Sets the document expansion level.
    #[must_use]
    pub fn doc_expansion(mut self, expansion: DocExpansion) -> Self {
        self.doc_expansion = expansion;
        self
    }

    /// Sets the Swagger UI version loaded from the CDN.
    #[must_use]
    pub fn swagger_version(mut self, version: impl Into<String>) -> Self {
        self.swagger_version = version.into();
        self
    }

    /// Returns the page path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the path of the JSON document.
    #[must_use]
    pub fn spec_path(&self) -> String {
        format!("{}/openapi.json", self.path.trim_end_matches('/'))
    }

    /// Renders the page.
    #[must_use]
    pub fn html(&self) -> String {
        format!(
            r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui.css" />
    <style>
        body {{
            margin: 0;
            background: #fafafa;
        }}
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {{
            window.ui = SwaggerUIBundle({{
                url: '{spec_url}',
                dom_id: '#swagger-ui',
                deepLinking: {deep_linking},
                docExpansion: '{doc_expansion}',
                presets: [SwaggerUIBundle.presets.apis]
            }});
        }};
    </script>
</body>
</html>"##,
            title = html_escape(&self.title),
            version = html_escape(&self.swagger_version),
            spec_url = html_escape(&self.spec_path()),
            deep_linking = self.deep_linking,
            doc_expansion = self.doc_expansion.as_str(),
        )
    }

    /// Renders the page as bytes.
    #[must_use]
    pub fn html_bytes(&self) -> bytes::Bytes {
        bytes::Bytes::from(self.html())
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::Info;

    fn doc() -> OpenApi {
        OpenApi::new(Info::new("Test API", "1.0.0"))
    }

    #[test]
    fn test_swagger_ui_paths() {
        let swagger = SwaggerUi::new("/docs", &doc());
        assert_eq!(swagger.path(), "/docs");
        assert_eq!(swagger.spec_path(), "/docs/openapi.json");
    }

    #[test]
    fn test_spec_path_trailing_slash() {
        let swagger = SwaggerUi::new("/docs/", &doc());
        assert_eq!(swagger.spec_path(), "/docs/openapi.json");
    }

    #[test]
    fn test_html_references_document() {
        let html = SwaggerUi::new("/docs", &doc())
            .doc_expansion(DocExpansion::Full)
            .deep_linking(false)
            .html();

        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("Test API - Swagger UI"));
        assert!(html.contains("url: '/docs/openapi.json'"));
        assert!(html.contains("docExpansion: 'full'"));
        assert!(html.contains("deepLinking: false"));
    }

    #[test]
    fn test_title_is_escaped() {
        let html = SwaggerUi::new("/docs", &doc()).title("<b>API</b>").html();
        assert!(html.contains("&lt;b&gt;API&lt;/b&gt;"));
        assert!(!html.contains("<b>API</b>"));
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("\"test\""), "&quot;test&quot;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
    }

    #[test]
    fn test_html_bytes() {
        let bytes = SwaggerUi::new("/docs", &doc()).swagger_version("5.0.0").html_bytes();
        assert!(std::str::from_utf8(&bytes).unwrap().contains("swagger-ui-dist@5.0.0"));
    }
}
