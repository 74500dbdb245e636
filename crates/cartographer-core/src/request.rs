//! The request value handlers operate on.

use http::header::{HeaderName, HeaderValue};
use http::{Extensions, HeaderMap, Method, Uri};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};
use crate::params::Params;

/// An incoming request, already decoded.
///
/// `query` and `body` hold JSON values so that validation can replace them
/// with their validated (coerced, transformed) form in place.
#[derive(Debug)]
pub struct Request {
    /// Request method.
    pub method: Method,
    /// Request path without the query string.
    pub path: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Decoded query string as a JSON object.
    ///
    /// Repeated keys become arrays of strings. An absent query string is an
    /// empty object.
    pub query: Value,
    /// Decoded JSON body, `Null` when absent.
    pub body: Value,
    /// Path parameters captured by dispatch.
    pub params: Params,
    /// Typed per-request data.
    pub extensions: Extensions,
}

impl Request {
    /// Creates a request with no query, headers or body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            query: Value::Object(Map::new()),
            body: Value::Null,
            params: Params::new(),
            extensions: Extensions::new(),
        }
    }

    /// Starts building a request.
    #[must_use]
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// Returns a path parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Returns a header value if it is valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Deserializes the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Deserialize`] if the body does not fit `T`.
    pub fn body_as<T: DeserializeOwned>(&self) -> CoreResult<T> {
        serde_json::from_value(self.body.clone()).map_err(|e| CoreError::deserialize("body", e))
    }

    /// Deserializes the query object into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Deserialize`] if the query does not fit `T`.
    pub fn query_as<T: DeserializeOwned>(&self) -> CoreResult<T> {
        serde_json::from_value(self.query.clone()).map_err(|e| CoreError::deserialize("query", e))
    }
}

/// Decodes a raw query string into a JSON object.
///
/// # Errors
///
/// Returns [`CoreError::InvalidRequest`] if the string is not valid
/// `application/x-www-form-urlencoded` data.
pub fn decode_query(raw: &str) -> CoreResult<Value> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw)
        .map_err(|e| CoreError::InvalidRequest(format!("invalid query string: {e}")))?;

    let mut query = Map::new();
    for (key, value) in pairs {
        match query.get_mut(&key) {
            None => {
                query.insert(key, Value::String(value));
            }
            Some(Value::Array(values)) => values.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
        }
    }
    Ok(Value::Object(query))
}

/// Builder for [`Request`].
#[derive(Debug, Default)]
pub struct RequestBuilder {
    method: Option<Method>,
    uri: Option<String>,
    headers: Vec<(String, String)>,
    body: Option<Value>,
}

impl RequestBuilder {
    /// Sets the method (default `GET`).
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the path and query, e.g. `/users?page=2` (default `/`).
    #[must_use]
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Appends a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRequest`] for a malformed URI, header or
    /// query string.
    pub fn build(self) -> CoreResult<Request> {
        let raw = self.uri.unwrap_or_else(|| "/".to_string());
        let uri: Uri = raw
            .parse()
            .map_err(|e| CoreError::InvalidRequest(format!("invalid uri {raw:?}: {e}")))?;

        let mut request = Request::new(self.method.unwrap_or(Method::GET), uri.path());
        if let Some(raw_query) = uri.query() {
            request.query = decode_query(raw_query)?;
        }

        for (name, value) in self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| CoreError::InvalidRequest(format!("invalid header name {name:?}: {e}")))?;
            let header_value = HeaderValue::from_str(&value)
                .map_err(|e| CoreError::InvalidRequest(format!("invalid header value for {name}: {e}")))?;
            request.headers.append(header_name, header_value);
        }

        if let Some(body) = self.body {
            request
                .headers
                .entry(http::header::CONTENT_TYPE)
                .or_insert(HeaderValue::from_static("application/json"));
            request.body = body;
        }

        Ok(request)
    }
}
