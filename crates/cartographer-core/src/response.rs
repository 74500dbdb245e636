//! The response value handlers write to.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::error::CoreResult;

/// A response under construction.
///
/// Writing a body through [`json`](Response::json), [`text`](Response::text)
/// or [`html`](Response::html) marks the response as sent. Dispatch treats a
/// sent response as the end of the handler chain.
#[derive(Debug, Clone)]
pub struct Response {
    /// Status code (default `200 OK`).
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
    sent: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Creates an empty `200 OK` response.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            sent: false,
        }
    }

    /// Sets the status code.
    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    /// Writes a JSON body.
    pub fn json(&mut self, body: &Value) -> &mut Self {
        // Serializing a `Value` cannot fail.
        let bytes = serde_json::to_vec(body).unwrap_or_default();
        self.send(bytes, "application/json")
    }

    /// Serializes `body` and writes it as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Serialize`](crate::CoreError::Serialize) if `body`
    /// cannot be serialized.
    pub fn json_as<T: Serialize>(&mut self, body: &T) -> CoreResult<&mut Self> {
        let bytes = serde_json::to_vec(body)?;
        Ok(self.send(bytes, "application/json"))
    }

    /// Writes a plain-text body.
    pub fn text(&mut self, body: impl Into<String>) -> &mut Self {
        self.send(body.into().into_bytes(), "text/plain; charset=utf-8")
    }

    /// Writes an HTML body.
    pub fn html(&mut self, body: impl Into<String>) -> &mut Self {
        self.send(body.into().into_bytes(), "text/html; charset=utf-8")
    }

    /// Parses the body back as JSON.
    #[must_use]
    pub fn body_json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }

    /// Returns true once a body has been written.
    #[must_use]
    pub fn is_sent(&self) -> bool {
        self.sent
    }

    fn send(&mut self, body: Vec<u8>, content_type: &'static str) -> &mut Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        self.body = Bytes::from(body);
        self.sent = true;
        self
    }
}
