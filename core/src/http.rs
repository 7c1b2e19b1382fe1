//! Transport result types.
//!
//! # Design
//! `Response` is created once per request and never mutated afterwards. It
//! carries whatever status the server sent: the transport only turns 401
//! into an error, so callers decide how to treat other non-2xx statuses.
//! `error_for_status` is the one-line opt-in for strict handling.

use std::fmt;

use crate::error::ApiError;

/// HTTP method of an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body, status and pagination link of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    body: String,
    status: u16,
    next_link: Option<String>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>, next_link: Option<String>) -> Self {
        Self {
            body: body.into(),
            status,
            next_link,
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// URL of the next page, if the server announced one.
    pub fn next_link(&self) -> Option<&str> {
        self.next_link.as_deref()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into `ApiError::HttpError`.
    pub fn error_for_status(self) -> Result<Self, ApiError> {
        if self.is_success() {
            return Ok(self);
        }
        Err(ApiError::HttpError {
            status: self.status,
            body: self.body,
        })
    }
}
