//! Blocking client core for the Canvas LMS REST API.
//!
//! # Overview
//! Maps typed Canvas models to the request payloads the API expects and
//! performs authenticated calls with cursor pagination.
//!
//! # Design
//! - `model` holds the declarative mapper: each model type states its object
//!   key and per-field form keys once, and generic code derives both the
//!   form parameter map and the wrapped JSON document.
//! - `client` is the transport. `RestClient` is a trait so callers and tests
//!   can substitute it; `SimpleRestClient` is the ureq implementation.
//! - `Response` keeps non-2xx statuses as data. Only 401 is an error, split
//!   into an invalid-token and a missing-permission case.
//! - `CanvasApi` strings the pieces together for typed CRUD and list calls.
//! - Mapping and transport are stateless; the only shared state is the GET
//!   connection pool inside `SimpleRestClient`.

pub mod api;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod form;
pub mod http;
pub mod model;
pub mod oauth;
pub mod pagination;
pub mod parser;

pub use api::CanvasApi;
pub use client::{RestClient, SimpleRestClient};
pub use config::{ClientConfig, Timeouts};
pub use error::{ApiError, MappingError};
pub use form::{PostMap, RequestParams};
pub use http::{HttpMethod, Response};
pub use model::{CanvasField, CanvasModel, CanvasObject};
pub use oauth::{NonRefreshableOauthToken, OauthToken};
