//! Error types for the Canvas client core.
//!
//! # Design
//! Two layers fail in different ways. `MappingError` covers models whose
//! declared metadata cannot produce the requested wire format; it is raised
//! before any request is built, so nothing reached the network. `ApiError`
//! covers everything that happens once I/O starts, and wraps `MappingError`
//! so the facade can return one type.
//!
//! A 401 gets two dedicated variants because callers react differently: an
//! invalid token means re-authenticate, a permission failure does not.

/// Errors raised while mapping a model to a wire representation.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// The model type declares no object key but the mapping needs one.
    #[error("model {model} does not declare an object post key")]
    MissingObjectKey { model: &'static str },

    /// The model could not be read into a field map.
    #[error("could not read field values of model {model}: {reason}")]
    FieldAccess { model: &'static str, reason: String },
}

/// Errors returned by the transport client and the higher-level API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 401 with a `WWW-Authenticate` challenge: the token is invalid or expired.
    #[error("OAuth token is invalid or expired")]
    InvalidOauthToken,

    /// 401 without a challenge: the token is fine but lacks permission.
    #[error("user is not authorized to perform this action")]
    Unauthorized,

    /// Raised by `Response::error_for_status` for a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// Network, timeout or protocol failure reported by the HTTP stack.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// A URL could not be built from the configured base and path.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The model's metadata cannot produce the requested payload.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),
}

impl ApiError {
    /// Caller-fixable faults detected before any I/O.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ApiError::Mapping(_) | ApiError::InvalidUrl(_) | ApiError::SerializationError(_)
        )
    }

    /// Either flavour of 401.
    pub fn is_authentication(&self) -> bool {
        matches!(self, ApiError::InvalidOauthToken | ApiError::Unauthorized)
    }
}
