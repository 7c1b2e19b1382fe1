//! Deserialization of Canvas response bodies.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::Response;

/// Parse every page as a JSON array and concatenate the items in order.
pub fn parse_to_list<T: DeserializeOwned>(responses: &[Response]) -> Result<Vec<T>, ApiError> {
    let mut items = Vec::new();
    for response in responses {
        let page: Vec<T> = serde_json::from_str(response.body())
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        items.extend(page);
    }
    Ok(items)
}

/// Parse a single object. An empty body yields `None`.
pub fn parse_to_object<T: DeserializeOwned>(response: &Response) -> Result<Option<T>, ApiError> {
    if response.body().trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(response.body())
        .map(Some)
        .map_err(|e| ApiError::DeserializationError(e.to_string()))
}
