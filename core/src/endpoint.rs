//! Canvas API URL construction.

use url::Url;

use crate::error::ApiError;
use crate::form::RequestParams;

/// Build `<base>/api/v<version>/<path>` with `params` as the query string.
pub fn build_canvas_url(
    base_url: &str,
    api_version: u32,
    path: &str,
    params: &RequestParams,
) -> Result<String, ApiError> {
    let raw = format!(
        "{}/api/v{api_version}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    let mut url = Url::parse(&raw)?;
    if params.values().any(|values| !values.is_empty()) {
        let mut query = url.query_pairs_mut();
        for (key, values) in params {
            for value in values {
                query.append_pair(key, value);
            }
        }
    }
    Ok(url.into())
}
