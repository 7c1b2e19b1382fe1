//! Blocking REST transport for the Canvas API.
//!
//! # Design
//! `RestClient` is the seam between request building and the network: the
//! higher-level API and the pagination iterator only ever see the trait, so
//! tests swap in a scripted implementation.
//!
//! `SimpleRestClient` keeps one pooled `ureq::Agent` for GET requests,
//! shared by every clone and safe to use from many threads. Writes build a
//! fresh agent per call. Agents are configured with
//! `http_status_as_error(false)` so status classification happens here:
//!
//! - 401 with `WWW-Authenticate` is `ApiError::InvalidOauthToken`
//! - 401 without it is `ApiError::Unauthorized`
//! - every other status is returned as a `Response`; non-2xx is logged at
//!   `warn` together with the body
//!
//! Connections and response bodies are owned values dropped on every exit
//! path, so an early `?` cannot leak them. Nothing is retried.

use std::fmt;
use std::time::Instant;

use ureq::http::header::{AUTHORIZATION, LINK, WWW_AUTHENTICATE};
use ureq::typestate::WithBody;
use ureq::{Agent, Body, RequestBuilder};

use crate::config::Timeouts;
use crate::error::ApiError;
use crate::form::RequestParams;
use crate::http::{HttpMethod, Response};
use crate::oauth::{bearer, OauthToken};
use crate::pagination::parse_next_link;

/// One operation per HTTP verb the Canvas API uses.
pub trait RestClient: Send + Sync {
    /// GET `url`, capturing the `rel="next"` pagination link if present.
    fn api_get(
        &self,
        token: &dyn OauthToken,
        url: &str,
        timeouts: Timeouts,
    ) -> Result<Response, ApiError>;

    /// POST a raw JSON document.
    fn json_post(
        &self,
        token: &dyn OauthToken,
        url: &str,
        json: &str,
        timeouts: Timeouts,
    ) -> Result<Response, ApiError>;

    /// PUT a raw JSON document.
    fn json_put(
        &self,
        token: &dyn OauthToken,
        url: &str,
        json: &str,
        timeouts: Timeouts,
    ) -> Result<Response, ApiError>;

    /// POST form-encoded parameters.
    fn api_post(
        &self,
        token: &dyn OauthToken,
        url: &str,
        params: &RequestParams,
        timeouts: Timeouts,
    ) -> Result<Response, ApiError>;

    /// PUT form-encoded parameters.
    fn api_put(
        &self,
        token: &dyn OauthToken,
        url: &str,
        params: &RequestParams,
        timeouts: Timeouts,
    ) -> Result<Response, ApiError>;

    /// DELETE with a form-encoded body. A few Canvas endpoints (e.g.
    /// concluding an enrollment) read their options from the body.
    fn api_delete(
        &self,
        token: &dyn OauthToken,
        url: &str,
        params: &RequestParams,
        timeouts: Timeouts,
    ) -> Result<Response, ApiError>;
}

/// Classify a 401 before the body is read.
pub fn check_authentication(status: u16, has_challenge: bool) -> Result<(), ApiError> {
    if status != 401 {
        return Ok(());
    }
    // See https://canvas.instructure.com/doc/api/file.oauth.html#storing-access-tokens
    if has_challenge {
        return Err(ApiError::InvalidOauthToken);
    }
    tracing::error!("user is not authorized to perform this action");
    Err(ApiError::Unauthorized)
}

/// `RestClient` backed by ureq.
#[derive(Clone)]
pub struct SimpleRestClient {
    pool: Agent,
}

impl SimpleRestClient {
    pub fn new() -> Self {
        let pool = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { pool }
    }

    fn send_json(
        &self,
        method: WriteMethod,
        token: &dyn OauthToken,
        url: &str,
        json: &str,
        timeouts: Timeouts,
    ) -> Result<Response, ApiError> {
        tracing::debug!(method = %method.http(), url, "sending JSON request");
        let started = Instant::now();
        let agent = per_call_agent(timeouts);
        let response = method
            .request(&agent, url)
            .header(AUTHORIZATION, bearer(token))
            .content_type("application/json")
            .send(json)?;
        read_response(method.http(), url, response, started)
    }

    fn send_form(
        &self,
        method: WriteMethod,
        token: &dyn OauthToken,
        url: &str,
        params: &RequestParams,
        timeouts: Timeouts,
    ) -> Result<Response, ApiError> {
        tracing::debug!(method = %method.http(), url, "sending API request");
        let started = Instant::now();
        let agent = per_call_agent(timeouts);
        // Values may hold credentials (e.g. `login[password]`); never log them.
        let pairs = params
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |value| (key.as_str(), value.as_str())));
        let response = method
            .request(&agent, url)
            .header(AUTHORIZATION, bearer(token))
            .send_form(pairs)?;
        read_response(method.http(), url, response, started)
    }
}

impl Default for SimpleRestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SimpleRestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleRestClient").finish_non_exhaustive()
    }
}

impl RestClient for SimpleRestClient {
    fn api_get(
        &self,
        token: &dyn OauthToken,
        url: &str,
        timeouts: Timeouts,
    ) -> Result<Response, ApiError> {
        tracing::debug!(url, "sending GET request");
        let started = Instant::now();
        let response = self
            .pool
            .get(url)
            .header(AUTHORIZATION, bearer(token))
            .config()
            .timeout_connect(Some(timeouts.connect))
            .timeout_recv_response(Some(timeouts.read))
            .timeout_recv_body(Some(timeouts.read))
            .build()
            .call()?;
        read_response(HttpMethod::Get, url, response, started)
    }

    fn json_post(
        &self,
        token: &dyn OauthToken,
        url: &str,
        json: &str,
        timeouts: Timeouts,
    ) -> Result<Response, ApiError> {
        self.send_json(WriteMethod::Post, token, url, json, timeouts)
    }

    fn json_put(
        &self,
        token: &dyn OauthToken,
        url: &str,
        json: &str,
        timeouts: Timeouts,
    ) -> Result<Response, ApiError> {
        self.send_json(WriteMethod::Put, token, url, json, timeouts)
    }

    fn api_post(
        &self,
        token: &dyn OauthToken,
        url: &str,
        params: &RequestParams,
        timeouts: Timeouts,
    ) -> Result<Response, ApiError> {
        self.send_form(WriteMethod::Post, token, url, params, timeouts)
    }

    fn api_put(
        &self,
        token: &dyn OauthToken,
        url: &str,
        params: &RequestParams,
        timeouts: Timeouts,
    ) -> Result<Response, ApiError> {
        self.send_form(WriteMethod::Put, token, url, params, timeouts)
    }

    fn api_delete(
        &self,
        token: &dyn OauthToken,
        url: &str,
        params: &RequestParams,
        timeouts: Timeouts,
    ) -> Result<Response, ApiError> {
        self.send_form(WriteMethod::Delete, token, url, params, timeouts)
    }
}

/// Verbs that carry a request body.
#[derive(Debug, Clone, Copy)]
enum WriteMethod {
    Post,
    Put,
    Delete,
}

impl WriteMethod {
    fn http(self) -> HttpMethod {
        match self {
            WriteMethod::Post => HttpMethod::Post,
            WriteMethod::Put => HttpMethod::Put,
            WriteMethod::Delete => HttpMethod::Delete,
        }
    }

    fn request(self, agent: &Agent, url: &str) -> RequestBuilder<WithBody> {
        match self {
            WriteMethod::Post => agent.post(url),
            WriteMethod::Put => agent.put(url),
            // The method stays DELETE on the wire; only the body rules change.
            WriteMethod::Delete => agent.delete(url).force_send_body(),
        }
    }
}

fn per_call_agent(timeouts: Timeouts) -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .timeout_connect(Some(timeouts.connect))
        .timeout_recv_response(Some(timeouts.read))
        .timeout_recv_body(Some(timeouts.read))
        .build()
        .new_agent()
}

fn read_response(
    method: HttpMethod,
    url: &str,
    mut response: ureq::http::Response<Body>,
    started: Instant,
) -> Result<Response, ApiError> {
    let status = response.status().as_u16();
    check_authentication(status, response.headers().contains_key(WWW_AUTHENTICATE))?;

    let body = response.body_mut().read_to_string()?;
    if !(200..300).contains(&status) {
        tracing::warn!(%method, url, status, body = %body, "Canvas returned an error status");
    }

    let next_link = match method {
        HttpMethod::Get => {
            let links = response
                .headers()
                .get_all(LINK)
                .iter()
                .filter_map(|value| value.to_str().ok());
            parse_next_link(links)
        }
        _ => None,
    };
    if next_link.is_some() {
        tracing::debug!(url, "response has more pages");
    }

    tracing::debug!(
        %method,
        url,
        status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "call completed"
    );
    Ok(Response::new(status, body, next_link))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_on_401_means_bad_token() {
        let err = check_authentication(401, true).unwrap_err();
        assert!(matches!(err, ApiError::InvalidOauthToken));
    }

    #[test]
    fn bare_401_means_missing_permission() {
        let err = check_authentication(401, false).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn other_statuses_pass_authentication_check() {
        for status in [200, 201, 204, 400, 403, 404, 500] {
            assert!(check_authentication(status, true).is_ok(), "{status}");
            assert!(check_authentication(status, false).is_ok(), "{status}");
        }
    }

    #[test]
    fn write_methods_map_to_http_methods() {
        assert_eq!(WriteMethod::Post.http(), HttpMethod::Post);
        assert_eq!(WriteMethod::Put.http(), HttpMethod::Put);
        assert_eq!(WriteMethod::Delete.http(), HttpMethod::Delete);
    }

    #[test]
    fn clients_share_the_get_pool() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SimpleRestClient>();
        let client = SimpleRestClient::new();
        let _clone = client.clone();
    }
}
