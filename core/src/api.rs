//! Typed entry point combining the mapper, the transport and the parser.
//!
//! # Design
//! `CanvasApi` owns a `RestClient`, the client configuration and a token.
//! Every method resolves its payload before touching the network, so a
//! model with incomplete metadata fails with `ApiError::Mapping` and no
//! request is sent. Unlike the raw transport, these helpers are strict:
//! a non-2xx response becomes `ApiError::HttpError`.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::client::{RestClient, SimpleRestClient};
use crate::config::{ClientConfig, Timeouts};
use crate::endpoint::build_canvas_url;
use crate::error::ApiError;
use crate::form::{merge_params, to_request_params, RequestParams};
use crate::http::Response;
use crate::model::CanvasModel;
use crate::oauth::OauthToken;
use crate::pagination::PageIterator;
use crate::parser::{parse_to_list, parse_to_object};

pub struct CanvasApi<R = SimpleRestClient> {
    client: R,
    config: ClientConfig,
    token: Arc<dyn OauthToken>,
}

impl<R: RestClient> CanvasApi<R> {
    pub fn new(client: R, config: ClientConfig, token: Arc<dyn OauthToken>) -> Self {
        Self {
            client,
            config,
            token,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn timeouts(&self) -> Timeouts {
        self.config.timeouts()
    }

    pub fn url(&self, path: &str, params: &RequestParams) -> Result<String, ApiError> {
        build_canvas_url(&self.config.base_url, self.config.api_version, path, params)
    }

    /// Like `url`, with the configured `per_page` added.
    pub fn list_url(&self, path: &str, params: &RequestParams) -> Result<String, ApiError> {
        let mut params = params.clone();
        params
            .entry("per_page".to_string())
            .or_insert_with(|| vec![self.config.pagination_page_size.to_string()]);
        self.url(path, &params)
    }

    /// Fetch every page of a list endpoint and parse the items.
    pub fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &RequestParams,
    ) -> Result<Vec<T>, ApiError> {
        let url = self.list_url(path, params)?;
        let pages = PageIterator::new(&self.client, self.token.as_ref(), &url, self.timeouts())
            .map(|page| page.and_then(Response::error_for_status))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(path, pages = pages.len(), "fetched list");
        parse_to_list(&pages)
    }

    /// Fetch a single object.
    pub fn get_one<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &RequestParams,
    ) -> Result<Option<T>, ApiError> {
        let url = self.url(path, params)?;
        let response = self
            .client
            .api_get(self.token.as_ref(), &url, self.timeouts())?
            .error_for_status()?;
        parse_to_object(&response)
    }

    /// POST the model as `{"<object key>": {...}}`.
    pub fn create_json<M: CanvasModel, T: DeserializeOwned>(
        &self,
        path: &str,
        model: &M,
    ) -> Result<Option<T>, ApiError> {
        let json = json_body(model)?;
        let url = self.url(path, &RequestParams::new())?;
        let response = self
            .client
            .json_post(self.token.as_ref(), &url, &json, self.timeouts())?
            .error_for_status()?;
        parse_to_object(&response)
    }

    /// PUT the model as `{"<object key>": {...}}`.
    pub fn update_json<M: CanvasModel, T: DeserializeOwned>(
        &self,
        path: &str,
        model: &M,
    ) -> Result<Option<T>, ApiError> {
        let json = json_body(model)?;
        let url = self.url(path, &RequestParams::new())?;
        let response = self
            .client
            .json_put(self.token.as_ref(), &url, &json, self.timeouts())?
            .error_for_status()?;
        parse_to_object(&response)
    }

    /// POST the model's form parameters plus `extra`.
    pub fn post_form<M: CanvasModel, T: DeserializeOwned>(
        &self,
        path: &str,
        model: &M,
        extra: RequestParams,
    ) -> Result<Option<T>, ApiError> {
        let params = form_body(model, extra)?;
        let url = self.url(path, &RequestParams::new())?;
        let response = self
            .client
            .api_post(self.token.as_ref(), &url, &params, self.timeouts())?
            .error_for_status()?;
        parse_to_object(&response)
    }

    /// PUT the model's form parameters plus `extra`.
    pub fn put_form<M: CanvasModel, T: DeserializeOwned>(
        &self,
        path: &str,
        model: &M,
        extra: RequestParams,
    ) -> Result<Option<T>, ApiError> {
        let params = form_body(model, extra)?;
        let url = self.url(path, &RequestParams::new())?;
        let response = self
            .client
            .api_put(self.token.as_ref(), &url, &params, self.timeouts())?
            .error_for_status()?;
        parse_to_object(&response)
    }

    /// DELETE with optional form parameters in the body.
    pub fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &RequestParams,
    ) -> Result<Option<T>, ApiError> {
        let url = self.url(path, &RequestParams::new())?;
        let response = self
            .client
            .api_delete(self.token.as_ref(), &url, params, self.timeouts())?
            .error_for_status()?;
        parse_to_object(&response)
    }
}

fn json_body<M: CanvasModel>(model: &M) -> Result<String, ApiError> {
    let document = model.to_json_object()?;
    serde_json::to_string(&document).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn form_body<M: CanvasModel>(model: &M, extra: RequestParams) -> Result<RequestParams, ApiError> {
    let mut params = to_request_params(&model.to_post_map()?);
    merge_params(&mut params, extra);
    Ok(params)
}
