//! Instagram API client
//!
//! Every operation maps to at most one HTTP request and one JSON decode.
//! The client never retries, caches or refreshes tokens on its own; the
//! caller drives the flow:
//!
//! 1. Send the user to `build_authorization_url()`
//! 2. Trade the returned code with `exchange_code_for_token()`
//! 3. Store the token with `set_access_token()`
//! 4. Optionally upgrade via `exchange_for_long_lived_token()` and keep it
//!    alive with `refresh_long_lived_token()`
//! 5. Read profile and media through the Graph calls
//!
//! Setters take `&mut self`, so the config cannot change while a request
//! borrowed from the same client is in flight. Wrap the client in a lock to
//! share it across tasks.

use std::collections::BTreeMap;
use std::sync::Arc;

use common::Secret;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::{Url, form_urlencoded};

use crate::config::ClientConfig;
use crate::constants::*;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::response::{self, TokenResponse};

/// Client for the Instagram OAuth and Graph endpoints.
#[derive(Clone)]
pub struct InstagramClient {
    config: ClientConfig,
    http: Arc<dyn HttpClient>,
}

impl InstagramClient {
    /// Create a client backed by `reqwest`, using the config's timeout.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = ReqwestHttpClient::new(config.timeout)?;
        Ok(Self::with_http_client(config, Arc::new(http)))
    }

    /// Create a client over a caller-supplied transport.
    pub fn with_http_client(config: ClientConfig, http: Arc<dyn HttpClient>) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn set_client_id(&mut self, client_id: impl Into<String>) {
        self.config.client_id = client_id.into();
    }

    pub fn set_client_secret(&mut self, client_secret: impl Into<String>) {
        self.config.client_secret = Secret::new(client_secret.into());
    }

    pub fn set_redirect_uri(&mut self, redirect_uri: impl Into<String>) {
        self.config.redirect_uri = Some(redirect_uri.into());
    }

    pub fn set_scope(&mut self, scope: impl Into<String>) {
        self.config.scope = Some(scope.into());
    }

    /// Token injected into every subsequent Graph call.
    pub fn set_access_token(&mut self, access_token: impl Into<String>) {
        self.config.access_token = Some(Secret::new(access_token.into()));
    }

    /// Build the URL the user visits to grant access. No network call.
    ///
    /// Always carries exactly `client_id`, `scope`, `response_type=code` and
    /// `redirect_uri`; unset optional fields are sent as empty values.
    pub fn build_authorization_url(&self) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(PARAM_CLIENT_ID, &self.config.client_id)
            .append_pair(PARAM_SCOPE, self.config.scope.as_deref().unwrap_or_default())
            .append_pair(PARAM_RESPONSE_TYPE, "code")
            .append_pair(
                PARAM_REDIRECT_URI,
                self.config.redirect_uri.as_deref().unwrap_or_default(),
            )
            .finish();
        format!("{}?{}", self.config.oauth_url(AUTHORIZE_PATH), query)
    }

    /// Exchange an authorization code for an access token.
    ///
    /// An empty code is rejected before any request is made. The body must
    /// decode to a non-empty JSON object; OAuth error objects are returned
    /// as-is for the caller to inspect.
    #[instrument(skip_all)]
    pub async fn exchange_code_for_token(&self, code: &str) -> Result<TokenResponse> {
        if code.trim().is_empty() {
            return Err(Error::InvalidArgument("authorization code is empty".into()));
        }

        let form = vec![
            (PARAM_CLIENT_ID.to_owned(), self.config.client_id.clone()),
            (
                PARAM_CLIENT_SECRET.to_owned(),
                self.config.client_secret.expose_str().to_owned(),
            ),
            (PARAM_GRANT_TYPE.to_owned(), GRANT_AUTHORIZATION_CODE.to_owned()),
            (PARAM_CODE.to_owned(), code.to_owned()),
            (
                PARAM_REDIRECT_URI.to_owned(),
                self.config.redirect_uri.clone().unwrap_or_default(),
            ),
        ];

        let request = HttpRequest::post(self.config.oauth_url(ACCESS_TOKEN_PATH), form);
        let response = self.http.execute(request).await?;
        let status = response.status;

        match decode(response)? {
            Value::Object(fields) if !fields.is_empty() => {
                let token = TokenResponse::new(fields);
                if token.access_token().is_some() {
                    info!(user_id = ?token.user_id(), "authorization code exchanged");
                } else {
                    warn!(status, "token endpoint response carries no access_token");
                }
                Ok(token)
            }
            other => {
                warn!(status, "token endpoint returned an empty or non-object body");
                Err(Error::TokenExchange(format!(
                    "token endpoint returned {status} with {}",
                    describe(&other)
                )))
            }
        }
    }

    /// Trade the current short-lived token for a long-lived one.
    pub async fn exchange_for_long_lived_token(&self) -> Result<Value> {
        let params = BTreeMap::from([
            (PARAM_GRANT_TYPE.to_owned(), GRANT_EXCHANGE_TOKEN.to_owned()),
            (
                PARAM_CLIENT_SECRET.to_owned(),
                self.config.client_secret.expose_str().to_owned(),
            ),
        ]);
        self.fetch(
            &self.config.graph_url(LONG_LIVED_TOKEN_PATH),
            params,
            HttpMethod::Get,
        )
        .await
    }

    /// Refresh the current long-lived token before it expires.
    pub async fn refresh_long_lived_token(&self) -> Result<Value> {
        let params = BTreeMap::from([(
            PARAM_GRANT_TYPE.to_owned(),
            GRANT_REFRESH_TOKEN.to_owned(),
        )]);
        self.fetch(
            &self.config.graph_url(REFRESH_TOKEN_PATH),
            params,
            HttpMethod::Get,
        )
        .await
    }

    /// Fetch a user profile with the standard field list.
    pub async fn get_user_profile(&self, user_id: &str) -> Result<Value> {
        let params = BTreeMap::from([(PARAM_FIELDS.to_owned(), USER_PROFILE_FIELDS.to_owned())]);
        self.fetch(&self.config.graph_resource_url(&[user_id]), params, HttpMethod::Get)
            .await
    }

    /// Fetch the token owner's profile through the `/me` alias.
    pub async fn get_me(&self) -> Result<Value> {
        let params = BTreeMap::from([(PARAM_FIELDS.to_owned(), ME_FIELDS.to_owned())]);
        self.fetch(&self.config.graph_url("me"), params, HttpMethod::Get)
            .await
    }

    /// List a user's media. `fields` is sent only when non-empty.
    pub async fn get_user_media(&self, user_id: &str, fields: Option<&str>) -> Result<Value> {
        let url = self.config.graph_resource_url(&[user_id, "media"]);
        self.fetch(&url, fields_param(fields), HttpMethod::Get)
            .await
    }

    /// Fetch one image, video or album. `fields` is sent only when non-empty.
    pub async fn get_media(&self, media_id: &str, fields: Option<&str>) -> Result<Value> {
        self.fetch(
            &self.config.graph_resource_url(&[media_id]),
            fields_param(fields),
            HttpMethod::Get,
        )
        .await
    }

    /// Call an endpoint with the current access token and decode the body.
    ///
    /// `access_token` is always set from the config, replacing any value the
    /// caller supplied. GET sends the parameters as a query string, POST as a
    /// form body. Error payloads come back as ordinary values; a body that is
    /// not JSON fails with `MalformedResponse`.
    #[instrument(skip_all, fields(method = method.as_str()))]
    pub async fn fetch(
        &self,
        url: &str,
        mut params: BTreeMap<String, String>,
        method: HttpMethod,
    ) -> Result<Value> {
        let token = match &self.config.access_token {
            Some(token) => token.expose_str().to_owned(),
            None => {
                warn!("no access token set, sending an empty access_token");
                String::new()
            }
        };
        params.insert(PARAM_ACCESS_TOKEN.to_owned(), token);

        let request = match method {
            HttpMethod::Get => HttpRequest::get(with_query(url, params)),
            HttpMethod::Post => HttpRequest::post(url, params.into_iter().collect()),
        };

        let response = self.http.execute(request).await?;
        let value = decode(response)?;
        if response::is_token_expired_error(&value) {
            debug!("response reports an expired access token");
        }
        Ok(value)
    }

    /// Whether a decoded response reports an expired access token.
    pub fn is_token_expired_error(&self, response: &Value) -> bool {
        response::is_token_expired_error(response)
    }
}

/// Merge `params` into any query string already on `url`. Keys in `params`
/// replace existing ones, so each key appears once.
fn with_query(url: &str, params: BTreeMap<String, String>) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish();
        return format!("{url}?{query}");
    };

    let mut merged: BTreeMap<String, String> = parsed.query_pairs().into_owned().collect();
    merged.extend(params);
    parsed.query_pairs_mut().clear().extend_pairs(merged.iter());
    parsed.to_string()
}

fn fields_param(fields: Option<&str>) -> BTreeMap<String, String> {
    match fields.filter(|f| !f.is_empty()) {
        Some(fields) => BTreeMap::from([(PARAM_FIELDS.to_owned(), fields.to_owned())]),
        None => BTreeMap::new(),
    }
}

fn decode(response: HttpResponse) -> Result<Value> {
    if response.body.trim().is_empty() {
        return Err(Error::MalformedResponse(format!(
            "empty response body (status {})",
            response.status
        )));
    }
    serde_json::from_str(&response.body).map_err(|e| {
        Error::MalformedResponse(format!("invalid JSON (status {}): {e}", response.status))
    })
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(items) if items.is_empty() => "an empty array",
        Value::Array(_) => "an array",
        Value::Object(_) => "an empty object",
    }
}
