//! Client configuration
//!
//! One `ClientConfig` per client instance. Nothing here is validated: a
//! missing redirect URI or a stale token surfaces only when the remote API
//! rejects the request.

use std::time::Duration;

use common::Secret;
use url::Url;

use crate::constants::{DEFAULT_TIMEOUT_SECS, GRAPH_BASE_URL, OAUTH_BASE_URL};

/// Credentials, OAuth settings and endpoint hosts for a client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Application identifier, sent on authorize and code exchange
    pub client_id: String,
    /// Application secret, sent on code exchange and long-lived exchange
    pub client_secret: Secret<String>,
    /// Must match the redirect URI registered for the app
    pub redirect_uri: Option<String>,
    /// Comma or space delimited permission list, authorize URL only
    pub scope: Option<String>,
    /// Injected into every Graph call as `access_token`
    pub access_token: Option<Secret<String>>,
    pub oauth_base_url: String,
    pub graph_base_url: String,
    /// Applied per request by the default transport
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: Option<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Secret::new(client_secret.into()),
            redirect_uri,
            scope: None,
            access_token: None,
            oauth_base_url: OAUTH_BASE_URL.to_owned(),
            graph_base_url: GRAPH_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(Secret::new(token.into()));
        self
    }

    pub fn with_oauth_base_url(mut self, url: impl Into<String>) -> Self {
        self.oauth_base_url = url.into();
        self
    }

    pub fn with_graph_base_url(mut self, url: impl Into<String>) -> Self {
        self.graph_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Join an OAuth host path, tolerating a trailing slash on the base.
    pub(crate) fn oauth_url(&self, path: &str) -> String {
        join_url(&self.oauth_base_url, path)
    }

    pub(crate) fn graph_url(&self, path: &str) -> String {
        join_url(&self.graph_base_url, path)
    }

    /// Graph URL for caller-supplied ids. Each segment is percent-encoded so
    /// an id cannot inject a query string or extra path components.
    pub(crate) fn graph_resource_url(&self, segments: &[&str]) -> String {
        let Ok(mut url) = Url::parse(&self.graph_base_url) else {
            return join_url(&self.graph_base_url, &segments.join("/"));
        };
        match url.path_segments_mut() {
            Ok(mut path) => {
                path.pop_if_empty().extend(segments);
            }
            Err(()) => return join_url(&self.graph_base_url, &segments.join("/")),
        }
        url.to_string()
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
