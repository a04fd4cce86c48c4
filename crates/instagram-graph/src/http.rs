//! HTTP transport seam
//!
//! The client builds fully-formed requests and hands them to an `HttpClient`.
//! `ReqwestHttpClient` is the production transport; tests substitute a spy.
//! A non-2xx status is not a transport failure: Graph API errors arrive as
//! JSON bodies on 4xx responses and are decoded like any other body.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Error, Result};
use crate::metrics;

/// HTTP verb for an outbound call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// A fully built request.
///
/// For `Get` the URL already carries the query string and `form` is empty.
/// For `Post` the URL has no query and `form` holds the body pairs in order.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub form: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            form: Vec::new(),
        }
    }

    pub fn post(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            form,
        }
    }

    /// URL with the query string removed, safe to log.
    pub fn redacted_url(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }
}

/// Raw response: status code plus the full body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Abstraction over the HTTP transport.
///
/// Uses a `Pin<Box<dyn Future>>` return type for dyn-compatibility
/// (`Arc<dyn HttpClient>`).
pub trait HttpClient: Send + Sync {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + '_>>;
}

/// Production transport backed by `reqwest`.
#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Build a transport whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(format!("building HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an already configured `reqwest::Client`.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + '_>> {
        Box::pin(async move {
            let method = request.method;
            debug!(method = method.as_str(), url = request.redacted_url(), "sending request");

            let builder = match method {
                HttpMethod::Get => self.client.get(&request.url),
                HttpMethod::Post => self.client.post(&request.url).form(&request.form),
            };

            let started = Instant::now();
            // without_url() keeps the access_token query parameter out of messages
            let response = builder.send().await.map_err(|e| {
                metrics::record_transport_error(classify(&e));
                Error::Transport(format!(
                    "{} {} failed: {}",
                    method.as_str(),
                    request.redacted_url(),
                    e.without_url()
                ))
            })?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| {
                metrics::record_transport_error(classify(&e));
                Error::Transport(format!("reading response body: {}", e.without_url()))
            })?;

            metrics::record_request(method.as_str(), status, started.elapsed().as_secs_f64());
            debug!(method = method.as_str(), status, bytes = body.len(), "received response");

            Ok(HttpResponse { status, body })
        })
    }
}

fn classify(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connect"
    } else {
        "other"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_wire_names() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
        assert_eq!(HttpMethod::default(), HttpMethod::Get);
    }

    #[test]
    fn redacted_url_drops_query() {
        let request = HttpRequest::get("https://graph.instagram.com/me?fields=id&access_token=IGQV");
        assert_eq!(request.redacted_url(), "https://graph.instagram.com/me");

        let request = HttpRequest::post("https://api.instagram.com/oauth/access_token", vec![]);
        assert_eq!(
            request.redacted_url(),
            "https://api.instagram.com/oauth/access_token"
        );
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        // Port 9 (discard) on localhost is closed in test environments
        let transport = ReqwestHttpClient::new(Duration::from_secs(2)).unwrap();
        let result = transport
            .execute(HttpRequest::get("http://127.0.0.1:9/me?access_token=IGQV-secret"))
            .await;

        match result {
            Err(Error::Transport(msg)) => {
                assert!(!msg.contains("IGQV-secret"), "token leaked into error: {msg}");
            }
            Err(other) => panic!("expected Transport error, got {other:?}"),
            Ok(response) => panic!("expected failure, got status {}", response.status),
        }
    }
}
