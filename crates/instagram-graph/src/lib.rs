//! Instagram OAuth and Graph API client
//!
//! A thin client over the Instagram authorization endpoints and the Graph
//! API. Each operation builds one request, sends it through an
//! [`HttpClient`], and decodes the body into a `serde_json::Value`.
//! Responses are not mapped onto fixed structs; the provider's schema is
//! open-ended and only the error envelope is inspected by name.
//!
//! ```no_run
//! use instagram_graph::{ClientConfig, InstagramClient};
//!
//! # async fn run() -> instagram_graph::Result<()> {
//! let config = ClientConfig::new("app-id", "app-secret", Some("https://example.com/cb".into()))
//!     .with_scope("user_profile,user_media");
//! let mut client = InstagramClient::new(config)?;
//!
//! println!("visit {}", client.build_authorization_url());
//! let token = client.exchange_code_for_token("code-from-callback").await?;
//! if let Some(access_token) = token.access_token() {
//!     client.set_access_token(access_token);
//! }
//!
//! let media = client.get_user_media("me", Some("id,caption")).await?;
//! if client.is_token_expired_error(&media) {
//!     // re-run the authorization flow
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod http;
pub mod metrics;
pub mod response;

pub use client::InstagramClient;
pub use config::ClientConfig;
pub use constants::TOKEN_EXPIRED_CODE;
pub use error::{Error, Result};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use response::{ApiError, TokenResponse, api_error, check_api_error, is_token_expired_error};
