//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! The client secret and access token come from IG_CLIENT_SECRET /
//! IG_ACCESS_TOKEN or from files named in the config, never from the TOML
//! itself.

use std::path::{Path, PathBuf};
use std::time::Duration;

use common::{Secret, resolve_secret};
use instagram_graph::ClientConfig;
use instagram_graph::constants::{DEFAULT_TIMEOUT_SECS, GRAPH_BASE_URL, OAUTH_BASE_URL};
use serde::Deserialize;

pub const CLIENT_SECRET_ENV: &str = "IG_CLIENT_SECRET";
pub const ACCESS_TOKEN_ENV: &str = "IG_ACCESS_TOKEN";

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub client: ClientSection,
    #[serde(default)]
    pub http: HttpSection,
}

/// App credentials and OAuth settings
#[derive(Debug, Deserialize)]
pub struct ClientSection {
    pub client_id: String,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
    /// Alternative to the IG_CLIENT_SECRET env var
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
    #[serde(skip)]
    pub access_token: Option<Secret<String>>,
    /// Alternative to the IG_ACCESS_TOKEN env var
    #[serde(default)]
    pub access_token_file: Option<PathBuf>,
}

/// Transport settings
#[derive(Debug, Deserialize)]
pub struct HttpSection {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_oauth_base_url")]
    pub oauth_base_url: String,
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            oauth_base_url: default_oauth_base_url(),
            graph_base_url: default_graph_base_url(),
        }
    }
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_oauth_base_url() -> String {
    OAUTH_BASE_URL.to_owned()
}

fn default_graph_base_url() -> String {
    GRAPH_BASE_URL.to_owned()
}

impl Config {
    /// Load configuration from a TOML file, then overlay secrets from the
    /// environment or their files.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        for (name, url) in [
            ("oauth_base_url", &config.http.oauth_base_url),
            ("graph_base_url", &config.http.graph_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(common::Error::Config(format!(
                    "{name} must start with http:// or https://, got: {url}"
                )));
            }
        }

        if config.http.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        config.client.client_secret = resolve_secret(
            CLIENT_SECRET_ENV,
            config.client.client_secret_file.as_deref(),
        )?;
        config.client.access_token = resolve_secret(
            ACCESS_TOKEN_ENV,
            config.client.access_token_file.as_deref(),
        )?;

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("instagram-cli.toml")
    }

    /// Build the library client config. A missing secret becomes an empty
    /// string; only the token endpoints need it.
    pub fn client_config(&self) -> ClientConfig {
        let secret = self
            .client
            .client_secret
            .as_ref()
            .map(|s| s.expose_str().to_owned())
            .unwrap_or_default();

        let mut config = ClientConfig::new(
            self.client.client_id.clone(),
            secret,
            self.client.redirect_uri.clone(),
        )
        .with_oauth_base_url(self.http.oauth_base_url.clone())
        .with_graph_base_url(self.http.graph_base_url.clone())
        .with_timeout(Duration::from_secs(self.http.timeout_secs));

        if let Some(scope) = &self.client.scope {
            config = config.with_scope(scope.clone());
        }
        if let Some(token) = &self.client.access_token {
            config = config.with_access_token(token.expose_str());
        }
        config
    }
}
