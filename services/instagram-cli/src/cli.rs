//! Command-line definition and command dispatch

use std::collections::BTreeMap;

use clap::{Parser, Subcommand};
use instagram_graph::{HttpMethod, InstagramClient};
use serde_json::{Value, json};

#[derive(Parser, Debug)]
#[command(name = "instagram-cli", version)]
#[command(about = "Run one Instagram OAuth or Graph API call and print the JSON response")]
#[command(long_about = "Run one Instagram OAuth or Graph API call and print the JSON response.\n\n\
    Environment Variables:\n  \
    CONFIG_PATH        Config file path (default: instagram-cli.toml)\n  \
    IG_CLIENT_SECRET   App secret (overrides client_secret_file)\n  \
    IG_ACCESS_TOKEN    Access token (overrides access_token_file)\n  \
    LOG_LEVEL          Log filter (falls back to RUST_LOG, then info)")]
pub struct Cli {
    /// Config file path (overrides CONFIG_PATH)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Write Prometheus metrics to stderr after the command
    #[arg(long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// One operation against the API.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the URL the user must visit to grant access
    AuthorizeUrl,
    /// Trade an authorization code for a token
    ExchangeCode { code: String },
    /// Exchange the current token for a long-lived one
    LongLivedToken,
    /// Refresh the current long-lived token
    RefreshToken,
    /// Fetch a user profile
    Profile { user_id: String },
    /// Fetch the token owner's id and username
    Me,
    /// List a user's media
    Media {
        user_id: String,
        /// Comma separated field list
        #[arg(long)]
        fields: Option<String>,
    },
    /// Fetch one image, video or album
    MediaItem {
        media_id: String,
        /// Comma separated field list
        #[arg(long)]
        fields: Option<String>,
    },
    /// Call any endpoint with the access token
    Fetch {
        url: String,
        /// Send parameters as a form body instead of a query string
        #[arg(long)]
        post: bool,
        /// KEY=VALUE parameters
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(format!("expected KEY=VALUE, got: {raw}")),
    }
}

/// Run one command and return the decoded JSON to print.
pub async fn execute(client: &InstagramClient, command: Command) -> instagram_graph::Result<Value> {
    match command {
        Command::AuthorizeUrl => Ok(json!({ "authorization_url": client.build_authorization_url() })),
        Command::ExchangeCode { code } => client
            .exchange_code_for_token(&code)
            .await
            .map(|token| token.into_value()),
        Command::LongLivedToken => client.exchange_for_long_lived_token().await,
        Command::RefreshToken => client.refresh_long_lived_token().await,
        Command::Profile { user_id } => client.get_user_profile(&user_id).await,
        Command::Me => client.get_me().await,
        Command::Media { user_id, fields } => {
            client.get_user_media(&user_id, fields.as_deref()).await
        }
        Command::MediaItem { media_id, fields } => {
            client.get_media(&media_id, fields.as_deref()).await
        }
        Command::Fetch { url, post, params } => {
            let method = if post { HttpMethod::Post } else { HttpMethod::Get };
            let params: BTreeMap<String, String> = params.into_iter().collect();
            client.fetch(&url, params, method).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::{Arc, Mutex};

    use clap::error::ErrorKind;
    use instagram_graph::{ClientConfig, HttpClient, HttpRequest, HttpResponse};

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("instagram-cli").chain(args.iter().copied()))
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = parse(&["me", "--metrics", "--config", "/etc/ig.toml"]).unwrap();
        assert_eq!(cli.command, Command::Me);
        assert!(cli.metrics);
        assert_eq!(cli.config.as_deref(), Some("/etc/ig.toml"));
    }

    #[test]
    fn media_with_fields() {
        let cli = parse(&["media", "123", "--fields", "id,caption"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Media {
                user_id: "123".into(),
                fields: Some("id,caption".into()),
            }
        );
        assert!(!cli.metrics);
        assert!(cli.config.is_none());
    }

    #[test]
    fn fetch_params_and_post() {
        let cli = parse(&[
            "fetch",
            "https://graph.instagram.com/123/media",
            "limit=5",
            "after=QVF=",
            "--post",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Fetch {
                url: "https://graph.instagram.com/123/media".into(),
                post: true,
                params: vec![
                    ("limit".into(), "5".into()),
                    ("after".into(), "QVF=".into()),
                ],
            }
        );
    }

    #[test]
    fn help_and_version_are_not_errors() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert!(!err.use_stderr());

        let err = parse(&["--version"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn usage_errors() {
        assert!(parse(&[]).is_err());
        assert_eq!(
            parse(&["delete-everything"]).unwrap_err().kind(),
            ErrorKind::InvalidSubcommand
        );
        assert_eq!(
            parse(&["exchange-code"]).unwrap_err().kind(),
            ErrorKind::MissingRequiredArgument
        );
        assert_eq!(
            parse(&["me", "extra"]).unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
        assert_eq!(
            parse(&["fetch", "https://graph.instagram.com/me", "novalue"])
                .unwrap_err()
                .kind(),
            ErrorKind::ValueValidation
        );
        assert!(parse(&["profile", "1", "--fields", "id"]).is_err());
        assert!(parse(&["me", "--post"]).is_err());
    }

    struct CannedHttp {
        body: &'static str,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl HttpClient for CannedHttp {
        fn execute(
            &self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = instagram_graph::Result<HttpResponse>> + Send + '_>> {
            self.requests.lock().unwrap().push(request);
            let body = self.body.to_owned();
            Box::pin(async move { Ok(HttpResponse { status: 200, body }) })
        }
    }

    fn client(body: &'static str) -> (InstagramClient, Arc<CannedHttp>) {
        let http = Arc::new(CannedHttp {
            body,
            requests: Mutex::new(Vec::new()),
        });
        let config = ClientConfig::new("app-123", "secret", Some("https://example.com/cb".into()))
            .with_access_token("IGQV-token");
        (InstagramClient::with_http_client(config, http.clone()), http)
    }

    #[tokio::test]
    async fn authorize_url_makes_no_request() {
        let (client, http) = client("{}");
        let value = execute(&client, Command::AuthorizeUrl).await.unwrap();
        let url = value["authorization_url"].as_str().unwrap();
        assert!(url.starts_with("https://api.instagram.com/oauth/authorize?client_id=app-123"));
        assert!(http.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn exchange_code_prints_full_token_object() {
        let (client, _) = client(r#"{"access_token":"abc","user_id":1}"#);
        let value = execute(&client, Command::ExchangeCode { code: "c".into() })
            .await
            .unwrap();
        assert_eq!(value, json!({"access_token": "abc", "user_id": 1}));
    }

    #[tokio::test]
    async fn media_item_dispatches_to_media_endpoint() {
        let (client, http) = client(r#"{"id":"179"}"#);
        execute(
            &client,
            Command::MediaItem {
                media_id: "179".into(),
                fields: Some("id,media_url".into()),
            },
        )
        .await
        .unwrap();

        let requests = http.requests.lock().unwrap();
        assert!(requests[0].url.starts_with("https://graph.instagram.com/179?"));
        assert!(requests[0].url.contains("fields=id%2Cmedia_url"));
    }

    #[tokio::test]
    async fn fetch_post_sends_params_as_form() {
        let (client, http) = client(r#"{"success":true}"#);
        execute(
            &client,
            Command::Fetch {
                url: "https://graph.instagram.com/179".into(),
                post: true,
                params: vec![("comment_enabled".into(), "false".into())],
            },
        )
        .await
        .unwrap();

        let requests = http.requests.lock().unwrap();
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert!(
            requests[0]
                .form
                .contains(&("comment_enabled".to_owned(), "false".to_owned()))
        );
    }
}
