//! Instagram endpoint and parameter constants
//!
//! Parameter names are dictated by the remote API and must match exactly.

/// Host serving the OAuth authorize page and code exchange
pub const OAUTH_BASE_URL: &str = "https://api.instagram.com";

/// Host serving profile, media and long-lived token endpoints
pub const GRAPH_BASE_URL: &str = "https://graph.instagram.com";

pub const AUTHORIZE_PATH: &str = "/oauth/authorize";
pub const ACCESS_TOKEN_PATH: &str = "/oauth/access_token";
pub const LONG_LIVED_TOKEN_PATH: &str = "/access_token";
pub const REFRESH_TOKEN_PATH: &str = "/refresh_access_token";

/// Profile fields requested by `get_user_profile`
pub const USER_PROFILE_FIELDS: &str = "id,username,account_type,ig_id,media_count";

/// Profile fields requested by the legacy `/me` lookup
pub const ME_FIELDS: &str = "id,username";

pub const GRANT_AUTHORIZATION_CODE: &str = "authorization_code";
pub const GRANT_EXCHANGE_TOKEN: &str = "ig_exchange_token";
pub const GRANT_REFRESH_TOKEN: &str = "ig_refresh_token";

/// Graph API error code for an expired or invalidated access token
pub const TOKEN_EXPIRED_CODE: i64 = 190;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const PARAM_ACCESS_TOKEN: &str = "access_token";
pub const PARAM_CLIENT_ID: &str = "client_id";
pub const PARAM_CLIENT_SECRET: &str = "client_secret";
pub const PARAM_CODE: &str = "code";
pub const PARAM_FIELDS: &str = "fields";
pub const PARAM_GRANT_TYPE: &str = "grant_type";
pub const PARAM_REDIRECT_URI: &str = "redirect_uri";
pub const PARAM_RESPONSE_TYPE: &str = "response_type";
pub const PARAM_SCOPE: &str = "scope";
