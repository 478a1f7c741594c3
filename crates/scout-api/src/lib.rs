use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};
use scout_config::ApiConfig;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP 401. Not retryable; the whole run must abort.
    #[error("authentication failed: verify the provided credentials")]
    AuthenticationFailed,
    /// HTTP 429. Not retryable within a run, but distinct from hard
    /// failures so operators can tell quota exhaustion apart.
    #[error("api request limit exceeded")]
    RateLimited,
    #[error("api returned status {status}: {body}")]
    Remote { status: u16, body: String },
    #[error("transport failure while calling api: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("unexpected api failure: {0}")]
    Unexpected(String),
}

/// Authentication mode, fixed at client construction. Exactly one variant
/// is active per process; callers never observe which.
#[derive(Clone)]
pub enum Credential {
    ApiKey { token: String },
    Basic { username: String, password: String },
}

impl Credential {
    pub fn from_config(cfg: &ApiConfig) -> Self {
        if cfg.auth_type.eq_ignore_ascii_case("basic") {
            debug!("username and password based authentication is selected");
            Credential::Basic {
                username: cfg.username.clone(),
                password: cfg.password.clone(),
            }
        } else {
            debug!("api key based authentication is selected");
            Credential::ApiKey {
                token: cfg.api_key.clone(),
            }
        }
    }
}

#[derive(Clone)]
pub struct ScoutClient {
    base_url: String,
    credential: Credential,
    http: Client,
}

impl ScoutClient {
    pub fn new(cfg: &ApiConfig) -> ApiResult<Self> {
        let timeout = Duration::from_secs_f64(cfg.timeout_seconds.max(1.0));
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| ApiError::Unexpected(format!("failed to construct http client: {err}")))?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            credential: Credential::from_config(cfg),
            http,
        })
    }

    /// Issues one GET against `{base_url}{endpoint}` and returns the JSON
    /// body of a 200 response. Failures are classified per the taxonomy on
    /// [`ApiError`]; nothing is retried here.
    pub async fn call(&self, endpoint: &str, params: &[(&str, &str)]) -> ApiResult<Value> {
        let request_url = format!("{}{}", self.base_url, endpoint);
        let url = Url::parse(&request_url)
            .map_err(|err| ApiError::Unexpected(format!("invalid request url {request_url}: {err}")))?;

        debug!("calling scout api endpoint={endpoint} params={params:?}");

        let mut request = self.http.get(url);
        request = match &self.credential {
            Credential::ApiKey { token } => {
                request.header(AUTHORIZATION, format!("Token: {token}"))
            }
            Credential::Basic { username, password } => {
                request.basic_auth(username.clone(), Some(password.clone()))
            }
        };
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request.send().await.map_err(|err| {
            error!("transport failure for url={request_url}: {err}");
            ApiError::Transport(err)
        })?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED => {
                error!("authentication rejected for url={request_url}; verify the provided credentials");
                return Err(ApiError::AuthenticationFailed);
            }
            StatusCode::TOO_MANY_REQUESTS => {
                error!("scout api limit exceeded for url={request_url}");
                return Err(ApiError::RateLimited);
            }
            _ => {}
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "error while fetching data from url={request_url}, status code: {}, error: {body}",
                status.as_u16()
            );
            return Err(ApiError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|err| ApiError::Unexpected(format!("malformed JSON body: {err}")))
    }
}
