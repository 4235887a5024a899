//! Bearer tokens for the cloud services
//!
//! API keys are exchanged for short-lived IAM access tokens. Tokens are cached
//! and reused until shortly before they expire; a rejected token can be
//! discarded with `refresh`, which is what the single-retry policy does.

use crate::{Result, TjBotError};
use parking_lot::Mutex;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Renew this long before the service-reported expiry
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Source of bearer tokens
pub trait TokenProvider {
    /// A valid token, fetching one if the cache is empty or stale
    fn token(&self) -> Result<String>;

    /// Drop any cached token and fetch a fresh one
    fn refresh(&self) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    value: String,
    valid_until: Instant,
}

/// Exchanges an API key for IAM access tokens
pub struct IamAuthenticator {
    api_key: String,
    token_url: String,
    client: reqwest::blocking::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl IamAuthenticator {
    pub fn new(
        api_key: impl Into<String>,
        token_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(TjBotError::Configuration("API key is empty".into()));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TjBotError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            token_url: token_url.into(),
            client,
            cached: Mutex::new(None),
        })
    }

    fn fetch(&self) -> Result<CachedToken> {
        debug!("Requesting IAM token from {}", self.token_url);
        let response = self
            .client
            .post(&self.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", "urn:ibm:params:oauth:grant-type:apikey"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::BAD_REQUEST
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(TjBotError::Auth(format!("API key rejected ({})", status)));
        }
        if !status.is_success() {
            return Err(TjBotError::Service(format!("token endpoint returned {}", status)));
        }

        let body: TokenResponse = response.json()?;
        let lifetime = Duration::from_secs(body.expires_in.unwrap_or(3600));
        info!("Obtained IAM token valid for {}s", lifetime.as_secs());

        Ok(CachedToken {
            value: body.access_token,
            valid_until: Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN),
        })
    }
}

impl TokenProvider for IamAuthenticator {
    fn token(&self) -> Result<String> {
        let mut cached = self.cached.lock();
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.valid_until {
                return Ok(token.value.clone());
            }
            debug!("Cached IAM token is stale");
        }
        let fresh = self.fetch()?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    fn refresh(&self) -> Result<String> {
        self.cached.lock().take();
        self.token()
    }
}

/// Run `call` with a token; on `Auth`, refresh the credential and retry exactly once.
///
/// Every other failure, including a second `Auth`, is returned unchanged.
pub fn with_auth_retry<T, F>(tokens: &dyn TokenProvider, mut call: F) -> Result<T>
where
    F: FnMut(&str) -> Result<T>,
{
    let token = tokens.token()?;
    match call(&token) {
        Err(TjBotError::Auth(reason)) => {
            warn!("Credential rejected ({}), refreshing and retrying once", reason);
            let token = tokens.refresh()?;
            call(&token)
        }
        other => other,
    }
}

/// Map a service response status onto the error taxonomy
pub(crate) fn ensure_success(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response.text().unwrap_or_default();
    let detail = detail.chars().take(200).collect::<String>();
    match status {
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            Err(TjBotError::Auth(format!("{} {}", status, detail)))
        }
        reqwest::StatusCode::REQUEST_TIMEOUT | reqwest::StatusCode::GATEWAY_TIMEOUT => {
            Err(TjBotError::Network(format!("{} {}", status, detail)))
        }
        _ => Err(TjBotError::Service(format!("{} {}", status, detail))),
    }
}
