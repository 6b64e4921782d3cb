//! DVSA MOT History API client.
//!
//! Requests carry both the subscription API key and a bearer token obtained
//! through the OAuth2 client-credentials grant. The token is kept in memory
//! and refreshed shortly before it expires.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

use super::{build_http_client, SourceError, VehicleDataSource};
use crate::config::MotConfig;
use crate::models::MotVehicle;

/// Refresh tokens this long before the issuer says they expire
const TOKEN_EXPIRY_SKEW: Duration = Duration::from_secs(60);

/// Lifetime assumed when the token endpoint omits `expires_in`
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

#[derive(Debug)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// MOT History API client
pub struct MotClient {
    client: reqwest::Client,
    api_key: String,
    base_url: Url,
    client_id: String,
    client_secret: String,
    token_url: String,
    scope: String,
    token: Mutex<Option<CachedToken>>,
}

impl MotClient {
    /// Creates a client from configuration; fails if the base URL is invalid
    pub fn new(config: &MotConfig) -> Result<Self, url::ParseError> {
        Ok(Self {
            client: build_http_client(config.timeout),
            api_key: config.api_key.clone(),
            base_url: Url::parse(&config.base_url)?,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token_url: config.token_url.clone(),
            scope: config.scope.clone(),
            token: Mutex::new(None),
        })
    }

    /// `{base}/registration/{registration}`, with the registration
    /// percent-encoded as a single path segment
    fn vehicle_url(&self, registration: &str) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::Request("MOT base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .push("registration")
            .push(registration);
        Ok(url)
    }

    /// Returns a valid bearer token, requesting a new one when needed
    async fn access_token(&self) -> Result<String, SourceError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Auth(format!(
                "token endpoint returned HTTP {}",
                response.status().as_u16()
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| {
                SourceError::Auth(format!("invalid token response: {}", e.without_url()))
            })?;

        let lifetime = body
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME)
            .saturating_sub(TOKEN_EXPIRY_SKEW);

        log::debug!("Obtained MOT API access token (valid for {}s)", lifetime.as_secs());

        *cached = Some(CachedToken {
            value: body.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(body.access_token)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }
}

#[async_trait]
impl VehicleDataSource for MotClient {
    type Record = MotVehicle;

    async fn fetch(&self, registration: &str) -> Result<MotVehicle, SourceError> {
        let url = self.vehicle_url(registration)?;
        let token = self.access_token().await?;

        let response = self
            .client
            .get(url)
            .header("X-API-Key", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Token was revoked or expired early; the next lookup fetches a new one
            self.invalidate_token().await;
            return Err(SourceError::Auth("access token rejected".to_string()));
        }
        if !status.is_success() {
            return Err(SourceError::from_status(status));
        }

        Ok(response.json::<MotVehicle>().await?)
    }
}
