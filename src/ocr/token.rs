use super::types::ServiceAccountKey;
use crate::{Error, Result};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::debug;

const SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

struct CachedToken {
    token: String,
    refresh_at: Instant,
}

/// Exchanges a signed JWT-bearer assertion for an OAuth access token and
/// caches it until shortly before expiry.
pub struct ServiceAccountTokenSource {
    client: reqwest::Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    pub fn new(client: reqwest::Client, key: ServiceAccountKey) -> Result<Self> {
        let encoding_key = key.encoding_key()?;
        Ok(Self {
            client,
            key,
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.token.clone());
            }
        }

        let minted = self.exchange().await?;
        let lifetime = Duration::from_secs(minted.expires_in).saturating_sub(REFRESH_MARGIN);
        debug!(
            "Minted access token for {} (valid {}s)",
            self.key.client_email, minted.expires_in
        );

        *cached = Some(CachedToken {
            token: minted.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });

        Ok(minted.access_token)
    }

    fn assertion(&self) -> Result<String> {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::ocr(format!("System clock is before the Unix epoch: {}", e)))?
            .as_secs();

        let claims = Claims {
            iss: &self.key.client_email,
            scope: SCOPE,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| Error::ocr(format!("Failed to sign token request: {}", e)))
    }

    async fn exchange(&self) -> Result<TokenResponse> {
        let assertion = self.assertion()?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TokenErrorBody>(&body)
                .map(|b| match b.error_description {
                    Some(description) => format!("{}: {}", b.error, description),
                    None => b.error,
                })
                .unwrap_or(body);
            return Err(Error::ocr(format!(
                "Token exchange returned {}: {}",
                status, message
            )));
        }

        Ok(response.json().await?)
    }
}
