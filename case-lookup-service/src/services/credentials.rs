//! Service-account authentication for the Sheets API.
//!
//! Implements the OAuth 2.0 JWT bearer grant: a short-lived RS256 assertion
//! signed with the service account's private key is exchanged at the token
//! URI for an access token. The token is reused until shortly before it
//! expires.

use crate::config::ServiceAccountConfig;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

/// Read-only access to spreadsheets.
pub const SPREADSHEETS_READONLY_SCOPE: &str =
    "https://www.googleapis.com/auth/spreadsheets.readonly";

const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each signed assertion (the maximum Google accepts).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before their reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Invalid service account private key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),

    #[error("Failed to sign token assertion: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("Token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Token endpoint returned {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Claims of the JWT bearer assertion.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

pub struct ServiceAccountAuth {
    client: Client,
    client_email: String,
    private_key_id: String,
    token_uri: String,
    encoding_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    /// Parse the private key up front so a malformed key stops startup.
    pub fn new(config: &ServiceAccountConfig, client: Client) -> Result<Self, CredentialError> {
        let encoding_key =
            EncodingKey::from_rsa_pem(config.private_key.expose_secret().as_bytes())
                .map_err(CredentialError::InvalidKey)?;

        tracing::info!(
            project_id = %config.project_id,
            client_email = %config.client_email,
            "Service account credentials loaded"
        );

        Ok(Self {
            client,
            client_email: config.client_email.clone(),
            private_key_id: config.private_key_id.clone(),
            token_uri: config.token_uri.clone(),
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    /// Return a valid access token, exchanging a fresh assertion when the cached one is stale.
    pub async fn access_token(&self) -> Result<String, CredentialError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.fetch_token().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    /// Build the signed assertion sent to the token endpoint.
    pub fn assertion(&self) -> Result<String, CredentialError> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: SPREADSHEETS_READONLY_SCOPE.to_string(),
            aud: self.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let header = Header {
            kid: Some(self.private_key_id.clone()),
            ..Header::new(Algorithm::RS256)
        };

        encode(&header, &claims, &self.encoding_key).map_err(CredentialError::Signing)
    }

    async fn fetch_token(&self) -> Result<CachedToken, CredentialError> {
        let assertion = self.assertion()?;

        tracing::debug!(token_uri = %self.token_uri, "Requesting access token");

        let response = self
            .client
            .post(&self.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT_TYPE),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Token endpoint rejected assertion");
            return Err(CredentialError::Rejected { status, body });
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(token.expires_in);

        tracing::info!(expires_in = token.expires_in, "Access token obtained");

        Ok(CachedToken {
            access_token: token.access_token,
            refresh_at: Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN),
        })
    }
}
