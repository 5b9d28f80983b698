// =============================================================================
// GOOGLE SERVICE ACCOUNT AUTHENTICATION
// =============================================================================
//
// Exchanges a signed JWT for an OAuth2 access token (the "JWT bearer" grant)
// and caches it until shortly before it expires.
//
// **Setup:**
// 1. Create a service account in Google Cloud Console and download a JSON key.
// 2. Share the target Drive folders / spreadsheets with the service account
//    email (looks like: name@project.iam.gserviceaccount.com).
// 3. Set one of:
//    - `GOOGLE_SERVICE_ACCOUNT_KEY` - Path to the JSON key file
//    - `GOOGLE_SERVICE_ACCOUNT_JSON` - The JSON content directly (for deployment)

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Debug, Error)]
pub enum GoogleAuthError {
    #[error("Either service_account_file or service_account_info must be provided.")]
    MissingCredentials,
    #[error("Failed to read service account file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed service account JSON: {0}")]
    InvalidCredentials(#[from] serde_json::Error),
    #[error("Failed to sign token request: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("System clock is before the unix epoch")]
    Clock,
    #[error("Token request failed: {0}")]
    Http(String),
    #[error("Token exchange failed ({status}): {body}")]
    TokenExchange { status: u16, body: String },
}

/// Anything that can hand out a bearer token for Google APIs.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, GoogleAuthError>;
}

/// A token obtained elsewhere (e.g. `gcloud auth print-access-token`).
pub struct StaticToken(pub String);

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, GoogleAuthError> {
        Ok(self.0.clone())
    }
}

/// Service account credentials from the JSON key file.
#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountCredentials {
    /// The service account email (used as issuer in JWT).
    client_email: String,

    /// The private key in PEM format.
    private_key: String,

    /// The token URI (where to exchange JWT for access token).
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// JWT claims for Google OAuth2.
#[derive(Debug, Serialize)]
struct JwtClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: u64,
    /// Max 1 hour from iat.
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    token: String,
    expires_at: SystemTime,
}

/// Authenticator that handles OAuth2 with service account credentials.
///
/// Clones share the token cache.
#[derive(Clone)]
pub struct ServiceAccountAuth {
    credentials: ServiceAccountCredentials,
    scopes: Vec<String>,
    client: Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl ServiceAccountAuth {
    /// Builds from whichever credential source is given, file first.
    pub async fn new(
        service_account_file: Option<&Path>,
        service_account_info: Option<&str>,
        scopes: &[&str],
    ) -> Result<Self, GoogleAuthError> {
        match (service_account_file, service_account_info) {
            (Some(path), _) => Self::from_file(path, scopes).await,
            (None, Some(json)) => Self::from_json(json, scopes),
            (None, None) => Err(GoogleAuthError::MissingCredentials),
        }
    }

    pub async fn from_file(path: &Path, scopes: &[&str]) -> Result<Self, GoogleAuthError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json(&content, scopes)
    }

    pub fn from_json(json: &str, scopes: &[&str]) -> Result<Self, GoogleAuthError> {
        let credentials: ServiceAccountCredentials = serde_json::from_str(json)?;
        Ok(Self {
            credentials,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            client: Client::new(),
            cached_token: Arc::new(RwLock::new(None)),
        })
    }

    /// Reads `GOOGLE_SERVICE_ACCOUNT_KEY`, then `GOOGLE_SERVICE_ACCOUNT_JSON`.
    pub async fn from_env(scopes: &[&str]) -> Result<Self, GoogleAuthError> {
        let path = std::env::var("GOOGLE_SERVICE_ACCOUNT_KEY").ok();
        let json = std::env::var("GOOGLE_SERVICE_ACCOUNT_JSON").ok();
        Self::new(path.as_deref().map(Path::new), json.as_deref(), scopes).await
    }

    pub fn client_email(&self) -> &str {
        &self.credentials.client_email
    }

    /// Gets a valid access token, refreshing if necessary.
    pub async fn get_access_token(&self) -> Result<String, GoogleAuthError> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > SystemTime::now() + Duration::from_secs(60) {
                    return Ok(token.token.clone());
                }
            }
        }

        let (new_token, lifetime) = self.fetch_new_token().await?;

        {
            let mut cached = self.cached_token.write().await;
            *cached = Some(CachedToken {
                token: new_token.clone(),
                expires_at: SystemTime::now() + lifetime,
            });
        }

        Ok(new_token)
    }

    async fn fetch_new_token(&self) -> Result<(String, Duration), GoogleAuthError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| GoogleAuthError::Clock)?
            .as_secs();

        let claims = JwtClaims {
            iss: self.credentials.client_email.clone(),
            scope: self.scopes.join(" "),
            aud: self.credentials.token_uri.clone(),
            iat: now,
            exp: now + 3600,
        };

        let header = Header::new(Algorithm::RS256);
        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())?;
        let jwt = encode(&header, &claims, &key)?;

        tracing::debug!("Requesting Google access token for {}", self.client_email());

        let response = self
            .client
            .post(&self.credentials.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", jwt.as_str())])
            .send()
            .await
            .map_err(|e| GoogleAuthError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleAuthError::TokenExchange { status, body });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| GoogleAuthError::Http(e.to_string()))?;

        // Refresh five minutes early.
        let lifetime = token
            .expires_in
            .map(|secs| Duration::from_secs(secs.saturating_sub(300)))
            .unwrap_or(Duration::from_secs(55 * 60));

        Ok((token.access_token, lifetime))
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountAuth {
    async fn access_token(&self) -> Result<String, GoogleAuthError> {
        self.get_access_token().await
    }
}
