// Minimal W3C WebDriver client: enough to open a configured Chrome session
// against a running chromedriver and hand it to scraping code.

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::browser::BrowserProfile;

pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

#[derive(Debug, thiserror::Error)]
pub enum WebDriverError {
    #[error("Failed to prepare download directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("WebDriver request failed: {0}")]
    Http(String),
    #[error("WebDriver command failed ({error}): {message}")]
    Command { error: String, message: String },
    #[error("WebDriver response missing sessionId")]
    MissingSession,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    value: Value,
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: String,
    #[serde(default)]
    message: String,
}

pub struct WebDriverClient {
    client: Client,
    base_url: String,
}

impl WebDriverClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Creates the download directory, opens a session and applies the
    /// profile's implicit wait.
    pub async fn start_session(
        &self,
        profile: &BrowserProfile,
    ) -> Result<BrowserSession, WebDriverError> {
        profile.prepare().await?;

        let value = execute(
            self.client
                .post(format!("{}/session", self.base_url))
                .json(&profile.capabilities()),
        )
        .await?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or(WebDriverError::MissingSession)?
            .to_string();

        let session = BrowserSession {
            client: self.client.clone(),
            url: format!("{}/session/{}", self.base_url, session_id),
            session_id,
        };
        let applied = execute(
            self.client
                .post(format!("{}/timeouts", session.url))
                .json(&profile.timeouts()),
        )
        .await;
        if let Err(e) = applied {
            // The browser is already running; shut it down before bailing out.
            let id = session.session_id.clone();
            if let Err(close_err) = session.close().await {
                tracing::warn!("Failed to close WebDriver session {}: {}", id, close_err);
            }
            return Err(e);
        }

        tracing::info!(
            "Started WebDriver session {} (downloads in {})",
            session.session_id,
            profile.download_dir.display()
        );
        Ok(session)
    }
}

/// An open browser session. Call [`BrowserSession::close`] when done; dropping
/// it leaves the browser running.
pub struct BrowserSession {
    client: Client,
    session_id: String,
    url: String,
}

impl BrowserSession {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn navigate(&self, url: &str) -> Result<(), WebDriverError> {
        execute(
            self.client
                .post(format!("{}/url", self.url))
                .json(&json!({ "url": url })),
        )
        .await?;
        Ok(())
    }

    pub async fn current_url(&self) -> Result<String, WebDriverError> {
        let value = execute(self.client.get(format!("{}/url", self.url))).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    pub async fn close(self) -> Result<(), WebDriverError> {
        execute(self.client.delete(&self.url)).await?;
        tracing::info!("Closed WebDriver session {}", self.session_id);
        Ok(())
    }
}

/// Sends a command and unwraps the `{"value": ...}` envelope.
async fn execute(request: RequestBuilder) -> Result<Value, WebDriverError> {
    let response = request
        .send()
        .await
        .map_err(|e| WebDriverError::Http(e.to_string()))?;
    let status = response.status();
    let wire: WireResponse = response
        .json()
        .await
        .map_err(|e| WebDriverError::Http(e.to_string()))?;

    if !status.is_success() {
        let err: WireError =
            serde_json::from_value(wire.value).unwrap_or_else(|_| WireError {
                error: "unknown error".to_string(),
                message: format!("HTTP {}", status),
            });
        return Err(WebDriverError::Command {
            error: err.error,
            message: err.message,
        });
    }
    Ok(wire.value)
}
