use reqwest::Client;
use serde::Serialize;

pub const DEFAULT_USERNAME: &str = "Notification-Bot";
const ICON_EMOJI: &str = ":smile_cat:";

#[derive(Debug, thiserror::Error)]
pub enum SlackError {
    #[error("Slack request failed: {0}")]
    Http(String),
    #[error("Slack rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
    username: &'a str,
    icon_emoji: &'a str,
    /// Turns `@name` / `#channel` into real links.
    link_names: u8,
}

/// Posts plain-text notifications to a Slack incoming webhook.
pub struct SlackWebhook {
    client: Client,
    webhook_url: String,
}

impl SlackWebhook {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            webhook_url: webhook_url.into(),
        }
    }

    pub async fn post(&self, text: &str, username: Option<&str>) -> Result<(), SlackError> {
        let payload = WebhookPayload {
            text,
            username: username.unwrap_or(DEFAULT_USERNAME),
            icon_emoji: ICON_EMOJI,
            link_names: 1,
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SlackError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SlackError::Rejected { status, body });
        }

        tracing::info!("Posted Slack notification as {}", payload.username);
        Ok(())
    }
}
