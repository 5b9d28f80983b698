use aws_config::{BehaviorVersion, Region};
use aws_sdk_ssm::error::DisplayErrorContext;
use aws_sdk_ssm::Client;

pub const DEFAULT_REGION: &str = "ap-northeast-1";

#[derive(Debug, thiserror::Error)]
pub enum ParameterStoreError {
    #[error("Parameter Store request failed: {0}")]
    Sdk(String),
    #[error("Parameter '{0}' not found")]
    NotFound(String),
}

/// Reads SecureString / String parameters from SSM Parameter Store.
pub struct ParameterStore {
    client: Client,
    region: String,
}

impl ParameterStore {
    /// Loads credentials from the default provider chain for `region`.
    pub async fn new(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self {
            client: Client::new(&config),
            region: region.to_string(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Returns the decrypted value of `key`.
    pub async fn get(&self, key: &str) -> Result<String, ParameterStoreError> {
        tracing::debug!("Fetching parameter {} from {}", key, self.region);

        let output = self
            .client
            .get_parameters()
            .names(key)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| ParameterStoreError::Sdk(DisplayErrorContext(&e).to_string()))?;

        first_value(output.parameters().iter().map(|p| p.value()), key)
    }
}

fn first_value<'a>(
    values: impl IntoIterator<Item = Option<&'a str>>,
    key: &str,
) -> Result<String, ParameterStoreError> {
    values
        .into_iter()
        .flatten()
        .next()
        .map(str::to_string)
        .ok_or_else(|| ParameterStoreError::NotFound(key.to_string()))
}
