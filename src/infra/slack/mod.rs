pub mod webhook_client;

pub use webhook_client::{SlackError, SlackWebhook, DEFAULT_USERNAME};
