// Chatwork infra layer.
// - `chatwork_client.rs` talks to the Chatwork v2 HTTP API.

pub mod chatwork_client;

pub use chatwork_client::ChatworkClient;
