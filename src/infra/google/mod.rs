// Google infra layer.
// - `auth.rs` turns a service account key into bearer tokens.
// - `drive_client.rs` talks to the Drive v3 HTTP API.
// - `sheets_client.rs` talks to the Sheets v4 HTTP API.

pub mod auth;
pub mod drive_client;
pub mod sheets_client;

pub use auth::{
    AccessTokenProvider, GoogleAuthError, ServiceAccountAuth, StaticToken, DRIVE_SCOPE,
    SPREADSHEETS_SCOPE,
};
pub use drive_client::GoogleDriveClient;
pub use sheets_client::GoogleSheetsClient;

/// Splits a failed response into `(status, body)` for the caller's error type.
pub(crate) async fn failure_parts(response: reqwest::Response) -> (u16, String) {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    (status, body)
}
