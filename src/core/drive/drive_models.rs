use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// File or folder as returned by a listing call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveItem {
    pub id: String,
    pub name: String,
}

/// How long to wait for a rename to become visible.
///
/// Drive applies metadata updates asynchronously, so a read straight after the
/// update can still see the old name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenamePolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for RenamePolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            interval: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Drive request failed: {0}")]
    Http(String),
    #[error("Drive API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Drive response missing field '{0}'")]
    MissingField(&'static str),
    #[error("File I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Rename of file {file_id} to '{name}' not visible after {attempts} checks")]
    RenameTimeout {
        file_id: String,
        name: String,
        attempts: u32,
    },
}
