use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::{json, Value};

const HEADLESS_ARGS: [&str; 8] = [
    "--headless",
    "--no-sandbox",
    "--disable-gpu",
    "--window-size=1920x1080",
    "--single-process",
    "--disable-dev-shm-usage",
    "--disable-dev-tools",
    "--no-zygote",
];

const LAMBDA_DOWNLOAD_DIR: &str = "/tmp/downloads";
const LOCAL_DOWNLOAD_DIR: &str = "./downloads";

/// Headless Chrome settings for scraping jobs.
///
/// Lambda only allows writes under `/tmp`, so the download directory moves
/// there when running inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserProfile {
    pub args: Vec<String>,
    pub download_dir: PathBuf,
    pub implicit_wait: Duration,
}

impl BrowserProfile {
    pub fn for_environment(is_lambda: bool) -> Self {
        let download_dir = if is_lambda {
            LAMBDA_DOWNLOAD_DIR
        } else {
            LOCAL_DOWNLOAD_DIR
        };
        Self::with_download_dir(download_dir)
    }

    pub fn with_download_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            args: HEADLESS_ARGS.iter().map(|a| a.to_string()).collect(),
            download_dir: dir.as_ref().to_path_buf(),
            implicit_wait: Duration::from_secs(15),
        }
    }

    /// Creates the download directory if it is missing.
    pub async fn prepare(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.download_dir).await
    }

    /// W3C `POST /session` body for chromedriver.
    pub fn capabilities(&self) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": {
                        "args": self.args,
                        "prefs": {
                            "download.default_directory": self.download_dir.to_string_lossy(),
                            "download.prompt_for_download": false,
                        }
                    }
                }
            }
        })
    }

    /// W3C `POST /session/{id}/timeouts` body.
    pub fn timeouts(&self) -> Value {
        json!({ "implicit": self.implicit_wait.as_millis() as u64 })
    }
}
