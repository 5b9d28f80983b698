pub mod webdriver_client;

pub use webdriver_client::{BrowserSession, WebDriverClient, WebDriverError, DEFAULT_WEBDRIVER_URL};
