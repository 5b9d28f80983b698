pub mod browser_profile;

pub use browser_profile::BrowserProfile;
