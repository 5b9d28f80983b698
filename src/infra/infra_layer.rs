// The infra module contains implementations of core traits.
// Each external service gets its own submodule.

#[path = "google/mod.rs"]
pub mod google;

#[path = "chatwork/mod.rs"]
pub mod chatwork;

#[path = "slack/mod.rs"]
pub mod slack;

#[path = "aws/mod.rs"]
pub mod aws;

#[path = "webdriver/mod.rs"]
pub mod webdriver;
