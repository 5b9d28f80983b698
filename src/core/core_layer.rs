// The core module contains the platform-agnostic logic.
// Each vendor area gets its own submodule; infra implements the traits here.

#[path = "sheets/mod.rs"]
pub mod sheets;

#[path = "messaging/mod.rs"]
pub mod messaging;

#[path = "drive/mod.rs"]
pub mod drive;

#[path = "browser/mod.rs"]
pub mod browser;
