// Core messaging module - contact name matching and Chatwork message composition.

pub mod messaging_models;
pub mod messaging_service;
pub mod name_matcher;

pub use messaging_models::*;
pub use messaging_service::*;
pub use name_matcher::{find_id, normalize_name};
