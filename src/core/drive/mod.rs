pub mod drive_models;
pub mod drive_service;

pub use drive_models::{DriveError, DriveItem, RenamePolicy, FOLDER_MIME_TYPE};
pub use drive_service::{children_query, folders_query, DriveApi, DriveService};
