use std::path::PathBuf;

use clap::{Args, Subcommand};

use office_hooks::core::drive::DriveService;
use office_hooks::infra::google::GoogleDriveClient;

use super::print_json;

#[derive(Debug, Args)]
pub struct DriveArgs {
    #[command(subcommand)]
    pub command: DriveCommand,
}

#[derive(Debug, Subcommand)]
pub enum DriveCommand {
    /// Create a folder and print its id
    Mkdir {
        name: String,
        #[arg(long)]
        parent: String,
    },
    /// List folders directly under a folder of a shared drive
    Folders {
        #[arg(long)]
        parent: String,
        #[arg(long)]
        drive: String,
    },
    /// List everything directly under a folder of a shared drive
    Ls {
        #[arg(long)]
        parent: String,
        #[arg(long)]
        drive: String,
    },
    /// Download a file's content
    Download {
        file_id: String,
        #[arg(long)]
        dest: PathBuf,
    },
    /// Upload a local file into a folder and print the new id
    Upload {
        path: PathBuf,
        #[arg(long)]
        folder: String,
    },
    /// Delete a file or folder
    Rm { file_id: String },
    /// Rename and wait until the new name is visible
    Rename { file_id: String, name: String },
    /// Move a file between folders
    Mv {
        file_id: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
}

pub async fn run(args: DriveArgs) -> anyhow::Result<()> {
    let service = DriveService::new(GoogleDriveClient::from_env().await?);

    match args.command {
        DriveCommand::Mkdir { name, parent } => {
            println!("{}", service.create_folder(&name, &parent).await?);
        }
        DriveCommand::Folders { parent, drive } => {
            print_json(&service.list_folders(&parent, &drive).await?)?;
        }
        DriveCommand::Ls { parent, drive } => {
            print_json(&service.list_children(&parent, &drive).await?)?;
        }
        DriveCommand::Download { file_id, dest } => {
            service.download_file(&dest, &file_id).await?;
        }
        DriveCommand::Upload { path, folder } => {
            println!("{}", service.upload_file(&path, &folder).await?);
        }
        DriveCommand::Rm { file_id } => service.delete_file(&file_id).await?,
        DriveCommand::Rename { file_id, name } => service.rename_file(&file_id, &name).await?,
        DriveCommand::Mv { file_id, from, to } => {
            service.move_file(&file_id, &from, &to).await?;
        }
    }

    Ok(())
}
