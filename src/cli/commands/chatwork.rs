use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

use office_hooks::core::messaging::{find_id, ChatworkApi, MessagingService, TaskLimit};
use office_hooks::infra::chatwork::ChatworkClient;

use super::print_json;

#[derive(Debug, Args)]
pub struct ChatworkArgs {
    /// Chatwork API token
    #[arg(long, env = "CHATWORK_API_TOKEN", hide_env_values = true)]
    pub token: String,

    #[command(subcommand)]
    pub command: ChatworkCommand,
}

#[derive(Debug, Subcommand)]
pub enum ChatworkCommand {
    /// List contacts
    Contacts,
    /// Resolve a display name to an account id
    FindId { name: String },
    /// Show a room's messages
    Messages {
        #[arg(long)]
        room: u64,
        /// Return the latest 100 messages even if already read
        #[arg(long)]
        force: bool,
    },
    /// Post a message, optionally mentioning contacts by name
    Post {
        #[arg(long)]
        room: u64,
        #[arg(long)]
        message: String,
        /// Contact names to mention (repeatable)
        #[arg(long)]
        to: Vec<String>,
        /// Wrap the message in an info block with this title
        #[arg(long)]
        title: Option<String>,
    },
    /// Upload a file with a message
    File {
        #[arg(long)]
        room: u64,
        #[arg(long)]
        path: PathBuf,
        #[arg(long, default_value = "")]
        message: String,
        #[arg(long)]
        to: Option<String>,
    },
    /// Create a task for one or more contacts
    Task {
        #[arg(long)]
        room: u64,
        #[arg(long)]
        message: String,
        #[arg(long = "assignee", required = true)]
        assignees: Vec<String>,
        /// Deadline (RFC 3339)
        #[arg(long)]
        due: Option<DateTime<Utc>>,
    },
}

pub async fn run(args: ChatworkArgs) -> anyhow::Result<()> {
    let service = MessagingService::new(ChatworkClient::new(args.token));

    match args.command {
        ChatworkCommand::Contacts => {
            let contacts = service.client().get_contacts().await?;
            print_json(&contacts)?;
        }
        ChatworkCommand::FindId { name } => {
            let contacts = service.client().get_contacts().await?;
            match find_id(&contacts, &name) {
                Some(id) => println!("{}", id),
                None => anyhow::bail!("No contact matches '{}'", name),
            }
        }
        ChatworkCommand::Messages { room, force } => {
            let messages = service.client().get_messages(room, force).await?;
            print_json(&messages)?;
        }
        ChatworkCommand::Post {
            room,
            message,
            to,
            title,
        } => {
            let posted = match title {
                Some(title) => {
                    let names: Vec<&str> = to.iter().map(String::as_str).collect();
                    let body = service
                        .format_message(&message, Some(&title), &names)
                        .await?;
                    service.post_message(room, &body, None).await?
                }
                None => {
                    if to.len() > 1 {
                        anyhow::bail!("Use --title to mention more than one contact");
                    }
                    service
                        .post_message(room, &message, to.first().map(String::as_str))
                        .await?
                }
            };
            println!("{}", posted.message_id);
        }
        ChatworkCommand::File {
            room,
            path,
            message,
            to,
        } => {
            let posted = service
                .post_file(room, &message, &path, to.as_deref())
                .await
                .with_context(|| format!("Failed to upload {}", path.display()))?;
            println!("{}", posted.file_id);
        }
        ChatworkCommand::Task {
            room,
            message,
            assignees,
            due,
        } => {
            let names: Vec<&str> = assignees.iter().map(String::as_str).collect();
            let limit = due.map(TaskLimit::At).unwrap_or_default();
            let created = service.create_task(room, &message, &names, limit).await?;
            print_json(&created.task_ids)?;
        }
    }

    Ok(())
}
