use std::path::Path;

use async_trait::async_trait;

use super::messaging_models::{
    ChatMessage, ChatworkError, Contact, CreatedTasks, MessagingError, PostedFile, PostedMessage,
    TaskLimit,
};
use super::name_matcher::find_id;

pub const DEFAULT_TITLE: &str = "From Rust";

/// The Chatwork calls the messaging workflow needs.
#[async_trait]
pub trait ChatworkApi: Send + Sync {
    async fn get_contacts(&self) -> Result<Vec<Contact>, ChatworkError>;
    async fn get_messages(&self, room_id: u64, force: bool)
        -> Result<Vec<ChatMessage>, ChatworkError>;
    async fn post_message(
        &self,
        room_id: u64,
        body: &str,
        self_unread: bool,
    ) -> Result<PostedMessage, ChatworkError>;
    async fn post_file(
        &self,
        room_id: u64,
        message: &str,
        file_path: &Path,
    ) -> Result<PostedFile, ChatworkError>;
    async fn create_task(
        &self,
        room_id: u64,
        body: &str,
        to_ids: &[u64],
        limit: TaskLimit,
    ) -> Result<CreatedTasks, ChatworkError>;
}

/// `[To:123]Nameさん`, the mention line Chatwork renders as a notification.
pub fn mention_line(account_id: u64, name: &str) -> String {
    format!("[To:{}]{}さん", account_id, name)
}

/// Wraps `message` in an info block with a title.
pub fn info_block(title: &str, message: &str) -> String {
    format!("[info][title]{}[/title]{}[/info]", title, message)
}

/// Resolves display names against the contact list and posts on their behalf.
pub struct MessagingService<C: ChatworkApi> {
    client: C,
}

impl<C: ChatworkApi> MessagingService<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub async fn get_account_id(&self, name: &str) -> Result<Option<u64>, MessagingError> {
        let contacts = self.client.get_contacts().await?;
        Ok(find_id(&contacts, name))
    }

    /// Posts `message`, prefixed with a mention of `mention` when that name
    /// resolves. An unresolved name is logged and the message goes out bare.
    pub async fn post_message(
        &self,
        room_id: u64,
        message: &str,
        mention: Option<&str>,
    ) -> Result<PostedMessage, MessagingError> {
        let body = self.with_mention(message, mention).await?;
        let posted = self.client.post_message(room_id, &body, true).await?;
        tracing::info!(room_id, message_id = %posted.message_id, "Posted Chatwork message");
        Ok(posted)
    }

    pub async fn post_file(
        &self,
        room_id: u64,
        message: &str,
        file_path: &Path,
        mention: Option<&str>,
    ) -> Result<PostedFile, MessagingError> {
        let body = self.with_mention(message, mention).await?;
        let posted = self.client.post_file(room_id, &body, file_path).await?;
        tracing::info!(
            room_id,
            file_id = posted.file_id,
            "Uploaded {} to Chatwork",
            file_path.display()
        );
        Ok(posted)
    }

    /// Creates a task assigned to every name in `assignees`. All names must
    /// resolve, otherwise nothing is created.
    pub async fn create_task(
        &self,
        room_id: u64,
        message: &str,
        assignees: &[&str],
        limit: TaskLimit,
    ) -> Result<CreatedTasks, MessagingError> {
        if assignees.is_empty() {
            return Err(MessagingError::NoAssignees);
        }

        let contacts = self.client.get_contacts().await?;
        let mut to_ids = Vec::with_capacity(assignees.len());
        for name in assignees {
            let id = find_id(&contacts, name)
                .ok_or_else(|| MessagingError::UnknownContact(name.to_string()))?;
            to_ids.push(id);
        }

        let created = self
            .client
            .create_task(room_id, message, &to_ids, limit)
            .await?;
        tracing::info!(room_id, tasks = created.task_ids.len(), "Created Chatwork task");
        Ok(created)
    }

    /// Builds an info-block message whose first line mentions every name in
    /// `to_names` that resolves. The contact list is fetched once.
    pub async fn format_message(
        &self,
        message: &str,
        title: Option<&str>,
        to_names: &[&str],
    ) -> Result<String, MessagingError> {
        let mut first_line = String::new();
        if !to_names.is_empty() {
            let contacts = self.client.get_contacts().await?;
            for name in to_names {
                match find_id(&contacts, name) {
                    Some(id) => first_line.push_str(&mention_line(id, name)),
                    None => tracing::warn!("No Chatwork contact matches '{}'", name),
                }
            }
        }

        let block = info_block(title.unwrap_or(DEFAULT_TITLE), message);
        if first_line.is_empty() {
            Ok(block)
        } else {
            Ok(format!("{}\n{}", first_line, block))
        }
    }

    async fn with_mention(
        &self,
        message: &str,
        mention: Option<&str>,
    ) -> Result<String, MessagingError> {
        let name = match mention {
            Some(name) if !name.is_empty() => name,
            _ => return Ok(message.to_string()),
        };

        match self.get_account_id(name).await? {
            Some(id) => Ok(format!("{}\n{}", mention_line(id, name), message)),
            None => {
                tracing::warn!("No Chatwork contact matches '{}', posting without mention", name);
                Ok(message.to_string())
            }
        }
    }
}
