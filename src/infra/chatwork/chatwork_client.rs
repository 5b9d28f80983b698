use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::core::messaging::{
    ChatMessage, ChatworkApi, ChatworkError, Contact, CreatedTasks, PostedFile, PostedMessage,
    TaskLimit,
};

const API_BASE: &str = "https://api.chatwork.com/v2";

/// Chatwork v2 REST client. Authenticates with the `X-ChatWorkToken` header.
pub struct ChatworkClient {
    client: Client,
    token: String,
    base_url: String,
}

impl ChatworkClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, API_BASE)
    }

    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            base_url: base_url.into(),
        }
    }

    /// Switches to another account's API token.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn send<T>(&self, request: RequestBuilder) -> Result<T, ChatworkError>
    where
        T: DeserializeOwned + Default,
    {
        let response = request
            .header("X-ChatWorkToken", &self.token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ChatworkError::Http(e.to_string()))?;
        decode_response(response).await
    }
}

/// 200 decodes the body, 204 yields the empty value, failures carry the API's
/// `errors` list.
async fn decode_response<T>(response: Response) -> Result<T, ChatworkError>
where
    T: DeserializeOwned + Default,
{
    let status = response.status();

    if status == StatusCode::OK {
        return response
            .json()
            .await
            .map_err(|e| ChatworkError::Decode(e.to_string()));
    }
    if status == StatusCode::NO_CONTENT {
        return Ok(T::default());
    }
    if status.is_success() {
        return Err(ChatworkError::UnexpectedStatus(status.as_u16()));
    }

    let text = response.text().await.unwrap_or_default();
    let errors = match serde_json::from_str::<ApiErrors>(&text) {
        Ok(parsed) => parsed.errors,
        Err(_) => vec![text],
    };
    Err(ChatworkError::Api {
        status: status.as_u16(),
        errors,
    })
}

#[async_trait]
impl ChatworkApi for ChatworkClient {
    async fn get_contacts(&self) -> Result<Vec<Contact>, ChatworkError> {
        self.send(self.client.get(self.url("contacts"))).await
    }

    async fn get_messages(
        &self,
        room_id: u64,
        force: bool,
    ) -> Result<Vec<ChatMessage>, ChatworkError> {
        let request = self
            .client
            .get(self.url(&format!("rooms/{}/messages", room_id)))
            .query(&[("force", if force { "1" } else { "0" })]);
        self.send(request).await
    }

    async fn post_message(
        &self,
        room_id: u64,
        body: &str,
        self_unread: bool,
    ) -> Result<PostedMessage, ChatworkError> {
        let request = self
            .client
            .post(self.url(&format!("rooms/{}/messages", room_id)))
            .form(&[("body", body), ("self_unread", if self_unread { "1" } else { "0" })]);
        self.send(request).await
    }

    async fn post_file(
        &self,
        room_id: u64,
        message: &str,
        file_path: &Path,
    ) -> Result<PostedFile, ChatworkError> {
        let data = tokio::fs::read(file_path).await?;
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = mime_guess::from_path(file_path).first_or_octet_stream();

        let part = Part::bytes(data)
            .file_name(file_name)
            .mime_str(mime_type.essence_str())
            .map_err(|e| ChatworkError::Http(e.to_string()))?;
        let mut form = Form::new().part("file", part);
        if !message.is_empty() {
            form = form.text("message", message.to_string());
        }

        let request = self
            .client
            .post(self.url(&format!("rooms/{}/files", room_id)))
            .multipart(form);
        self.send(request).await
    }

    async fn create_task(
        &self,
        room_id: u64,
        body: &str,
        to_ids: &[u64],
        limit: TaskLimit,
    ) -> Result<CreatedTasks, ChatworkError> {
        let to_ids = to_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let (limit_type, limit_at) = limit.form_fields();

        let mut fields = vec![
            ("body", body.to_string()),
            ("to_ids", to_ids),
            ("limit_type", limit_type.to_string()),
        ];
        if let Some(at) = limit_at {
            fields.push(("limit", at.to_string()));
        }

        let request = self
            .client
            .post(self.url(&format!("rooms/{}/tasks", room_id)))
            .form(&fields);
        self.send(request).await
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrors {
    errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn client_for(server: &MockServer) -> ChatworkClient {
        ChatworkClient::with_base_url("cw-token", server.base_url())
    }

    #[tokio::test]
    async fn test_get_contacts() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/contacts")
                    .header("x-chatworktoken", "cw-token");
                then.status(200)
                    .json_body(json!([{ "account_id": 6222482, "name": "自動通知bot" }]));
            })
            .await;

        let contacts = client_for(&server).get_contacts().await.unwrap();

        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].account_id, 6222482);
        assert_eq!(contacts[0].name, "自動通知bot");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_content_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rooms/10/messages")
                    .query_param("force", "0");
                then.status(204);
            })
            .await;

        let messages = client_for(&server).get_messages(10, false).await.unwrap();

        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_get_messages_forced() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rooms/10/messages")
                    .query_param("force", "1");
                then.status(200).json_body(json!([{
                    "message_id": "5",
                    "account": { "account_id": 1, "name": "Alice" },
                    "body": "hi",
                    "send_time": 1_700_000_000,
                    "update_time": 0
                }]));
            })
            .await;

        let messages = client_for(&server).get_messages(10, true).await.unwrap();

        assert_eq!(messages[0].account.name, "Alice");
        assert_eq!(
            messages[0].sent_at(),
            Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_error_body_is_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/rooms/10/messages");
                then.status(401)
                    .json_body(json!({ "errors": ["Invalid API token"] }));
            })
            .await;

        let err = client_for(&server)
            .post_message(10, "hello", true)
            .await
            .unwrap_err();

        match err {
            ChatworkError::Api { status, errors } => {
                assert_eq!(status, 401);
                assert_eq!(errors, vec!["Invalid API token"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_post_message_form() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/rooms/10/messages")
                    .body("body=hello&self_unread=1");
                then.status(200).json_body(json!({ "message_id": "1234" }));
            })
            .await;

        let posted = client_for(&server)
            .post_message(10, "hello", true)
            .await
            .unwrap();

        assert_eq!(posted.message_id, "1234");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_task_joins_ids() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/rooms/10/tasks")
                    .body("body=review&to_ids=1%2C2&limit_type=none");
                then.status(200).json_body(json!({ "task_ids": [7, 8] }));
            })
            .await;

        let created = client_for(&server)
            .create_task(10, "review", &[1, 2], TaskLimit::None)
            .await
            .unwrap();

        assert_eq!(created.task_ids, vec![7, 8]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_file_multipart() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/rooms/10/files")
                    .header_exists("content-type");
                then.status(200).json_body(json!({ "file_id": 321 }));
            })
            .await;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"report body").unwrap();

        let posted = client_for(&server)
            .post_file(10, "see attached", file.path())
            .await
            .unwrap();

        assert_eq!(posted.file_id, 321);
        mock.assert_async().await;
    }

    #[test]
    fn test_set_token() {
        let mut client = ChatworkClient::new("first");
        client.set_token("second");
        assert_eq!(client.token, "second");
    }
}
