use std::path::Path;

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tokio::io::AsyncWriteExt;

use super::auth::{AccessTokenProvider, ServiceAccountAuth, DRIVE_SCOPE};
use super::failure_parts;
use crate::core::drive::{DriveApi, DriveError, DriveItem, FOLDER_MIME_TYPE};

const API_BASE: &str = "https://www.googleapis.com/drive/v3";
const UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Drive v3 REST client. Every request sets `supportsAllDrives=true` so shared
/// drives behave like My Drive.
pub struct GoogleDriveClient {
    client: Client,
    auth: Box<dyn AccessTokenProvider>,
    api_base: String,
    upload_base: String,
}

impl GoogleDriveClient {
    pub fn new(auth: Box<dyn AccessTokenProvider>) -> Self {
        Self::with_base_urls(auth, API_BASE, UPLOAD_BASE)
    }

    pub fn with_base_urls(
        auth: Box<dyn AccessTokenProvider>,
        api_base: impl Into<String>,
        upload_base: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            auth,
            api_base: api_base.into(),
            upload_base: upload_base.into(),
        }
    }

    /// Creates a client with service account from environment variables.
    pub async fn from_env() -> Result<Self, DriveError> {
        let auth = ServiceAccountAuth::from_env(&[DRIVE_SCOPE])
            .await
            .map_err(|e| DriveError::Auth(e.to_string()))?;
        Ok(Self::new(Box::new(auth)))
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, DriveError> {
        let token = self
            .auth
            .access_token()
            .await
            .map_err(|e| DriveError::Auth(e.to_string()))?;
        Ok(request
            .bearer_auth(token)
            .query(&[("supportsAllDrives", "true")]))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, DriveError> {
        let response = self
            .authorized(request)
            .await?
            .send()
            .await
            .map_err(|e| DriveError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let (status, body) = failure_parts(response).await;
            return Err(DriveError::Api { status, body });
        }
        Ok(response)
    }

    fn file_url(&self, file_id: &str) -> String {
        format!("{}/files/{}", self.api_base, file_id)
    }
}

#[async_trait]
impl DriveApi for GoogleDriveClient {
    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<String, DriveError> {
        let metadata = json!({
            "name": name,
            "mimeType": FOLDER_MIME_TYPE,
            "parents": [parent_id],
        });
        let request = self
            .client
            .post(format!("{}/files", self.api_base))
            .query(&[("fields", "id")])
            .json(&metadata);

        let created: ApiFileId = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| DriveError::Http(e.to_string()))?;
        created.id.ok_or(DriveError::MissingField("id"))
    }

    async fn list_items(&self, query: &str, drive_id: &str) -> Result<Vec<DriveItem>, DriveError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client.get(format!("{}/files", self.api_base)).query(&[
                ("q", query),
                ("driveId", drive_id),
                ("corpora", "drive"),
                ("includeItemsFromAllDrives", "true"),
                ("pageSize", "1000"),
                ("fields", "nextPageToken, files(name,id)"),
            ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: ApiFileList = self
                .send(request)
                .await?
                .json()
                .await
                .map_err(|e| DriveError::Http(e.to_string()))?;
            items.extend(page.files);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!("Drive query matched {} item(s): {}", items.len(), query);
        Ok(items)
    }

    async fn download_file(&self, dest: &Path, file_id: &str) -> Result<(), DriveError> {
        let request = self
            .client
            .get(self.file_url(file_id))
            .query(&[("alt", "media")]);
        let mut response = self.send(request).await?;

        let mut file = tokio::fs::File::create(dest).await?;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| DriveError::Http(e.to_string()))?
        {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }

    async fn upload_file(&self, src: &Path, folder_id: &str) -> Result<String, DriveError> {
        let name = src
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = mime_guess::from_path(src)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let data = tokio::fs::read(src).await?;

        let metadata = json!({
            "name": name,
            "mimeType": mime_type,
            "parents": [folder_id],
        });
        let boundary = new_boundary();
        let body = multipart_related(&boundary, &metadata, &mime_type, &data);

        let request = self
            .client
            .post(format!("{}/files", self.upload_base))
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body);

        let created: ApiFileId = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| DriveError::Http(e.to_string()))?;
        created.id.ok_or(DriveError::MissingField("id"))
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), DriveError> {
        self.send(self.client.delete(self.file_url(file_id)))
            .await?;
        Ok(())
    }

    async fn update_name(&self, file_id: &str, name: &str) -> Result<(), DriveError> {
        let request = self
            .client
            .patch(self.file_url(file_id))
            .json(&json!({ "name": name }));
        self.send(request).await?;
        Ok(())
    }

    async fn get_file_name(&self, file_id: &str) -> Result<String, DriveError> {
        let request = self
            .client
            .get(self.file_url(file_id))
            .query(&[("fields", "name")]);
        let file: ApiFileName = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| DriveError::Http(e.to_string()))?;
        file.name.ok_or(DriveError::MissingField("name"))
    }

    async fn move_file(
        &self,
        file_id: &str,
        src_folder_id: &str,
        dst_folder_id: &str,
    ) -> Result<(), DriveError> {
        let request = self
            .client
            .patch(self.file_url(file_id))
            .query(&[
                ("addParents", dst_folder_id),
                ("removeParents", src_folder_id),
            ])
            .json(&json!({}));
        self.send(request).await?;
        Ok(())
    }
}

fn new_boundary() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    format!("upload_{}", token)
}

/// Builds a `multipart/related` body: JSON metadata first, then the media.
fn multipart_related(
    boundary: &str,
    metadata: &serde_json::Value,
    mime_type: &str,
    data: &[u8],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 512);
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{}\r\n",
            boundary, metadata
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!("--{}\r\nContent-Type: {}\r\n\r\n", boundary, mime_type).as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

#[derive(Debug, Deserialize)]
struct ApiFileId {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiFileName {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiFileList {
    #[serde(default)]
    files: Vec<DriveItem>,
    next_page_token: Option<String>,
}
