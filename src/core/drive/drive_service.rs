use std::path::Path;

use async_trait::async_trait;

use super::drive_models::{DriveError, DriveItem, RenamePolicy, FOLDER_MIME_TYPE};

/// Drive calls needed by the service. Every call targets shared drives too.
#[async_trait]
pub trait DriveApi: Send + Sync {
    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<String, DriveError>;
    /// Runs a `q` search inside a shared drive, following every result page.
    async fn list_items(&self, query: &str, drive_id: &str) -> Result<Vec<DriveItem>, DriveError>;
    async fn download_file(&self, dest: &Path, file_id: &str) -> Result<(), DriveError>;
    async fn upload_file(&self, src: &Path, folder_id: &str) -> Result<String, DriveError>;
    async fn delete_file(&self, file_id: &str) -> Result<(), DriveError>;
    async fn update_name(&self, file_id: &str, name: &str) -> Result<(), DriveError>;
    async fn get_file_name(&self, file_id: &str) -> Result<String, DriveError>;
    async fn move_file(
        &self,
        file_id: &str,
        src_folder_id: &str,
        dst_folder_id: &str,
    ) -> Result<(), DriveError>;
}

/// Search for non-trashed folders directly under `parent_id`.
pub fn folders_query(parent_id: &str) -> String {
    format!(
        "'{}' in parents and mimeType = '{}' and trashed = false",
        parent_id, FOLDER_MIME_TYPE
    )
}

/// Search for every non-trashed item directly under `parent_id`.
pub fn children_query(parent_id: &str) -> String {
    format!("'{}' in parents and trashed = false", parent_id)
}

pub struct DriveService<C: DriveApi> {
    client: C,
    rename_policy: RenamePolicy,
}

impl<C: DriveApi> DriveService<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            rename_policy: RenamePolicy::default(),
        }
    }

    pub fn with_rename_policy(mut self, policy: RenamePolicy) -> Self {
        self.rename_policy = policy;
        self
    }

    pub async fn create_folder(&self, name: &str, parent_id: &str) -> Result<String, DriveError> {
        let id = self.client.create_folder(name, parent_id).await?;
        tracing::info!("Created Drive folder '{}' ({})", name, id);
        Ok(id)
    }

    pub async fn list_folders(
        &self,
        parent_id: &str,
        drive_id: &str,
    ) -> Result<Vec<DriveItem>, DriveError> {
        self.client
            .list_items(&folders_query(parent_id), drive_id)
            .await
    }

    pub async fn list_children(
        &self,
        parent_id: &str,
        drive_id: &str,
    ) -> Result<Vec<DriveItem>, DriveError> {
        self.client
            .list_items(&children_query(parent_id), drive_id)
            .await
    }

    pub async fn download_file(&self, dest: &Path, file_id: &str) -> Result<(), DriveError> {
        self.client.download_file(dest, file_id).await?;
        tracing::info!("Downloaded Drive file {} to {}", file_id, dest.display());
        Ok(())
    }

    pub async fn upload_file(&self, src: &Path, folder_id: &str) -> Result<String, DriveError> {
        let id = self.client.upload_file(src, folder_id).await?;
        tracing::info!("Uploaded {} to Drive as {}", src.display(), id);
        Ok(id)
    }

    pub async fn delete_file(&self, file_id: &str) -> Result<(), DriveError> {
        self.client.delete_file(file_id).await?;
        tracing::info!("Deleted Drive file {}", file_id);
        Ok(())
    }

    /// Renames a file and waits until a read returns the new name.
    pub async fn rename_file(&self, file_id: &str, new_name: &str) -> Result<(), DriveError> {
        self.client.update_name(file_id, new_name).await?;

        let policy = self.rename_policy;
        for attempt in 1..=policy.attempts {
            let current = self.client.get_file_name(file_id).await?;
            if current == new_name {
                tracing::info!("Renamed Drive file {} to '{}'", file_id, new_name);
                return Ok(());
            }
            tracing::debug!(
                attempt,
                "Rename of {} not visible yet (still '{}')",
                file_id,
                current
            );
            if attempt < policy.attempts {
                tokio::time::sleep(policy.interval).await;
            }
        }

        Err(DriveError::RenameTimeout {
            file_id: file_id.to_string(),
            name: new_name.to_string(),
            attempts: policy.attempts,
        })
    }

    pub async fn move_file(
        &self,
        file_id: &str,
        src_folder_id: &str,
        dst_folder_id: &str,
    ) -> Result<(), DriveError> {
        self.client
            .move_file(file_id, src_folder_id, dst_folder_id)
            .await?;
        tracing::info!(
            "Moved Drive file {} from {} to {}",
            file_id,
            src_folder_id,
            dst_folder_id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashmap::DashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Drive fake whose renames only become visible after `lag` reads.
    struct LaggyDrive {
        names: DashMap<String, String>,
        pending: DashMap<String, String>,
        lag: u32,
        reads: AtomicU32,
        queries: DashMap<String, String>,
    }

    impl LaggyDrive {
        fn new(lag: u32) -> Self {
            let names = DashMap::new();
            names.insert("file-1".to_string(), "old.txt".to_string());
            Self {
                names,
                pending: DashMap::new(),
                lag,
                reads: AtomicU32::new(0),
                queries: DashMap::new(),
            }
        }
    }

    #[async_trait]
    impl DriveApi for LaggyDrive {
        async fn create_folder(&self, name: &str, _parent_id: &str) -> Result<String, DriveError> {
            let id = format!("folder-{}", name);
            self.names.insert(id.clone(), name.to_string());
            Ok(id)
        }

        async fn list_items(
            &self,
            query: &str,
            drive_id: &str,
        ) -> Result<Vec<DriveItem>, DriveError> {
            self.queries.insert(drive_id.to_string(), query.to_string());
            Ok(vec![DriveItem {
                id: "file-1".to_string(),
                name: "old.txt".to_string(),
            }])
        }

        async fn download_file(&self, _dest: &Path, _file_id: &str) -> Result<(), DriveError> {
            Ok(())
        }

        async fn upload_file(&self, _src: &Path, _folder_id: &str) -> Result<String, DriveError> {
            Ok("uploaded".to_string())
        }

        async fn delete_file(&self, file_id: &str) -> Result<(), DriveError> {
            self.names.remove(file_id);
            Ok(())
        }

        async fn update_name(&self, file_id: &str, name: &str) -> Result<(), DriveError> {
            self.pending.insert(file_id.to_string(), name.to_string());
            Ok(())
        }

        async fn get_file_name(&self, file_id: &str) -> Result<String, DriveError> {
            let reads = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
            if reads > self.lag {
                if let Some((_, name)) = self.pending.remove(file_id) {
                    self.names.insert(file_id.to_string(), name);
                }
            }
            self.names
                .get(file_id)
                .map(|n| n.clone())
                .ok_or(DriveError::MissingField("name"))
        }

        async fn move_file(
            &self,
            _file_id: &str,
            _src_folder_id: &str,
            _dst_folder_id: &str,
        ) -> Result<(), DriveError> {
            Ok(())
        }
    }

    fn fast_policy(attempts: u32) -> RenamePolicy {
        RenamePolicy {
            attempts,
            interval: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_rename_visible_immediately() {
        let service = DriveService::new(LaggyDrive::new(0)).with_rename_policy(fast_policy(3));

        service.rename_file("file-1", "new.txt").await.unwrap();

        assert_eq!(service.client.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rename_waits_for_propagation() {
        let service = DriveService::new(LaggyDrive::new(2)).with_rename_policy(fast_policy(5));

        service.rename_file("file-1", "new.txt").await.unwrap();

        assert_eq!(service.client.reads.load(Ordering::SeqCst), 3);
        assert_eq!(*service.client.names.get("file-1").unwrap(), "new.txt");
    }

    #[tokio::test]
    async fn test_rename_times_out() {
        let service = DriveService::new(LaggyDrive::new(10)).with_rename_policy(fast_policy(3));

        let err = service.rename_file("file-1", "new.txt").await.unwrap_err();

        match err {
            DriveError::RenameTimeout {
                file_id, attempts, ..
            } => {
                assert_eq!(file_id, "file-1");
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(service.client.reads.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_rename_timeout_skips_final_sleep() {
        let policy = RenamePolicy {
            attempts: 2,
            interval: Duration::from_millis(300),
        };
        let service = DriveService::new(LaggyDrive::new(10)).with_rename_policy(policy);

        let started = std::time::Instant::now();
        let err = service.rename_file("file-1", "new.txt").await.unwrap_err();

        assert!(matches!(err, DriveError::RenameTimeout { attempts: 2, .. }));
        // One sleep between the two checks, none after the last.
        assert!(started.elapsed() < Duration::from_millis(550));
    }

    #[test]
    fn test_default_rename_policy() {
        let policy = RenamePolicy::default();
        assert_eq!(policy.attempts, 10);
        assert_eq!(policy.interval, Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_list_queries() {
        let service = DriveService::new(LaggyDrive::new(0));

        service.list_folders("parent", "drive-a").await.unwrap();
        service.list_children("parent", "drive-b").await.unwrap();

        assert_eq!(
            *service.client.queries.get("drive-a").unwrap(),
            "'parent' in parents and mimeType = 'application/vnd.google-apps.folder' and trashed = false"
        );
        assert_eq!(
            *service.client.queries.get("drive-b").unwrap(),
            "'parent' in parents and trashed = false"
        );
    }

    #[tokio::test]
    async fn test_create_and_delete_pass_through() {
        let service = DriveService::new(LaggyDrive::new(0));

        let id = service.create_folder("reports", "root").await.unwrap();
        assert_eq!(id, "folder-reports");

        service.delete_file(&id).await.unwrap();
        assert!(service.client.names.get(&id).is_none());
    }
}
