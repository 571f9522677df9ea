// src/journal/store.rs — Journal file storage

use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

/// Where journal bytes live. The controller only ever goes through this.
#[async_trait]
pub trait JournalStore: Send + Sync {
    async fn exists(&self, path: &Path) -> bool;

    async fn read_all(&self, path: &Path) -> anyhow::Result<Vec<u8>>;

    /// Append to the file, creating it if needed.
    async fn write_create_or_append(&self, path: &Path, bytes: &[u8]) -> anyhow::Result<()>;

    /// Replace the whole file, creating it if needed.
    async fn write_truncate(&self, path: &Path, bytes: &[u8]) -> anyhow::Result<()>;
}

/// Plain files on the local file system.
#[derive(Debug, Clone, Default)]
pub struct FsStore;

impl FsStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl JournalStore for FsStore {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }

    async fn read_all(&self, path: &Path) -> anyhow::Result<Vec<u8>> {
        Ok(tokio::fs::read(path).await?)
    }

    async fn write_create_or_append(&self, path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        Ok(())
    }

    async fn write_truncate(&self, path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        Ok(())
    }
}
