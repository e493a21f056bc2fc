//! Local filesystem implementation of [`BinaryStore`].
//!
//! Images are kept under a single root directory, one sub-directory per
//! sensor. The root is created by [`BinaryStore::init`] at startup.

use std::path::{Path, PathBuf};

use sensorhub_app::ports::BinaryStore;
use sensorhub_domain::error::SensorHubError;

use crate::error::StorageError;

/// Photo store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalPhotoStore {
    root: PathBuf,
}

impl LocalPhotoStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BinaryStore for LocalPhotoStore {
    async fn init(&self) -> Result<(), SensorHubError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(StorageError::from)?;
        tracing::info!(root = %self.root.display(), "photo store ready");
        Ok(())
    }

    async fn copy(&self, source: &Path, relative: &Path) -> Result<(), SensorHubError> {
        let destination = self.root.join(relative);
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StorageError::from)?;
        }
        tokio::fs::copy(source, &destination)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("sensorhub-photos-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn should_create_root_on_init() {
        let root = scratch_dir();
        let store = LocalPhotoStore::new(&root);

        store.init().await.unwrap();

        assert!(root.is_dir());
        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn should_copy_file_into_sensor_directory() {
        let root = scratch_dir();
        let store = LocalPhotoStore::new(&root);
        store.init().await.unwrap();
        let source = root.join("upload.tmp");
        tokio::fs::write(&source, b"jpeg bytes").await.unwrap();

        store
            .copy(&source, Path::new("42/record-id"))
            .await
            .unwrap();

        let copied = tokio::fs::read(root.join("42").join("record-id")).await.unwrap();
        assert_eq!(copied, b"jpeg bytes");
        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn should_fail_when_source_is_missing() {
        let root = scratch_dir();
        let store = LocalPhotoStore::new(&root);
        store.init().await.unwrap();

        let result = store
            .copy(&root.join("missing"), Path::new("1/x"))
            .await;

        assert!(matches!(result, Err(SensorHubError::Storage(_))));
        tokio::fs::remove_dir_all(&root).await.unwrap();
    }
}
