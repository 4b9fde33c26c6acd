use std::path::{Path, PathBuf};

use axum::async_trait;
use bytes::Bytes;

/// Where processed avatar files end up. Handlers only ever see the relative
/// path string that gets persisted on the user row.
#[async_trait]
pub trait AvatarStore: Send + Sync {
    /// Moves a processed upload into place and returns its relative path.
    async fn store(&self, filename: &str, body: Bytes) -> anyhow::Result<String>;
    async fn load(&self, relative: &str) -> anyhow::Result<Vec<u8>>;
}

pub struct FsAvatarStore {
    root: PathBuf,
}

impl FsAvatarStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AvatarStore for FsAvatarStore {
    async fn store(&self, filename: &str, body: Bytes) -> anyhow::Result<String> {
        let dir = self.root.join("avatars");
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(filename), &body).await?;
        Ok(format!("avatars/{filename}"))
    }

    async fn load(&self, relative: &str) -> anyhow::Result<Vec<u8>> {
        Ok(tokio::fs::read(self.root.join(relative)).await?)
    }
}

/// Best-effort content type from the stored file's extension.
pub fn content_type_for(relative: &str) -> &'static str {
    match Path::new(relative)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_by_extension() {
        assert_eq!(content_type_for("avatars/a.jpg"), "image/jpeg");
        assert_eq!(content_type_for("avatars/a.JPEG"), "image/jpeg");
        assert_eq!(content_type_for("avatars/a.png"), "image/png");
        assert_eq!(content_type_for("avatars/noext"), "application/octet-stream");
    }

    #[tokio::test]
    async fn store_then_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("avatars-test-{}", uuid::Uuid::new_v4()));
        let store = FsAvatarStore::new(&dir);
        let relative = store
            .store("pic.png", Bytes::from_static(b"png-bytes"))
            .await
            .expect("store");
        assert_eq!(relative, "avatars/pic.png");
        let body = store.load(&relative).await.expect("load");
        assert_eq!(body, b"png-bytes");
        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
