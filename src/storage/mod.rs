use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppError;

/// A file received in a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Where uploaded course images and materials end up. The returned reference
/// is opaque to callers and stored as-is.
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn store(&self, file: &UploadedFile, scope: &str) -> Result<String, AppError>;

    /// Delete a previously stored file. A reference that no longer exists is
    /// not an error.
    async fn remove(&self, reference: &str) -> Result<(), AppError>;
}

/// Stores files under a root directory, one sub-directory per scope.
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store(&self, file: &UploadedFile, scope: &str) -> Result<String, AppError> {
        let scope = sanitize_scope(scope)?;
        let stored_name = format!("{}_{}", Uuid::new_v4(), sanitize_file_name(&file.file_name));
        let reference = scope.join(&stored_name);

        let dir = self.root.join(&scope);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&stored_name), &file.bytes).await?;

        let reference = reference.to_string_lossy().replace('\\', "/");
        info!(
            "stored upload {} ({} bytes, {})",
            reference,
            file.bytes.len(),
            file.content_type.as_deref().unwrap_or("unknown type")
        );
        Ok(reference)
    }

    async fn remove(&self, reference: &str) -> Result<(), AppError> {
        let path = self.root.join(sanitize_scope(reference)?);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("removed upload {}", reference);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Scopes are built by the services (`course_images`, `courses/<id>`), but
/// still must never escape the storage root.
fn sanitize_scope(scope: &str) -> Result<PathBuf, AppError> {
    let path = Path::new(scope);
    if path
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        Ok(path.to_path_buf())
    } else {
        Err(AppError::BadRequest(format!("invalid storage scope: {scope}")))
    }
}

fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
