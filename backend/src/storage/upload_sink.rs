use std::path::{Path, PathBuf};

use log::{error, info};
use uuid::Uuid;

use crate::error::ApiError;

/// Route prefix the upload directory is served under.
pub const UPLOADS_ROUTE: &str = "/uploads";
pub const MAX_UPLOAD_SIZE: usize = 50 * 1024 * 1024;
pub const DEFAULT_EXTENSION: &str = "jpg";

#[derive(Clone, Debug)]
pub struct UploadSink {
    root: PathBuf,
}

impl UploadSink {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[cfg(test)]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extract_file_extension(mime_type: &str) -> Option<&'static str> {
        match mime_type {
            "image/jpeg" => Some("jpg"),
            "image/png" => Some("png"),
            "image/webp" => Some("webp"),
            "image/gif" => Some("gif"),
            _ => None,
        }
    }

    /// Extension from the client file name, then the part MIME type.
    pub fn suggested_extension(file_name: Option<&str>, mime_type: Option<&str>) -> Option<String> {
        file_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .and_then(sanitize_extension)
            .or_else(|| {
                mime_type
                    .and_then(Self::extract_file_extension)
                    .map(str::to_string)
            })
    }

    pub fn validate_image_size(image_data: &[u8]) -> Result<(), ApiError> {
        if image_data.is_empty() {
            return Err(ApiError::BadRequest("Empty image file".to_string()));
        }
        if image_data.len() > MAX_UPLOAD_SIZE {
            return Err(ApiError::BadRequest(format!(
                "Image exceeds the {} MiB upload limit",
                MAX_UPLOAD_SIZE / (1024 * 1024)
            )));
        }
        Ok(())
    }

    pub fn generate_file_name(extension: Option<&str>) -> String {
        let extension = extension
            .and_then(sanitize_extension)
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
        format!("{}.{}", Uuid::new_v4(), extension)
    }

    /// Writes the bytes under a fresh name and returns the static URL for them.
    pub async fn store(
        &self,
        image_data: &[u8],
        suggested_extension: Option<&str>,
    ) -> Result<String, ApiError> {
        Self::validate_image_size(image_data)?;

        let file_name = Self::generate_file_name(suggested_extension);
        let path = self.root.join(&file_name);

        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            error!("Failed to create upload directory {}: {}", self.root.display(), e);
            e
        })?;
        tokio::fs::write(&path, image_data).await.map_err(|e| {
            error!("Failed to write upload {}: {}", path.display(), e);
            e
        })?;

        info!("Stored upload {} ({} bytes)", file_name, image_data.len());
        Ok(format!("{}/{}", UPLOADS_ROUTE, file_name))
    }

    /// Reads back a stored upload. Only bare file names are accepted.
    pub async fn read(&self, file_name: &str) -> Result<Vec<u8>, ApiError> {
        if file_name.is_empty()
            || file_name.contains('/')
            || file_name.contains('\\')
            || file_name.contains("..")
        {
            return Err(ApiError::ImageDownloadFailed(format!(
                "invalid upload name '{}'",
                file_name
            )));
        }
        tokio::fs::read(self.root.join(file_name))
            .await
            .map_err(|e| ApiError::ImageDownloadFailed(format!("{}: {}", file_name, e)))
    }
}

fn sanitize_extension(raw: &str) -> Option<String> {
    let ext = raw.trim().trim_start_matches('.').to_ascii_lowercase();
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext)
}
