use async_trait::async_trait;
use log::{error, info};
use reqwest::Client as HttpClient;

use super::upload_sink::{UploadSink, UPLOADS_ROUTE};
use crate::error::ApiError;

/// Where source images for editing and analysis come from.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, image_url: &str) -> Result<Vec<u8>, ApiError>;
}

/// File name for URLs that point into our own upload directory.
pub fn local_upload_name(image_url: &str) -> Option<&str> {
    image_url
        .strip_prefix(UPLOADS_ROUTE)
        .and_then(|rest| rest.strip_prefix('/'))
}

/// Fetches over HTTP, short-circuiting URLs served from the upload directory.
#[derive(Clone)]
pub struct HttpImageSource {
    http_client: HttpClient,
    uploads: UploadSink,
}

impl HttpImageSource {
    pub fn new(http_client: HttpClient, uploads: UploadSink) -> Self {
        Self {
            http_client,
            uploads,
        }
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, image_url: &str) -> Result<Vec<u8>, ApiError> {
        if let Some(file_name) = local_upload_name(image_url) {
            return self.uploads.read(file_name).await;
        }

        let response = self
            .http_client
            .get(image_url)
            .send()
            .await
            .map_err(|e| ApiError::ImageDownloadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!("Image download from {} failed: {}", image_url, status);
            return Err(ApiError::ImageDownloadFailed(status.as_u16().to_string()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::ImageDownloadFailed(e.to_string()))?;
        info!("Downloaded {} bytes from {}", bytes.len(), image_url);
        Ok(bytes.to_vec())
    }
}
