use std::sync::Arc;

use log::{error, info};

use super::client::CompletionApi;
use super::models::{ChatMessage, CompletionOptions};
use crate::error::ApiError;
use crate::imaging::data_uri;
use crate::storage::image_source::{local_upload_name, ImageSource};

const ANALYSIS_INSTRUCTION: &str = "Analyze this landscape image and describe the key elements, focusing on areas suitable for curbing, mulch, and patio installations. Be specific about the current landscaping features.";
pub const NO_ANALYSIS: &str = "Unable to analyze image content";

const ANALYSIS_OPTIONS: CompletionOptions = CompletionOptions {
    max_completion_tokens: 500,
    temperature: None,
};

/// Describes a yard photo with a vision-capable chat model.
#[derive(Clone)]
pub struct ImageAnalyzer {
    completions: Arc<dyn CompletionApi>,
    source: Arc<dyn ImageSource>,
}

impl ImageAnalyzer {
    pub fn new(completions: Arc<dyn CompletionApi>, source: Arc<dyn ImageSource>) -> Self {
        Self {
            completions,
            source,
        }
    }

    /// Local uploads are inlined since the model cannot reach a relative path.
    async fn model_visible_url(&self, image_url: &str) -> Result<String, ApiError> {
        if local_upload_name(image_url).is_none() {
            return Ok(image_url.to_string());
        }
        let bytes = self.source.fetch(image_url).await?;
        Ok(data_uri::encode(&bytes, data_uri::sniff_mime(&bytes)))
    }

    pub async fn analyze(&self, image_url: &str) -> Result<String, ApiError> {
        if image_url.trim().is_empty() {
            return Err(ApiError::BadRequest("image_url is required".to_string()));
        }

        let url = self.model_visible_url(image_url).await?;
        let messages = [ChatMessage::user_with_image(ANALYSIS_INSTRUCTION, url)];

        match self.completions.complete(&messages, ANALYSIS_OPTIONS).await {
            Ok(Some(analysis)) => {
                info!("Analyzed image {}", image_url);
                Ok(analysis)
            }
            Ok(None) => Ok(NO_ANALYSIS.to_string()),
            Err(e) => {
                error!("OpenAI image analysis error: {}", e);
                Err(ApiError::AnalysisFailed(e.to_string()))
            }
        }
    }
}
