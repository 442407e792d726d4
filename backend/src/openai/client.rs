use async_trait::async_trait;
use log::{error, info};
use reqwest::Client as HttpClient;
use reqwest::multipart::{Form, Part};

use super::models::{
    ChatMessage, ChatRequest, ChatResponse, CompletionOptions, ImageEditRequest, ImageEditResponse,
};
use crate::config::OpenAiConfig;
use crate::error::{truncate_body, ApiError};

const PROVIDER: &str = "OpenAI";

#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// Returns `Ok(None)` when the model answered with nothing usable.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: CompletionOptions,
    ) -> Result<Option<String>, ApiError>;
}

#[async_trait]
pub trait ImageEditApi: Send + Sync {
    /// Returns the result URLs in the order the provider listed them.
    async fn edit_image(&self, request: ImageEditRequest) -> Result<Vec<String>, ApiError>;
}

#[derive(Clone)]
pub struct OpenAiClient {
    http_client: HttpClient,
    api_base: String,
    api_key: String,
    chat_model: String,
    image_model: String,
}

impl OpenAiClient {
    pub fn new(http_client: HttpClient, config: &OpenAiConfig) -> Self {
        Self {
            http_client,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            chat_model: config.chat_model.clone(),
            image_model: config.image_model.clone(),
        }
    }

    /// gpt-image models reject `response_format` and always answer in base64.
    fn supports_url_response(&self) -> bool {
        !self.image_model.starts_with("gpt-image")
    }

    fn png_part(bytes: Vec<u8>, file_name: &'static str) -> Result<Part, ApiError> {
        Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("image/png")
            .map_err(|e| ApiError::Internal(e.to_string()))
    }
}

#[async_trait]
impl CompletionApi for OpenAiClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: CompletionOptions,
    ) -> Result<Option<String>, ApiError> {
        let endpoint = format!("{}/chat/completions", self.api_base);
        let body = ChatRequest {
            model: &self.chat_model,
            messages,
            max_completion_tokens: options.max_completion_tokens,
            temperature: options.temperature,
        };

        let response = self
            .http_client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::upstream(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(
                "OpenAI chat completion failed ({}): {}",
                status,
                truncate_body(&error_text)
            );
            return Err(ApiError::UpstreamUnavailable {
                provider: PROVIDER,
                reason: format!(
                    "chat completion returned {}: {}",
                    status.as_u16(),
                    truncate_body(&error_text)
                ),
            });
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| ApiError::upstream(PROVIDER, e))?;
        Ok(completion.into_text())
    }
}

#[async_trait]
impl ImageEditApi for OpenAiClient {
    async fn edit_image(&self, request: ImageEditRequest) -> Result<Vec<String>, ApiError> {
        let endpoint = format!("{}/images/edits", self.api_base);
        info!(
            "Submitting image edit ({}, {} image bytes, {} mask bytes)",
            self.image_model,
            request.image_png.len(),
            request.mask_png.len()
        );

        let mut form = Form::new()
            .text("model", self.image_model.clone())
            .text("prompt", request.prompt)
            .text("n", request.n.to_string())
            .text("size", request.size.to_string())
            .part("image", Self::png_part(request.image_png, "image.png")?)
            .part("mask", Self::png_part(request.mask_png, "mask.png")?);
        if self.supports_url_response() {
            form = form.text("response_format", "url");
        }

        let response = self
            .http_client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::upstream(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(
                "OpenAI image edit failed ({}): {}",
                status,
                truncate_body(&error_text)
            );
            if ApiError::is_auth_status(status) {
                return Err(ApiError::UpstreamUnavailable {
                    provider: PROVIDER,
                    reason: format!("authentication rejected ({})", status.as_u16()),
                });
            }
            return Err(ApiError::EditingFailed(format!(
                "OpenAI returned {}: {}",
                status.as_u16(),
                truncate_body(&error_text)
            )));
        }

        let edited: ImageEditResponse = response
            .json()
            .await
            .map_err(|e| ApiError::EditingFailed(format!("unreadable edit response: {}", e)))?;

        Ok(edited
            .data
            .into_iter()
            .filter_map(|image| image.into_url())
            .collect())
    }
}
