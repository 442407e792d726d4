use std::sync::Arc;

use image::GenericImageView;
use landscape_shared::StyleEditResponse;
use log::{error, info};

use super::client::ImageEditApi;
use super::models::ImageEditRequest;
use crate::error::ApiError;
use crate::imaging::normalizer::{self, ChannelMode};
use crate::imaging::{data_uri, run_blocking};
use crate::storage::image_source::ImageSource;

pub const EDIT_SIZE: &str = "1024x1024";
/// Longest prompt the edits endpoint accepts.
pub const MAX_EDIT_PROMPT_CHARS: usize = 1000;

/// Source image and mask as same-sized RGBA PNGs.
pub fn prepare_edit_inputs(
    source_bytes: &[u8],
    mask_data: &str,
) -> Result<(Vec<u8>, Vec<u8>), ApiError> {
    let mask_bytes =
        data_uri::decode(mask_data).map_err(|e| ApiError::InvalidMaskData(e.to_string()))?;
    let mask = normalizer::decode(&mask_bytes).map_err(|e| match e {
        ApiError::InvalidImageFormat(reason) => ApiError::InvalidMaskData(reason),
        other => other,
    })?;
    let source = normalizer::decode(source_bytes).map_err(|e| match e {
        ApiError::InvalidImageFormat(reason) => {
            ApiError::EditingFailed(format!("source image could not be decoded: {}", reason))
        }
        other => other,
    })?;

    let (width, height) = source.dimensions();
    let mask = normalizer::resize_to_match(mask, width, height);

    Ok((
        normalizer::encode_png(source, ChannelMode::Rgba)?,
        normalizer::encode_png(mask, ChannelMode::Rgba)?,
    ))
}

pub fn bound_prompt(prompt: &str) -> String {
    match prompt.char_indices().nth(MAX_EDIT_PROMPT_CHARS) {
        Some((idx, _)) => prompt[..idx].to_string(),
        None => prompt.to_string(),
    }
}

#[derive(Clone)]
pub struct StyleEditClient {
    source: Arc<dyn ImageSource>,
    editor: Arc<dyn ImageEditApi>,
}

impl StyleEditClient {
    pub fn new(source: Arc<dyn ImageSource>, editor: Arc<dyn ImageEditApi>) -> Self {
        Self { source, editor }
    }

    pub async fn edit(
        &self,
        image_url: &str,
        mask_data: &str,
        prompt: &str,
    ) -> Result<StyleEditResponse, ApiError> {
        let source_bytes = self.source.fetch(image_url).await?;

        let mask_data = mask_data.to_string();
        let (image_png, mask_png) =
            run_blocking(move || prepare_edit_inputs(&source_bytes, &mask_data)).await?;

        let prompt = bound_prompt(prompt);
        let urls = self
            .editor
            .edit_image(ImageEditRequest {
                image_png,
                mask_png,
                prompt: prompt.clone(),
                n: 1,
                size: EDIT_SIZE,
            })
            .await?;

        let Some(edited_image_url) = urls.into_iter().next() else {
            error!("Image edit for {} returned no results", image_url);
            return Err(ApiError::EditingFailed(
                "No edited image returned from OpenAI".to_string(),
            ));
        };

        info!("Style edit completed for {}", image_url);
        Ok(StyleEditResponse::completed(edited_image_url, prompt))
    }
}
