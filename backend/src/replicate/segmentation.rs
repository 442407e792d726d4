use std::sync::Arc;

use log::{debug, error, info};

use super::client::PredictionApi;
use super::models::{Prediction, SegmentationInput, SegmentationRequest};
use crate::error::ApiError;
use crate::imaging::data_uri;

/// Submits normalized images to SAM-2 and relays prediction status.
#[derive(Clone)]
pub struct SegmentationClient {
    api: Arc<dyn PredictionApi>,
    model_version: String,
}

impl SegmentationClient {
    pub fn new(api: Arc<dyn PredictionApi>, model_version: String) -> Self {
        Self { api, model_version }
    }

    pub fn build_request(&self, image_png: &[u8]) -> SegmentationRequest {
        SegmentationRequest {
            version: self.model_version.clone(),
            input: SegmentationInput::new(data_uri::encode(image_png, "image/png")),
        }
    }

    /// `image_png` is expected to be an RGB PNG from the normalizer.
    pub async fn submit(&self, image_png: &[u8]) -> Result<Prediction, ApiError> {
        if image_png.is_empty() {
            return Err(ApiError::InvalidImageFormat("Empty image file".to_string()));
        }

        let request = self.build_request(image_png);
        let prediction = self.api.create_prediction(&request).await.map_err(|e| {
            error!("SAM-2 prediction error: {}", e);
            e
        })?;

        info!(
            "SAM-2 prediction {} submitted ({} bytes), status {}",
            prediction.id,
            image_png.len(),
            prediction.status
        );
        Ok(prediction)
    }

    pub async fn get_status(&self, prediction_id: &str) -> Result<Prediction, ApiError> {
        let prediction_id = prediction_id.trim();
        if prediction_id.is_empty() {
            return Err(ApiError::SegmentationStatusFailed(
                "prediction id is empty".to_string(),
            ));
        }

        let prediction = self.api.get_prediction(prediction_id).await?;
        if prediction.status.is_terminal() {
            info!("Prediction {} finished: {}", prediction_id, prediction.status);
        } else {
            debug!("Prediction {} is {}", prediction_id, prediction.status);
        }
        Ok(prediction)
    }
}
