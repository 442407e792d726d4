use landscape_shared::{PredictionStatus, PredictionStatusResponse, SegmentationResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const POINTS_PER_SIDE: u32 = 32;
pub const PRED_IOU_THRESH: f64 = 0.88;
pub const STABILITY_SCORE_THRESH: f64 = 0.95;
pub const USE_M2M: bool = true;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SegmentationInput {
    pub image: String,
    pub points_per_side: u32,
    pub pred_iou_thresh: f64,
    pub stability_score_thresh: f64,
    pub use_m2m: bool,
}

impl SegmentationInput {
    pub fn new(image_data_uri: String) -> Self {
        Self {
            image: image_data_uri,
            points_per_side: POINTS_PER_SIDE,
            pred_iou_thresh: PRED_IOU_THRESH,
            stability_score_thresh: STABILITY_SCORE_THRESH,
            use_m2m: USE_M2M,
        }
    }
}

/// Body of `POST /predictions`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SegmentationRequest {
    pub version: String,
    pub input: SegmentationInput,
}

/// A prediction as Replicate reports it. Never mutated locally.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Prediction {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub urls: Option<BTreeMap<String, String>>,
}

impl From<Prediction> for SegmentationResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            prediction_id: prediction.id,
            status: prediction.status,
            output: prediction.output,
            urls: prediction.urls,
        }
    }
}

impl From<Prediction> for PredictionStatusResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            id: prediction.id,
            status: prediction.status,
            output: prediction.output,
            error: prediction.error,
        }
    }
}
