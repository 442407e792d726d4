use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use strum_macros::{AsRefStr, Display, EnumString};

/// Lifecycle of a remote prediction, relayed exactly as the provider reports it.
/// Statuses this crate does not know are kept verbatim in `Other`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    #[default]
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    #[serde(untagged)]
    Other(String),
}

impl PredictionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Starting => "starting",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Other(raw) => raw,
        }
    }

    /// Unknown statuses are treated as still running.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

impl fmt::Display for PredictionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StyleCategory {
    Curbing,
    Mulch,
    Patio,
}

/// Concrete style option; each belongs to exactly one category.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StyleKind {
    ConcreteCurbing,
    StoneCurbing,
    BrownMulch,
    RedMulch,
    FlagstonePatio,
    ConcretePatio,
}

impl StyleKind {
    pub fn category(&self) -> StyleCategory {
        match self {
            Self::ConcreteCurbing | Self::StoneCurbing => StyleCategory::Curbing,
            Self::BrownMulch | Self::RedMulch => StyleCategory::Mulch,
            Self::FlagstonePatio | Self::ConcretePatio => StyleCategory::Patio,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StyleCatalogEntry {
    pub id: StyleKind,
    pub name: Cow<'static, str>,
    pub category: StyleCategory,
    pub prompt: Cow<'static, str>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SegmentationResponse {
    pub prediction_id: String,
    pub status: PredictionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<BTreeMap<String, String>>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PredictionStatusResponse {
    pub id: String,
    pub status: PredictionStatus,
    pub output: Option<Value>,
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UploadResponse {
    pub url: String,
}

/// One toggleable style category in a style-edit request.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct StyleToggle {
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SelectedStyles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curbing: Option<StyleToggle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landscape: Option<StyleToggle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patio: Option<StyleToggle>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StyleEditRequest {
    pub image_url: String,
    pub mask_data: String,
    #[serde(default)]
    pub selected_styles: SelectedStyles,
    #[serde(default)]
    pub prompt: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StyleEditResponse {
    pub status: String,
    pub edited_image_url: String,
    pub original_prompt: String,
}

impl StyleEditResponse {
    pub fn completed(edited_image_url: String, original_prompt: String) -> Self {
        Self {
            status: "completed".to_string(),
            edited_image_url,
            original_prompt,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AnalyzeImageRequest {
    pub image_url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AnalyzeImageResponse {
    pub analysis: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorResponse {
    pub error: String,
}
