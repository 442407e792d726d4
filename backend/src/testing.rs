//! Recording mocks for the remote provider seams.

use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;
use std::sync::Mutex;

use actix_web::dev::ServerHandle;
use actix_web::{web, App, HttpServer};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use landscape_shared::{PredictionStatus, StyleToggle};
use serde_json::json;

use crate::error::ApiError;
use crate::openai::client::{CompletionApi, ImageEditApi};
use crate::openai::models::{ChatMessage, CompletionOptions, ImageEditRequest};
use crate::replicate::client::PredictionApi;
use crate::replicate::models::{Prediction, SegmentationRequest};
use crate::storage::image_source::ImageSource;

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([34, 139, 34, 255]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

/// Serves `routes` on an ephemeral local port and returns its base URL.
pub fn spawn_stub<F>(routes: F) -> (String, ServerHandle)
where
    F: Fn(&mut web::ServiceConfig) + Send + Clone + 'static,
{
    let server = HttpServer::new(move || App::new().configure(routes.clone()))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);
    (format!("http://{}", addr), handle)
}

pub fn enabled_toggle(kind: &str) -> StyleToggle {
    StyleToggle {
        enabled: true,
        kind: Some(kind.to_string()),
    }
}

pub struct MockPredictionApi {
    pub created: Mutex<Vec<SegmentationRequest>>,
    pub lookups: Mutex<Vec<String>>,
    fail: bool,
}

impl MockPredictionApi {
    pub fn new() -> Self {
        Self {
            created: Mutex::new(Vec::new()),
            lookups: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn create_calls(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

#[async_trait]
impl PredictionApi for MockPredictionApi {
    async fn create_prediction(
        &self,
        request: &SegmentationRequest,
    ) -> Result<Prediction, ApiError> {
        self.created.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(ApiError::SegmentationSubmitFailed {
                status: 422,
                body: "invalid version".to_string(),
            });
        }
        Ok(Prediction {
            id: "pred-123".to_string(),
            status: PredictionStatus::Starting,
            output: None,
            error: None,
            urls: Some(BTreeMap::from([(
                "get".to_string(),
                "https://api.replicate.com/v1/predictions/pred-123".to_string(),
            )])),
        })
    }

    async fn get_prediction(&self, prediction_id: &str) -> Result<Prediction, ApiError> {
        self.lookups.lock().unwrap().push(prediction_id.to_string());
        if self.fail {
            return Err(ApiError::SegmentationStatusFailed(format!(
                "Replicate returned 404: prediction {} not found",
                prediction_id
            )));
        }
        Ok(Prediction {
            id: prediction_id.to_string(),
            status: PredictionStatus::Succeeded,
            output: Some(json!({"combined_mask": "https://replicate.delivery/mask.png"})),
            error: None,
            urls: None,
        })
    }
}

pub enum MockReply {
    Text(String),
    Empty,
    Fail,
}

pub struct MockCompletionApi {
    pub calls: Mutex<Vec<(Vec<ChatMessage>, CompletionOptions)>>,
    reply: MockReply,
}

impl MockCompletionApi {
    pub fn new(reply: MockReply) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reply,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionApi for MockCompletionApi {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: CompletionOptions,
    ) -> Result<Option<String>, ApiError> {
        self.calls.lock().unwrap().push((messages.to_vec(), options));
        match &self.reply {
            MockReply::Text(text) => Ok(Some(text.clone())),
            MockReply::Empty => Ok(None),
            MockReply::Fail => Err(ApiError::UpstreamUnavailable {
                provider: "OpenAI",
                reason: "connection reset".to_string(),
            }),
        }
    }
}

pub struct MockImageEditApi {
    pub calls: Mutex<Vec<ImageEditRequest>>,
    urls: Vec<String>,
}

impl MockImageEditApi {
    pub fn returning(urls: Vec<String>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            urls,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageEditApi for MockImageEditApi {
    async fn edit_image(&self, request: ImageEditRequest) -> Result<Vec<String>, ApiError> {
        self.calls.lock().unwrap().push(request);
        Ok(self.urls.clone())
    }
}

pub struct MockImageSource {
    images: HashMap<String, Vec<u8>>,
}

impl MockImageSource {
    pub fn empty() -> Self {
        Self {
            images: HashMap::new(),
        }
    }

    pub fn with_image(url: &str, bytes: Vec<u8>) -> Self {
        Self {
            images: HashMap::from([(url.to_string(), bytes)]),
        }
    }

    pub fn and_image(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.images.insert(url.to_string(), bytes);
        self
    }
}

#[async_trait]
impl ImageSource for MockImageSource {
    async fn fetch(&self, image_url: &str) -> Result<Vec<u8>, ApiError> {
        self.images
            .get(image_url)
            .cloned()
            .ok_or_else(|| ApiError::ImageDownloadFailed("404".to_string()))
    }
}
