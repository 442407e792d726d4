use std::path::PathBuf;

use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, ResponseError};
use futures::{StreamExt, TryStreamExt};
use landscape_shared::{
    AnalyzeImageRequest, AnalyzeImageResponse, PredictionStatusResponse, SegmentationResponse,
    StyleEditRequest, UploadResponse,
};
use log::{debug, error, info};

use crate::catalog::styles;
use crate::error::ApiError;
use crate::imaging::normalizer::{self, ChannelMode};
use crate::imaging::run_blocking;
use crate::openai::prompt::PromptSynthesizer;
use crate::openai::style_edit::StyleEditClient;
use crate::openai::vision::ImageAnalyzer;
use crate::replicate::segmentation::SegmentationClient;
use crate::storage::upload_sink::{UploadSink, MAX_UPLOAD_SIZE, UPLOADS_ROUTE};

/// Masks arrive inline as base64, so style-edit bodies are large.
const MAX_STYLE_EDIT_BODY: usize = 25 * 1024 * 1024;

pub fn configure_routes(cfg: &mut web::ServiceConfig, upload_dir: PathBuf) {
    cfg.service(web::resource("/api/segment").route(web::post().to(segment_image)))
        .service(
            web::resource("/api/segment/{prediction_id}")
                .route(web::get().to(check_segmentation_status)),
        )
        .service(web::resource("/api/upload-image").route(web::post().to(upload_image)))
        .service(
            web::resource("/api/style-edit")
                .app_data(web::JsonConfig::default().limit(MAX_STYLE_EDIT_BODY))
                .route(web::post().to(apply_style_edit)),
        )
        .service(web::resource("/api/analyze-image").route(web::post().to(analyze_image)))
        .service(web::resource("/api/styles").route(web::get().to(get_all_styles)))
        .service(
            web::resource("/api/styles/{category}").route(web::get().to(get_styles_by_category)),
        )
        .service(Files::new(UPLOADS_ROUTE, upload_dir));
}

fn failure(context: &str, err: ApiError) -> HttpResponse {
    error!("{}: {}", context, err);
    err.error_response()
}

struct UploadedImage {
    bytes: Vec<u8>,
    file_name: Option<String>,
    content_type: Option<String>,
}

/// Reads the `image` part (or the first file part) of a multipart body.
async fn read_image_field(mut payload: Multipart) -> Result<UploadedImage, ApiError> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        if field.name() != Some("image") && file_name.is_none() {
            continue;
        }
        let content_type = field.content_type().map(|mime| mime.essence_str().to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| ApiError::BadRequest(e.to_string()))?;
            if bytes.len() + data.len() > MAX_UPLOAD_SIZE {
                return Err(ApiError::BadRequest(format!(
                    "Image exceeds the {} MiB upload limit",
                    MAX_UPLOAD_SIZE / (1024 * 1024)
                )));
            }
            bytes.extend_from_slice(&data);
        }

        return Ok(UploadedImage {
            bytes,
            file_name,
            content_type,
        });
    }
    Err(ApiError::BadRequest("No image file in request".to_string()))
}

async fn segment_image(
    segmentation: web::Data<SegmentationClient>,
    payload: Multipart,
) -> HttpResponse {
    let upload = match read_image_field(payload).await {
        Ok(upload) => upload,
        Err(e) => return failure("Segmentation upload rejected", e),
    };

    let image_png =
        match run_blocking(move || normalizer::normalize(&upload.bytes, ChannelMode::Rgb)).await {
            Ok(png) => png,
            Err(e) => return failure("Segmentation input rejected", e),
        };

    match segmentation.submit(&image_png).await {
        Ok(prediction) => HttpResponse::Ok().json(SegmentationResponse::from(prediction)),
        Err(e) => failure("Segmentation error", e),
    }
}

async fn check_segmentation_status(
    segmentation: web::Data<SegmentationClient>,
    path: web::Path<String>,
) -> HttpResponse {
    let prediction_id = path.into_inner();
    match segmentation.get_status(&prediction_id).await {
        Ok(prediction) => HttpResponse::Ok().json(PredictionStatusResponse::from(prediction)),
        Err(e) => failure("Status check error", e),
    }
}

async fn upload_image(uploads: web::Data<UploadSink>, payload: Multipart) -> HttpResponse {
    let upload = match read_image_field(payload).await {
        Ok(upload) => upload,
        Err(e) => return failure("Upload rejected", e),
    };

    let extension = UploadSink::suggested_extension(
        upload.file_name.as_deref(),
        upload.content_type.as_deref(),
    );
    match uploads.store(&upload.bytes, extension.as_deref()).await {
        Ok(url) => HttpResponse::Ok().json(UploadResponse { url }),
        Err(e) => failure("Upload error", e),
    }
}

async fn apply_style_edit(
    synthesizer: web::Data<PromptSynthesizer>,
    style_editor: web::Data<StyleEditClient>,
    request: web::Json<StyleEditRequest>,
) -> HttpResponse {
    let request = request.into_inner();
    let prompt = synthesizer.synthesize(&request.selected_styles).await;
    debug!(
        "Synthesized edit prompt ({} chars) replaces caller prompt ({} chars)",
        prompt.chars().count(),
        request.prompt.chars().count()
    );
    info!("Applying style edit to {}", request.image_url);

    match style_editor
        .edit(&request.image_url, &request.mask_data, &prompt)
        .await
    {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => failure("Style edit error", e),
    }
}

async fn analyze_image(
    analyzer: web::Data<ImageAnalyzer>,
    request: web::Json<AnalyzeImageRequest>,
) -> HttpResponse {
    match analyzer.analyze(&request.image_url).await {
        Ok(analysis) => HttpResponse::Ok().json(AnalyzeImageResponse { analysis }),
        Err(e) => failure("Image analysis error", e),
    }
}

async fn get_all_styles() -> HttpResponse {
    HttpResponse::Ok().json(styles::list_all())
}

async fn get_styles_by_category(path: web::Path<String>) -> HttpResponse {
    HttpResponse::Ok().json(styles::list_by_category(&path.into_inner()))
}
