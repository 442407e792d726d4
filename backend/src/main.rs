mod catalog;
mod config;
mod error;
mod imaging;
mod openai;
mod replicate;
mod routes;
mod storage;
#[cfg(test)]
mod testing;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use config::Config;
use openai::client::OpenAiClient;
use openai::prompt::PromptSynthesizer;
use openai::style_edit::StyleEditClient;
use openai::vision::ImageAnalyzer;
use replicate::client::ReplicateClient;
use replicate::segmentation::SegmentationClient;
use routes::configure_routes;
use std::sync::Arc;
use storage::image_source::HttpImageSource;
use storage::upload_sink::UploadSink;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("Configuration error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    std::fs::create_dir_all(&config.upload_dir)?;
    log::info!("Serving uploads from {}", config.upload_dir.display());

    let http_client = config.http_client().map_err(|e| {
        log::error!("Failed to build HTTP client: {}", e);
        std::io::Error::other(e.to_string())
    })?;
    match config.http_timeout {
        Some(timeout) => log::info!("Outbound request timeout: {:?}", timeout),
        None => log::info!("Outbound requests use the HTTP client's default timeout"),
    }

    // Provider clients
    let replicate = Arc::new(ReplicateClient::new(http_client.clone(), &config.replicate));
    let openai = Arc::new(OpenAiClient::new(http_client.clone(), &config.openai));

    let upload_sink = UploadSink::new(config.upload_dir.clone());
    let image_source = Arc::new(HttpImageSource::new(http_client, upload_sink.clone()));

    let segmentation =
        SegmentationClient::new(replicate, config.replicate.sam2_version.clone());
    let synthesizer = PromptSynthesizer::new(openai.clone());
    let style_editor = StyleEditClient::new(image_source.clone(), openai.clone());
    let analyzer = ImageAnalyzer::new(openai, image_source);

    let upload_dir = config.upload_dir.clone();
    let bind_address = config.bind_address();
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(web::Data::new(segmentation.clone()))
            .app_data(web::Data::new(synthesizer.clone()))
            .app_data(web::Data::new(style_editor.clone()))
            .app_data(web::Data::new(analyzer.clone()))
            .app_data(web::Data::new(upload_sink.clone()))
            .configure(|cfg| configure_routes(cfg, upload_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
