pub mod image_source;
pub mod upload_sink;
