pub mod client;
pub mod models;
pub mod prompt;
pub mod style_edit;
pub mod vision;
