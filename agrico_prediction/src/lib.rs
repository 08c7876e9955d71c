mod hub;
mod inference_service;
mod model_service;
mod ort_service;
mod prediction;
mod preprocess;
mod routes;
mod server;

pub mod app;
pub mod config;
pub mod labels;

pub use app::start_app;
