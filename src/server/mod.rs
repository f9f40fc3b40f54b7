mod api_error;
mod catalog_routes;
pub mod config;
mod http_layers;
mod matching_routes;
pub mod metrics;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};
