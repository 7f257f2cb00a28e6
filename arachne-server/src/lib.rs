pub mod app;
pub mod commands;
pub mod routes;

pub use app::{AppState, build_app};
