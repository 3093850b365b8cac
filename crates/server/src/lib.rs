//! HTTP surface for docask: multipart ask-with-files, a Gemini passthrough,
//! health and OpenAPI docs.

pub mod api;
pub mod app_config;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
