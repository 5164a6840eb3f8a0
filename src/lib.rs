//! # Audio Editor Backend
//!
//! HTTP service for frame-exact edits of uncompressed PCM WAV files: cutting a
//! time range, joining two files, and padding a file with silence.
//!
//! ## Application Architecture:
//! - **audio**: the in-memory editing core (formats, frame buffers, operations)
//! - **wav**: RIFF/WAVE decoding and encoding
//! - **config**: configuration from TOML files and environment variables
//! - **state**: shared configuration, job limit and metrics
//! - **storage**: optional on-disk copies of uploads and results
//! - **handlers**: HTTP endpoints for edits and runtime configuration
//! - **health**: health and metrics endpoints
//! - **middleware**: request logging and metrics collection
//! - **error**: service errors and their HTTP responses

pub mod audio;
pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod state;
pub mod storage;
pub mod wav;

use actix_web::web;

/// Register every route. Shared by the server binary and handler tests.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health::health_check))
            .route("/metrics", web::get().to(health::detailed_metrics))
            .route("/config", web::get().to(handlers::get_config))
            .route("/config", web::put().to(handlers::update_config))
            .route("/cut", web::post().to(handlers::cut))
            .route("/merge", web::post().to(handlers::merge))
            .route("/add_silence", web::post().to(handlers::add_silence)),
    )
    // Also provide health check at root level for convenience
    .route("/health", web::get().to(health::health_check));
}
