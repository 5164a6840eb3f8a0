use crate::{config::AppConfig, error::AppError, state::AppState};
use actix_web::{web, HttpResponse};
use serde_json::json;

fn config_json(config: &AppConfig) -> serde_json::Value {
    json!({
        "server": {
            "host": config.server.host,
            "port": config.server.port,
            "workers": config.server.workers
        },
        "storage": {
            "upload_dir": config.storage.upload_dir.display().to_string(),
            "processed_dir": config.storage.processed_dir.display().to_string(),
            "persist": config.storage.persist
        },
        "limits": {
            "max_upload_bytes": config.limits.max_upload_bytes,
            "max_silence_seconds": config.limits.max_silence_seconds,
            "max_concurrent_jobs": config.limits.max_concurrent_jobs
        },
        "defaults": {
            "start_time": config.defaults.start_time,
            "end_time": config.defaults.end_time,
            "silence_duration": config.defaults.silence_duration,
            "silence_position": config.defaults.silence_position
        }
    })
}

pub async fn get_config(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let config = state.get_config();

    Ok(HttpResponse::Ok().json(json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "config": config_json(&config)
    })))
}

/// Partially update the runtime configuration.
///
/// Server and storage directory changes only take effect after a restart;
/// limits and defaults apply to the next request.
pub async fn update_config(
    state: web::Data<AppState>,
    body: web::Json<serde_json::Value>,
) -> Result<HttpResponse, AppError> {
    let json_str = serde_json::to_string(&body.into_inner())?;

    let current_config = state
        .update_config_from_json(&json_str)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    tracing::info!("Configuration updated at runtime");

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Configuration updated successfully",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "updated_config": config_json(&current_config)
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_update_then_read_config() {
        let mut config = AppConfig::default();
        config.storage.persist = false;
        let state = AppState::new(config);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .route("/config", web::get().to(get_config))
                .route("/config", web::put().to(update_config)),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/config")
            .set_json(json!({"limits": {"max_silence_seconds": 60}}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(state.get_config().limits.max_silence_seconds, 60);

        let req = test::TestRequest::get().uri("/config").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["config"]["limits"]["max_silence_seconds"], 60);
    }

    #[actix_web::test]
    async fn test_invalid_update_rejected() {
        let state = AppState::new(AppConfig::default());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .route("/config", web::put().to(update_config)),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/config")
            .set_json(json!({"defaults": {"silence_position": "middle"}}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.get_config().defaults.silence_position, "start");
    }
}
