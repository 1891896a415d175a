use actix_web::error::JsonPayloadError;
use actix_web::{web, HttpRequest};

use crate::config::AppSettings;
use crate::error::{AppError, ClassifiedError, ErrorCode};
use crate::handlers;

/// Request bodies above this are refused before validation.
pub const MAX_JSON_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Configures the public relay routes. Mounted at the root in main.rs, with
/// `handlers::not_found::endpoint_not_found` as the default service.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::service_info::service_info))
        .route("/health", web::get().to(handlers::health::health_check))
        .service(
            web::resource("/enhance")
                .app_data(json_config())
                .route(web::post().to(handlers::enhance_handlers::enhance_prompt)),
        );
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_JSON_BODY_BYTES)
        .error_handler(json_error_handler)
}

fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    let development = req
        .app_data::<web::Data<AppSettings>>()
        .map(|settings| settings.app.is_development())
        .unwrap_or(false);

    match err {
        // No readable prompt in a body that isn't JSON
        JsonPayloadError::Deserialize(e) => {
            ClassifiedError::new(ErrorCode::InvalidPrompt, format!("Request body is not valid JSON: {}", e)).into()
        }
        JsonPayloadError::ContentType => ClassifiedError::new(
            ErrorCode::InvalidPrompt,
            "Request body must be sent as application/json",
        )
        .into(),
        other => {
            log::error!("Unhandled request payload error: {}", other);
            AppError::unhandled(other.to_string(), development).into()
        }
    }
}
