use actix_web::{http::header::ContentType, web, HttpResponse};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::config::AppSettings;
use crate::error::AppError;
use crate::services::EnhancementService;

/// Handle prompt enhancement requests
#[instrument(skip(payload, enhancement_service, settings))]
pub async fn enhance_prompt(
    payload: web::Json<Value>,
    enhancement_service: web::Data<EnhancementService>,
    settings: web::Data<AppSettings>,
) -> Result<HttpResponse, actix_web::Error> {
    let outcome = enhancement_service.process(payload.into_inner()).await;

    info!(
        request_id = %outcome.request_id,
        state = ?outcome.final_state(),
        "Enhancement request finished"
    );

    let response = outcome.result?;
    Ok(json_ok(&response, settings.app.is_development())?)
}

/// 200 with a JSON body. A body that fails to serialize becomes an unhandled 500.
fn json_ok<T: Serialize>(value: &T, development: bool) -> Result<HttpResponse, AppError> {
    let body = serde_json::to_string(value).map_err(|e| {
        error!("Failed to serialize response: {}", e);
        AppError::unhandled(format!("Failed to serialize response: {}", e), development)
    })?;

    Ok(HttpResponse::Ok().content_type(ContentType::json()).body(body))
}
