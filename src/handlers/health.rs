use actix_web::{web, HttpResponse, Responder};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AppSettings;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    environment: String,
    version: String,
    upstream_configured: bool,
}

pub async fn health_check(app_settings: web::Data<AppSettings>) -> impl Responder {
    // Reports whether a credential is present, never the credential
    let response = HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        environment: app_settings.app.environment.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        upstream_configured: app_settings.upstream.has_credential(),
    };

    HttpResponse::Ok().json(response)
}
