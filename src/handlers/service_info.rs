use actix_web::{web, HttpResponse, Responder};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::config::AppSettings;
use crate::modes::EnhancementMode;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfoResponse {
    message: &'static str,
    version: &'static str,
    environment: String,
    endpoints: Endpoints,
    modes: Vec<ModeInfo>,
    documentation: &'static str,
    timestamp: String,
}

#[derive(Serialize)]
pub struct Endpoints {
    health: &'static str,
    enhance: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeInfo {
    id: EnhancementMode,
    display_name: &'static str,
    description: &'static str,
}

/// Service description and the modes `/enhance` accepts.
pub async fn service_info(app_settings: web::Data<AppSettings>) -> impl Responder {
    let modes = EnhancementMode::ALL
        .into_iter()
        .map(|mode| {
            let template = mode.template();
            ModeInfo {
                id: mode,
                display_name: template.display_name,
                description: template.description,
            }
        })
        .collect();

    HttpResponse::Ok().json(ServiceInfoResponse {
        message: "Grok Prompt Enhancer API",
        version: env!("CARGO_PKG_VERSION"),
        environment: app_settings.app.environment.clone(),
        endpoints: Endpoints {
            health: "GET /health",
            enhance: "POST /enhance",
        },
        modes,
        documentation: "Rewrites a prompt through an upstream language model according to the selected enhancement mode.",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
