use actix_web::{HttpRequest, HttpResponse};

use crate::error::ErrorBody;

pub async fn endpoint_not_found(req: HttpRequest) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody::new(
        "Endpoint not found",
        format!("Route {} {} does not exist", req.method(), req.uri()),
    ))
}
