use actix_cors::Cors;

const EXTENSION_ORIGIN_PREFIX: &[u8] = b"chrome-extension://";

/// CORS for the configured web origins. Browser-extension origins are always allowed,
/// since the extension's id differs per install.
pub fn build_cors(origins: &[String]) -> Cors {
    let mut cors = Cors::default().supports_credentials();

    if origins.iter().any(|origin| origin == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in origins {
            cors = cors.allowed_origin(origin);
        }
        cors = cors.allowed_origin_fn(|origin, _req_head| {
            origin.as_bytes().starts_with(EXTENSION_ORIGIN_PREFIX)
        });
    }

    cors.allow_any_method().allow_any_header()
}
