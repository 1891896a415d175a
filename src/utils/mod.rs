pub mod http_client;
pub mod request_validation;
