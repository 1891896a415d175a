pub mod enhance_handlers;
pub mod health;
pub mod not_found;
pub mod service_info;
