use reqwest::Client;
use std::time::Duration;

/// Shared client for upstream calls. The overall per-call bound is applied per request,
/// since it depends on the enhancement mode.
pub fn new_api_client() -> reqwest::Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
}
