use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

// Image payloads are large and generation is slow, so the shared client has
// no overall timeout. Callers opt in per request.
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .connect_timeout(Duration::from_secs(15))
        .build()
        .unwrap_or_else(|_| Client::new())
});

pub fn get_http_client() -> &'static Client {
    &HTTP_CLIENT
}
