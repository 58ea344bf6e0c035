use reqwest::{Client, ClientBuilder};
use std::time::Duration;

pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Create the HTTP client used for crt.sh queries.
/// `timeout_secs` bounds each request end to end, body included.
pub fn create_ct_client(timeout_secs: u64) -> reqwest::Result<Client> {
    ClientBuilder::new()
        // Connection pooling - one host, many sequential queries
        .pool_max_idle_per_host(16)
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .tcp_keepalive(Some(Duration::from_secs(60)))

        // Timeouts
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.min(30)))

        // Compression
        .gzip(true)
        .brotli(true)

        .use_rustls_tls()
        .redirect(reqwest::redirect::Policy::limited(5))

        // crt.sh sits behind edge defenses that dislike non-browser agents
        .user_agent(BROWSER_USER_AGENT)
        .build()
}
