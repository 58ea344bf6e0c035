use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::FetchError;
use crate::output::{EventSink, Level};

/// Status and body of one crt.sh response, before any interpretation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// One round trip to the CT search service.
#[async_trait]
pub trait CtTransport: Send + Sync {
    async fn get(&self, domain: &str) -> Result<RawResponse, FetchError>;
}

/// Anything that can hand back the raw `name_value` fields for a domain.
#[async_trait]
pub trait CertSource: Send + Sync {
    async fn fetch(&self, domain: &str) -> Result<Vec<String>, FetchError>;
}

#[async_trait]
impl<T: CtTransport + ?Sized> CtTransport for Arc<T> {
    async fn get(&self, domain: &str) -> Result<RawResponse, FetchError> {
        (**self).get(domain).await
    }
}

#[async_trait]
impl<T: CertSource + ?Sized> CertSource for Arc<T> {
    async fn fetch(&self, domain: &str) -> Result<Vec<String>, FetchError> {
        (**self).fetch(domain).await
    }
}

/// reqwest-backed transport against crt.sh (or a compatible mirror).
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into() }
    }

    pub fn query_url(&self, domain: &str) -> String {
        let q = format!("%.{}", domain);
        format!(
            "{}/?q={}&output=json",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&q)
        )
    }
}

#[async_trait]
impl CtTransport for HttpTransport {
    async fn get(&self, domain: &str) -> Result<RawResponse, FetchError> {
        let url = self.query_url(domain);
        tracing::debug!(url=%url, "querying crt.sh");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(RawResponse { status, body })
    }
}

#[derive(Debug, Deserialize)]
struct CrtShEntry {
    name_value: Option<String>,
}

/// Interpret a response that has already passed the status check.
pub fn parse_records(body: &str) -> Result<Vec<String>, FetchError> {
    let trimmed = body.trim();
    // crt.sh serves maintenance/error pages as HTML with a 200
    if trimmed.starts_with('<') {
        return Err(FetchError::HtmlBody);
    }

    let entries: Vec<CrtShEntry> =
        serde_json::from_str(trimmed).map_err(|e| FetchError::MalformedJson(e.to_string()))?;

    Ok(entries.into_iter().filter_map(|e| e.name_value).collect())
}

/// crt.sh client with bounded retries and linear backoff.
pub struct CrtShFetcher<T> {
    transport: T,
    max_retries: u32,
    backoff_unit: Duration,
    sink: Arc<dyn EventSink>,
}

impl CrtShFetcher<HttpTransport> {
    pub fn from_config(config: &Config, sink: Arc<dyn EventSink>) -> reqwest::Result<Self> {
        let client = crate::http_client::create_ct_client(config.timeout_secs)?;
        let transport = HttpTransport::new(client, config.base_url.clone());
        Ok(Self::new(transport, config.max_retries, config.backoff_unit(), sink))
    }
}

impl<T: CtTransport> CrtShFetcher<T> {
    pub fn new(transport: T, max_retries: u32, backoff_unit: Duration, sink: Arc<dyn EventSink>) -> Self {
        Self {
            transport,
            max_retries: max_retries.max(1),
            backoff_unit,
            sink,
        }
    }

    async fn attempt(&self, domain: &str) -> Result<Vec<String>, FetchError> {
        let resp = self.transport.get(domain).await?;
        if !(200..300).contains(&resp.status) {
            return Err(FetchError::Status(resp.status));
        }
        parse_records(&resp.body)
    }
}

#[async_trait]
impl<T: CtTransport> CertSource for CrtShFetcher<T> {
    async fn fetch(&self, domain: &str) -> Result<Vec<String>, FetchError> {
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            if attempt > 1 {
                let wait = self.backoff_unit * (attempt - 1);
                self.sink.log(
                    Level::Retry,
                    &format!("Retry {}/{} in {:.1}s", attempt, self.max_retries, wait.as_secs_f64()),
                    Some(domain),
                );
                tokio::time::sleep(wait).await;
            }

            match self.attempt(domain).await {
                Ok(records) => {
                    tracing::debug!(domain, attempt, records = records.len(), "crt.sh query succeeded");
                    return Ok(records);
                }
                Err(e) => {
                    tracing::debug!(domain, attempt, error=%e, "crt.sh attempt failed");
                    if matches!(e, FetchError::MalformedJson(_) | FetchError::HtmlBody) {
                        self.sink.log(Level::Warn, "Unusable response body", Some(e.to_string().as_str()));
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(FetchError::ExhaustedRetries {
            attempts: self.max_retries,
            last: Box::new(last_error.unwrap_or(FetchError::Transport("no attempt made".into()))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_record_array() {
        let body = r#"[{"name_value":"a.example.com\nb.example.com","id":1},{"id":2},{"name_value":"c.example.com"}]"#;
        let records = parse_records(body).unwrap();
        assert_eq!(records, vec!["a.example.com\nb.example.com", "c.example.com"]);
    }

    #[test]
    fn empty_array_is_success() {
        assert!(parse_records(" [] \n").unwrap().is_empty());
    }

    #[test]
    fn html_body_is_rejected() {
        let body = "\n  <html><body>502 Bad Gateway</body></html>";
        assert!(matches!(parse_records(body), Err(FetchError::HtmlBody)));
    }

    #[test]
    fn wrong_shape_is_malformed() {
        assert!(matches!(parse_records(r#"{"name_value":"x"}"#), Err(FetchError::MalformedJson(_))));
        assert!(matches!(parse_records("not json"), Err(FetchError::MalformedJson(_))));
    }

    #[test]
    fn query_url_encodes_wildcard() {
        let t = HttpTransport::new(Client::new(), "https://crt.sh");
        assert_eq!(t.query_url("example.com"), "https://crt.sh/?q=%25.example.com&output=json");
        let t = HttpTransport::new(Client::new(), "http://127.0.0.1:8080/");
        assert_eq!(t.query_url("a.io"), "http://127.0.0.1:8080/?q=%25.a.io&output=json");
    }
}
