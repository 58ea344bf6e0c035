use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single crt.sh query. Every variant except `ExhaustedRetries`
/// describes one attempt; the fetcher retries those and only ever surfaces
/// `ExhaustedRetries` to its callers.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("received HTML page instead of JSON")]
    HtmlBody,

    #[error("malformed JSON response: {0}")]
    MalformedJson(String),

    #[error("giving up after {attempts} attempts: {last}")]
    ExhaustedRetries {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// The underlying attempt failure, looking through `ExhaustedRetries`.
    pub fn root(&self) -> &FetchError {
        match self {
            FetchError::ExhaustedRetries { last, .. } => last.root(),
            other => other,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(flatten_chain(&e))
    }
}

/// Render an error and its sources as `outer: cause: root`.
fn flatten_chain(e: &dyn std::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// The domain list could not be read.
#[derive(Debug, Error)]
#[error("cannot read domain list {path}: {source}")]
pub struct InputError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}
