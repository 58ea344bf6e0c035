use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://crt.sh/";

#[derive(Debug, Clone)]
pub struct Config {
    pub timeout_secs: u64,
    pub concurrency: usize,
    pub concurrent: bool,
    pub max_retries: u32,
    pub backoff_unit_ms: u64,
    pub base_url: String,
    pub silent: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            concurrency: 5,
            concurrent: false,
            max_retries: 3,
            backoff_unit_ms: 1000,
            base_url: DEFAULT_BASE_URL.to_string(),
            silent: false,
        }
    }
}

impl Config {
    /// Clamp values that would stall the pipeline.
    pub fn validate(mut self) -> Self {
        self.concurrency = self.concurrency.max(1);
        self.max_retries = self.max_retries.max(1);
        self.timeout_secs = self.timeout_secs.max(1);
        self
    }

    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_unit_ms)
    }
}
