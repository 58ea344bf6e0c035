use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::discover::{extract_subdomains, CertSource};
use crate::output::{EventSink, Level};
use crate::utils::normalize_domain;

#[derive(Debug, Default)]
struct Aggregate {
    total_found: usize,
    subdomains: BTreeSet<String>,
}

/// Per-run aggregation context shared by every worker. The running total
/// and the merged set live behind one lock; no I/O happens while it is held.
#[derive(Debug, Default)]
pub struct AggregateState {
    inner: Mutex<Aggregate>,
}

impl AggregateState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything from a previous run.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.total_found = 0;
        inner.subdomains.clear();
    }

    /// Add a per-domain count to the running total.
    pub fn add_found(&self, count: usize) -> usize {
        let mut inner = self.inner.lock();
        inner.total_found += count;
        inner.total_found
    }

    pub fn total_found(&self) -> usize {
        self.inner.lock().total_found
    }

    /// Merge one domain's results, returning how many were new to the run.
    pub fn merge<I>(&self, subdomains: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let mut inner = self.inner.lock();
        let before = inner.subdomains.len();
        inner.subdomains.extend(subdomains);
        inner.subdomains.len() - before
    }

    /// Sorted snapshot of the merged set. The running total is reset to the
    /// set size so cross-domain duplicates are counted once.
    pub fn finalize(&self) -> Vec<String> {
        let mut inner = self.inner.lock();
        inner.total_found = inner.subdomains.len();
        inner.subdomains.iter().cloned().collect()
    }
}

/// Enumerate one domain. Failures are absorbed and yield an empty list.
#[async_trait]
pub trait ProcessDomain: Send + Sync {
    async fn process(&self, domain: &str, emit_results: bool) -> Vec<String>;
}

/// Fetch + extract for a single domain.
pub struct DomainProcessor<S> {
    source: S,
    state: Arc<AggregateState>,
    sink: Arc<dyn EventSink>,
}

impl<S: CertSource> DomainProcessor<S> {
    pub fn new(source: S, state: Arc<AggregateState>, sink: Arc<dyn EventSink>) -> Self {
        Self { source, state, sink }
    }

    pub fn state(&self) -> &Arc<AggregateState> {
        &self.state
    }
}

#[async_trait]
impl<S: CertSource> ProcessDomain for DomainProcessor<S> {
    async fn process(&self, domain: &str, emit_results: bool) -> Vec<String> {
        let domain = normalize_domain(domain);
        if domain.is_empty() {
            return Vec::new();
        }

        self.sink.log(Level::Run, "Querying crt.sh API", Some(domain.as_str()));

        let records = match self.source.fetch(&domain).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(domain=%domain, error=%e, "domain query failed");
                self.sink.log(Level::Error, &format!("Failed to query {}", domain), Some(e.to_string().as_str()));
                return Vec::new();
            }
        };

        let subdomains = extract_subdomains(&domain, &records);
        let count = subdomains.len();
        self.state.add_found(count);

        if count > 0 {
            self.sink.log(Level::Found, &format!("Discovered {} subdomains", count), None);
            if emit_results {
                for sub in &subdomains {
                    self.sink.result(sub);
                }
            }
        } else {
            self.sink.log(Level::Warn, "No subdomains found", Some(domain.as_str()));
        }

        subdomains
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::output::NullSink;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Canned {
        calls: AtomicUsize,
        reply: Result<Vec<String>, u16>,
    }

    #[async_trait]
    impl CertSource for Canned {
        async fn fetch(&self, _domain: &str) -> Result<Vec<String>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(v) => Ok(v.clone()),
                Err(code) => Err(FetchError::ExhaustedRetries {
                    attempts: 3,
                    last: Box::new(FetchError::Status(*code)),
                }),
            }
        }
    }

    fn processor(reply: Result<Vec<String>, u16>) -> DomainProcessor<Canned> {
        let source = Canned { calls: AtomicUsize::new(0), reply };
        DomainProcessor::new(source, Arc::new(AggregateState::new()), Arc::new(NullSink))
    }

    #[tokio::test]
    async fn blank_domain_skips_fetch() {
        let p = processor(Ok(vec!["x.example.com".into()]));
        assert!(p.process("   ", true).await.is_empty());
        assert_eq!(p.source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn normalizes_before_fetch_and_counts() {
        let p = processor(Ok(vec!["www.example.com\nmail.example.com".into(), "www.example.com".into()]));
        let subs = p.process("  EXAMPLE.com ", false).await;
        assert_eq!(subs, vec!["mail.example.com", "www.example.com"]);
        assert_eq!(p.state().total_found(), 2);
    }

    #[tokio::test]
    async fn failure_yields_empty_result() {
        let p = processor(Err(503));
        assert!(p.process("example.com", false).await.is_empty());
        assert_eq!(p.state().total_found(), 0);
        assert_eq!(p.source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn finalize_overwrites_running_total() {
        let state = AggregateState::new();
        state.add_found(1);
        state.add_found(2);
        assert_eq!(state.merge(vec!["b.io".to_string()]), 1);
        assert_eq!(state.merge(vec!["a.io".to_string(), "b.io".to_string()]), 1);
        assert_eq!(state.total_found(), 3);
        assert_eq!(state.finalize(), vec!["a.io", "b.io"]);
        assert_eq!(state.total_found(), 2);
    }

    #[test]
    fn reset_clears_set_and_total() {
        let state = AggregateState::new();
        state.add_found(4);
        state.merge(vec!["a.io".to_string()]);
        state.reset();
        assert_eq!(state.total_found(), 0);
        assert!(state.finalize().is_empty());
    }
}
