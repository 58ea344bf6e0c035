use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::output::{EventSink, Level};
use crate::processor::{AggregateState, ProcessDomain};
use crate::utils::normalize_domain;

/// Runs a domain processor over many domains, either one at a time or
/// through a semaphore-bounded pool of tokio tasks, and merges everything
/// into the shared aggregate set.
pub struct BatchRunner<P> {
    processor: Arc<P>,
    state: Arc<AggregateState>,
    sink: Arc<dyn EventSink>,
}

impl<P: ProcessDomain + 'static> BatchRunner<P> {
    pub fn new(processor: Arc<P>, state: Arc<AggregateState>, sink: Arc<dyn EventSink>) -> Self {
        Self { processor, state, sink }
    }

    pub fn state(&self) -> &Arc<AggregateState> {
        &self.state
    }

    /// Enumerate a single target, streaming its results to the sink.
    pub async fn run_single(&self, domain: &str) -> Vec<String> {
        self.state.reset();
        let subs = self.processor.process(domain, true).await;
        self.state.merge(subs);
        self.state.finalize()
    }

    /// Enumerate every domain and return the sorted union of their results.
    /// Blank entries are skipped. Concurrent mode only kicks in for more than
    /// one domain. Each call starts from an empty aggregate.
    pub async fn run(&self, domains: &[String], concurrent: bool, max_workers: usize) -> Vec<String> {
        self.state.reset();
        let domains: Vec<String> = domains
            .iter()
            .map(|d| normalize_domain(d))
            .filter(|d| !d.is_empty())
            .collect();

        if concurrent && domains.len() > 1 {
            self.run_concurrent(domains, max_workers).await;
        } else {
            self.run_sequential(&domains).await;
        }

        let result = self.state.finalize();
        tracing::info!(subdomains = result.len(), "batch complete");
        result
    }

    async fn run_sequential(&self, domains: &[String]) {
        let total = domains.len();
        for (idx, domain) in domains.iter().enumerate() {
            self.sink.log(Level::Run, &format!("[{}/{}] Processing", idx + 1, total), Some(domain.as_str()));
            let subs = self.processor.process(domain, false).await;
            self.state.merge(subs);
        }
    }

    async fn run_concurrent(&self, domains: Vec<String>, max_workers: usize) {
        let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
        let total = domains.len();
        let mut futures = FuturesUnordered::new();

        for (idx, domain) in domains.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let processor = self.processor.clone();
            let state = self.state.clone();
            let sink = self.sink.clone();

            futures.push(tokio::spawn(async move {
                // permit held until the result is merged
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return 0;
                };
                let subs = processor.process(&domain, false).await;
                let found = subs.len();
                state.merge(subs);

                sink.log(
                    Level::Success,
                    &format!("[{}/{}] {}", idx + 1, total, domain),
                    Some(format!("{} found", found).as_str()),
                );
                found
            }));
        }

        while let Some(result) = futures.next().await {
            if let Err(e) = result {
                tracing::error!(error=%e, "domain worker failed");
            }
        }
    }
}
