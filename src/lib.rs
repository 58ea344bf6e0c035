pub mod config;
pub mod error;
pub mod output;
pub mod utils;
pub mod discover;
pub mod http_client;
pub mod processor;
pub mod concurrent;

// re-export the pipeline used by the binary and the tests
pub use crate::concurrent::BatchRunner;
pub use crate::config::Config;
pub use crate::discover::{extract_subdomains, is_valid_subdomain, CertSource, CrtShFetcher};
pub use crate::error::{FetchError, InputError};
pub use crate::processor::{AggregateState, DomainProcessor, ProcessDomain};
