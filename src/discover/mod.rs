pub mod crtsh;
pub mod subdomain;

pub use crtsh::{CertSource, CrtShFetcher, CtTransport, HttpTransport, RawResponse};
pub use subdomain::{extract_subdomains, is_valid_subdomain};
