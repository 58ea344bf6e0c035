use clap::Parser;

#[derive(clap::Parser, Debug)]
#[command(name = "subhunter", author, version, about = "Certificate Transparency subdomain enumerator", long_about = None)]
#[command(group(clap::ArgGroup::new("target").required(true).args(["domain", "list"])))]
pub struct Cli {
    /// Target domain (e.g. example.com)
    #[arg(short = 'd', long)]
    pub domain: Option<String>,

    /// File with newline-delimited domains
    #[arg(short = 'l', long)]
    pub list: Option<String>,

    /// Write the final sorted subdomains to this file
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    /// Request timeout in seconds
    #[arg(short = 't', long, default_value_t = 300_u64)]
    pub timeout: u64,

    /// Concurrent workers (used with --concurrent)
    #[arg(short = 'c', long, default_value_t = 5_usize)]
    pub concurrency: usize,

    /// Process the domain list concurrently
    #[arg(long, default_value_t = false)]
    pub concurrent: bool,

    /// Attempts per domain before giving up
    #[arg(short = 'r', long, default_value_t = 3_u32)]
    pub retries: u32,

    /// Silent mode: print only subdomains
    #[arg(short = 's', long, default_value_t = false)]
    pub silent: bool,

    /// Enable detailed debug logging
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// Enable verbose logging
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["subhunter", "-d", "example.com"]).unwrap();
        assert_eq!(cli.domain.as_deref(), Some("example.com"));
        assert_eq!(cli.timeout, 300);
        assert_eq!(cli.concurrency, 5);
        assert_eq!(cli.retries, 3);
        assert!(!cli.concurrent);
    }

    #[test]
    fn domain_and_list_are_exclusive() {
        assert!(Cli::try_parse_from(["subhunter", "-d", "a.com", "-l", "list.txt"]).is_err());
    }

    #[test]
    fn a_target_is_required() {
        assert!(Cli::try_parse_from(["subhunter", "--silent"]).is_err());
    }
}
