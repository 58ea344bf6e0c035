use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::cli::Cli;
use subhunter::output::{write_subdomains, ConsoleReporter, EventSink, Level};
use subhunter::{AggregateState, BatchRunner, Config, CrtShFetcher, DomainProcessor};

pub async fn run_enumeration(cli: Cli) -> anyhow::Result<()> {
    // Keep external crates (reqwest/hyper) at INFO to avoid flooding the CLI.
    // Diagnostics go to stderr so stdout stays clean for results.
    use tracing_subscriber::EnvFilter;
    let crate_level = if cli.debug { "debug" } else if cli.verbose { "info" } else { "warn" };
    let filter_str = format!(
        "subhunter={level},reqwest=info,hyper=info,h2=info,rustls=info",
        level = crate_level
    );
    let env_filter = EnvFilter::try_new(&filter_str).unwrap_or_else(|_| EnvFilter::new(crate_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .init();

    let config = Config {
        timeout_secs: cli.timeout,
        concurrency: cli.concurrency,
        concurrent: cli.concurrent,
        max_retries: cli.retries,
        silent: cli.silent,
        ..Config::default()
    }
    .validate();

    tracing::info!(timeout = config.timeout_secs, concurrency = config.concurrency, concurrent = config.concurrent, retries = config.max_retries, "Starting enumeration");

    let reporter = ConsoleReporter::new(config.silent);
    reporter.print_banner(env!("CARGO_PKG_VERSION"));
    print_configuration(&reporter, &cli, &config);

    let sink: Arc<dyn EventSink> = Arc::new(reporter.clone());
    let state = Arc::new(AggregateState::new());
    let fetcher = CrtShFetcher::from_config(&config, sink.clone())?;
    let processor = Arc::new(DomainProcessor::new(fetcher, state.clone(), sink.clone()));
    let runner = BatchRunner::new(processor, state.clone(), sink.clone());

    let start = Instant::now();
    let subdomains = match (&cli.domain, &cli.list) {
        (_, Some(list)) => {
            let subs = run_list(&runner, sink.as_ref(), Path::new(list), &config).await;
            // list mode does not stream per domain; without a file the merged set is the output
            if cli.output.is_none() {
                for sub in &subs {
                    sink.result(sub);
                }
            }
            subs
        }
        (Some(domain), None) => {
            sink.log(Level::Info, "Target domain", Some(domain.as_str()));
            runner.run_single(domain).await
        }
        (None, None) => anyhow::bail!("specify -d/--domain or -l/--list"),
    };

    if let Some(output) = &cli.output {
        if !subdomains.is_empty() {
            let path = PathBuf::from(output);
            match write_subdomains(&path, &subdomains) {
                Ok(()) => sink.log(Level::Success, "Saved output to", Some(output.as_str())),
                Err(e) => sink.log(Level::Error, "Failed to save file", Some(format!("{:#}", e).as_str())),
            }
        }
    }

    let elapsed = start.elapsed();
    reporter.print_section(
        "SUMMARY",
        &[
            ("Total Subdomains", state.total_found().to_string()),
            ("Execution Time", format!("{:.2}s", elapsed.as_secs_f64())),
        ],
    );
    Ok(())
}

async fn run_list<P>(runner: &BatchRunner<P>, sink: &dyn EventSink, path: &Path, config: &Config) -> Vec<String>
where
    P: subhunter::ProcessDomain + 'static,
{
    let domains = match subhunter::utils::read_domain_list(path) {
        Ok(d) => d,
        Err(e) => {
            sink.log(Level::Error, "Cannot read file", Some(e.to_string().as_str()));
            return Vec::new();
        }
    };

    let path_str = path.display().to_string();
    sink.log(Level::Info, &format!("Loaded {} domains from", domains.len()), Some(path_str.as_str()));
    if config.concurrent {
        sink.log(Level::Info, &format!("Using {} concurrent workers", config.concurrency), None);
    }

    runner.run(&domains, config.concurrent, config.concurrency).await
}

fn print_configuration(reporter: &ConsoleReporter, cli: &Cli, config: &Config) {
    let target = cli.domain.clone().or_else(|| cli.list.clone()).unwrap_or_default();
    let output = cli.output.clone().unwrap_or_else(|| "stdout".to_string());

    let mut rows = vec![
        ("Target", target),
        ("Output", output),
        ("Timeout", format!("{}s", config.timeout_secs)),
    ];
    if cli.list.is_some() && config.concurrent {
        rows.push(("Workers", config.concurrency.to_string()));
    }
    reporter.print_section("CONFIGURATION", &rows);
}
