mod cli;
mod runner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::parse_cli();
    runner::run_enumeration(args).await
}
