use std::error::Error;
use std::io;
use std::sync::Arc;

use clap::Parser;
use dotenv::dotenv;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use github_query_loader::{App, Args, Config, GitHubFetcher, IndicatorMode};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // Logs go to stderr so stdout carries only the rendered screen.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    dotenv().ok();

    let args = Args::parse();
    let config = Config::from_args(&args)?;
    let fetcher = Arc::new(GitHubFetcher::new(&config)?);
    let mut app = App::new(fetcher, config.url_builder(), IndicatorMode::Terminal);
    let mut stdout = io::stdout();

    if !args.query.is_empty() {
        app.submit(&args.query.join(" "));
        app.pump().await;
        app.render(&mut stdout)?;
        return Ok(());
    }

    info!("Reading searches from stdin, ':quit' to exit");
    app.run(BufReader::new(tokio::io::stdin()), &mut stdout).await?;
    Ok(())
}
