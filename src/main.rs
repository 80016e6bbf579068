use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use elvup::commands;
use elvup::core::{config::Config, github::GitHubClient, progress::ProgressReporter};

#[derive(Parser)]
#[clap(name = "elvup")]
#[clap(about = "Install the latest tagged ElvUI release into ./dest")]
#[clap(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Print debug logging to stderr
    #[clap(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "elvup=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let config = Config::load();
    let client = GitHubClient::new(&config)?;

    // Dropped on the error path, which stops the spinner before the error prints.
    let reporter = ProgressReporter::stdout(config.spinner_interval);
    let installed = commands::install::install_latest(&config, &client, &reporter)?;
    // The install already succeeded; a broken stdout only affects the spinner.
    if let Err(e) = reporter.finish() {
        tracing::warn!(error = %e, "could not clear progress line");
    }

    println!(
        "successfully downloaded {} version {}",
        config.repo, installed.version
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
