// ABOUTME: Command-line entry point for audiomaster
// ABOUTME: Parses flags, sets up logging and runs one mastering job

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use audiomaster::driver::{self, Mode};
use audiomaster::remote::MasteringClient;
use audiomaster::{logging, Config};

#[derive(Parser)]
#[command(name = "audiomaster")]
#[command(about = "Master an audio file with the eMastered web service", long_about = None)]
#[command(version)]
struct Cli {
    /// File to master
    #[arg(long, value_name = "PATH")]
    file: PathBuf,
    /// Where to save the mastered file
    #[arg(long, value_name = "PATH", default_value = "./mastered.mp3")]
    output: PathBuf,
    /// Only report the original and mastered URLs, don't download
    #[arg(long)]
    report_only: bool,
    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Give up polling after this many seconds
    #[arg(long, value_name = "SECS")]
    max_wait: Option<u64>,
    /// Enable debug output
    #[arg(long)]
    debug: bool,
    /// Enable trace output
    #[arg(long)]
    trace: bool,
}

/// Verbose runs log every poll on stderr, so the bar stays hidden there.
fn progress_bar(verbose: bool) -> ProgressBar {
    if verbose {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:40}] {pos:>3}% {msg}") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

async fn execute(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if cli.max_wait.is_some() {
        config.polling.max_wait_secs = cli.max_wait;
    }

    tracing::debug!(file = %cli.file.display(), "Input file");

    let mode = if cli.report_only {
        Mode::ReportOnly
    } else {
        tracing::debug!(output = %cli.output.display(), "Mastered file destination");
        Mode::Download {
            output: cli.output.clone(),
        }
    };

    let client = MasteringClient::new(&config).context("Failed to create HTTP client")?;
    let bar = progress_bar(cli.debug || cli.trace);

    let run = driver::run(&client, &config.polling, &cli.file, &mode, |snapshot| {
        bar.set_position(u64::from(snapshot.percent_complete.min(100)));
        bar.set_message(snapshot.status_message.clone());
    });

    let outcome = tokio::select! {
        result = run => {
            bar.finish_and_clear();
            result.with_context(|| format!("Failed to master {}", cli.file.display()))?
        }
        _ = tokio::signal::ctrl_c() => {
            bar.abandon();
            anyhow::bail!("Interrupted; the remote job may still be running");
        }
    };

    match outcome.saved_to {
        Some(path) => println!("Saved to {}", path.display()),
        None => {
            let status = &outcome.last_status;
            println!(
                "Original file: {}",
                status.original_url.as_deref().unwrap_or("(not provided)")
            );
            println!(
                "Mastered file: {}",
                status.mastered_url.as_deref().unwrap_or("(not provided)")
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.debug, cli.trace);

    if let Err(e) = execute(cli).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}
