mod sink;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use danmaku_api::DandanClient;
use danmaku_core::config::AppConfig;
use danmaku_core::models::ChosenFile;
use danmaku_core::normalize::NormalizeOptions;
use danmaku_runtime::{RunOutcome, Session};

/// Identify a local video and fetch its danmaku comment stream.
#[derive(Debug, Parser)]
#[command(name = "danmaku", version)]
struct Cli {
    /// Video file to identify.
    file: PathBuf,

    /// Config file to use instead of the per-user one.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the playback JSON here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Honour the raw display-mode code (top/bottom) of each comment.
    #[arg(long)]
    respect_mode: bool,

    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "danmaku=debug" } else { "danmaku=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppConfig::load().context("loading config")?,
    };
    let options = NormalizeOptions {
        respect_raw_mode: cli.respect_mode || config.comments.respect_raw_mode,
    };

    let client = DandanClient::from_config(&config.api).context("building HTTP client")?;
    // Both services live behind the same host; share one connection pool.
    let comments = client.clone();
    let session = Session::new(
        client,
        comments,
        Box::new(sink::TerminalStatus),
        Box::new(sink::LoggedPlayback),
    )
    .with_options(options);

    let file = ChosenFile::from_path(&cli.file)
        .await
        .with_context(|| format!("opening {}", cli.file.display()))?;

    match session.on_file_chosen(file).await {
        RunOutcome::Ready(ready) => {
            let json = serde_json::to_string_pretty(ready.playback.as_ref())?;
            match &cli.output {
                Some(path) => std::fs::write(path, json)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{json}"),
            }
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::Failed(err) => {
            tracing::error!(error = %err, "Pipeline failed");
            Ok(ExitCode::FAILURE)
        }
        RunOutcome::Superseded { .. } => Ok(ExitCode::FAILURE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from([
            "danmaku",
            "episode.mkv",
            "--output",
            "out.json",
            "--respect-mode",
        ])
        .unwrap();
        assert_eq!(cli.file, PathBuf::from("episode.mkv"));
        assert_eq!(cli.output, Some(PathBuf::from("out.json")));
        assert!(cli.respect_mode);
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_file_is_required() {
        assert!(Cli::try_parse_from(["danmaku"]).is_err());
    }
}
