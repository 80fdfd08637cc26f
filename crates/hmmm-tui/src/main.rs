mod app;
mod keymap;
mod render;
mod theme;
mod widgets;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use hmmm_core::broadcast::XClient;
use hmmm_core::config::Config;
use hmmm_core::feed::{retrieve_categories, ArxivFeed};
use hmmm_core::{platform, CurationState};

const EXIT_CONFIG: u8 = 1;
const EXIT_DISPLAY: u8 = 2;
const EXIT_FEED: u8 = 3;
const EXIT_BROADCAST: u8 = 4;

/// Pick the week's interesting arXiv papers and share them as a thread.
#[derive(Parser, Debug)]
#[command(name = "hmmm", version, about)]
struct Cli {
    /// arXiv categories to list, e.g. `cs.LG q-fin` (defaults to the configured ones)
    categories: Vec<String>,
}

/// A setup failure and the exit code it maps to.
struct Fatal {
    code: u8,
    error: anyhow::Error,
}

trait OrExit<T> {
    fn or_exit(self, code: u8) -> Result<T, Fatal>;
}

impl<T, E: Into<anyhow::Error>> OrExit<T> for Result<T, E> {
    fn or_exit(self, code: u8) -> Result<T, Fatal> {
        self.map_err(|e| Fatal {
            code,
            error: e.into(),
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(fatal) => {
            tracing::error!("exiting with code {}: {:#}", fatal.code, fatal.error);
            eprintln!("hmmm: {:#}", fatal.error);
            ExitCode::from(fatal.code)
        }
    }
}

async fn run(cli: Cli) -> Result<(), Fatal> {
    let log_path = init_logging().or_exit(EXIT_CONFIG)?;
    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("hmmm log: {}", log_path.display());
    tracing::info!("hmmm starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = Config::load()
        .with_context(|| format!("config {}", Config::config_path().display()))
        .or_exit(EXIT_CONFIG)?;

    let categories = if cli.categories.is_empty() {
        config.feed.default_categories.clone()
    } else {
        cli.categories
    };
    tracing::info!(?categories, "categories selected");

    // ── Broadcast client ─────────────────────────────────────────────────────
    let client = XClient::new(
        config.broadcast.api_base.clone(),
        config.broadcast.access_token.clone(),
    )
    .context("unable to build broadcast client")
    .or_exit(EXIT_BROADCAST)?;

    // ── Fetch listings ───────────────────────────────────────────────────────
    let feed = ArxivFeed::new(config.feed.base_url.clone())
        .context("unable to build feed client")
        .or_exit(EXIT_FEED)?;
    eprintln!("fetching {} …", categories.join(" "));
    let rows = retrieve_categories(&feed, &categories)
        .await
        .context("unable to fetch paper listings")
        .or_exit(EXIT_FEED)?;

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let state = CurationState::new(rows, categories);
    let app = app::App::new(
        Box::new(feed),
        Box::new(client),
        config.broadcast.template(),
        config.broadcast.pacing(),
        config.export.dir.clone(),
    );
    app.run(state).await.or_exit(EXIT_DISPLAY)?;

    tracing::info!("hmmm exited");
    Ok(())
}

fn init_logging() -> anyhow::Result<PathBuf> {
    let log_path = platform::log_path();
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir).with_context(|| format!("unable to create {}", dir.display()))?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("unable to open {}", log_path.display()))?;

    // Allow RUST_LOG override; keep HTTP client internals quiet by default.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    Ok(log_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_accepts_categories() {
        let cli = Cli::parse_from(["hmmm", "cs.LG", "q-fin"]);
        assert_eq!(cli.categories, vec!["cs.LG", "q-fin"]);
        let cli = Cli::parse_from(["hmmm"]);
        assert!(cli.categories.is_empty());
    }

    #[test]
    fn test_cli_rejects_flags() {
        assert!(Cli::try_parse_from(["hmmm", "--verbose"]).is_err());
    }

    #[test]
    fn test_or_exit_carries_code() {
        let failed: Result<(), std::io::Error> = Err(std::io::Error::other("boom"));
        let fatal = failed.or_exit(EXIT_FEED).unwrap_err();
        assert_eq!(fatal.code, 3);
        assert_eq!(fatal.error.to_string(), "boom");
    }
}
