use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{AppServices, ClientConfig};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;
use ui::{App, build_app_context};

/// Desktop client for the online exam platform.
#[derive(Parser, Debug)]
#[command(name = "exam-desk")]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the backend API, e.g. http://localhost:8000/api/v1
    #[arg(long, value_name = "URL", env = "EXAM_API_URL")]
    api_url: Option<String>,

    /// SQLite database holding the stored session
    #[arg(long = "db", value_name = "SQLITE_URL", env = "EXAM_DB_URL")]
    db_url: Option<String>,

    /// Quiet period before an edited answer is saved, in milliseconds
    #[arg(long, value_name = "MS", env = "EXAM_AUTOSAVE_MS")]
    autosave_ms: Option<u64>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn client_config(&self) -> Result<ClientConfig, StartupError> {
        let mut config = ClientConfig::from_env();
        if let Some(url) = self.api_url.as_deref() {
            let url = url.trim();
            if url.is_empty() {
                return Err(StartupError::InvalidApiUrl(url.to_string()));
            }
            config = config.with_api_base_url(url.trim_end_matches('/'));
        }
        if let Some(db_url) = self.db_url.clone() {
            if db_url.trim().is_empty() {
                return Err(StartupError::InvalidDbUrl(db_url));
            }
            config = config.with_db_url(db_url);
        }
        if let Some(ms) = self.autosave_ms {
            config = config.with_autosave_debounce(Duration::from_millis(ms));
        }
        let db_url = normalize_sqlite_url(&config.db_url);
        Ok(config.with_db_url(db_url))
    }
}

#[derive(Debug, Error)]
enum StartupError {
    #[error("invalid --api-url value: {0:?}")]
    InvalidApiUrl(String),
    #[error("invalid --db value: {0:?}")]
    InvalidDbUrl(String),
    #[error("could not prepare database file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Services(#[from] services::AppServicesError),
}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_string();
    }

    let path = Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), StartupError> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| StartupError::InvalidDbUrl(db_url.to_string()))?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(StartupError::InvalidDbUrl(db_url.to_string()));
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

async fn run(args: Args) -> Result<(), StartupError> {
    let config = args.client_config()?;
    info!(api = %config.api_base_url, db = %config.db_url, "starting exam desk");

    // Open + migrate SQLite at startup; a stored credential is restored here.
    prepare_sqlite_file(&config.db_url)?;
    let services = AppServices::new_sqlite(config).await?;
    let context = build_app_context(&services);

    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Exam Desk")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run(args).await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
