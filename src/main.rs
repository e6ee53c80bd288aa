//! langsettings binary entrypoint kept minimal. The session lives in `app`.

use std::fmt;
use std::process::ExitCode;
use std::sync::{Arc, OnceLock};

use clap::Parser;

use langsettings::LanguageSettings;
use langsettings::args::{self, Args};
use langsettings::config;
use langsettings::sources::{MemoryBackend, Services, load_fixture};

/// Log timestamp formatter (`YYYY-MM-DD-T HH:MM:SS`, local time).
struct LangSettingsTimer;

impl tracing_subscriber::fmt::time::FormatTime for LangSettingsTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let ts = chrono::Local::now()
            .format("%Y-%m-%d-T %H:%M:%S")
            .to_string();
        w.write_str(&ts)
    }
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// What: Initialize tracing, preferring the log file over stderr.
///
/// Inputs:
/// - `level`: Default filter when `RUST_LOG` is unset.
fn init_logging(level: &str) {
    let mut log_path = config::logs_dir();
    log_path.push("langsettings.log");
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_timer(LangSettingsTimer)
                .init();
            let _ = LOG_GUARD.set(guard);
            tracing::info!(path = %log_path.display(), "logging initialized");
        }
        Err(e) => {
            // Fallback: stderr keeps stdout clean for the JSON output
            let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(true)
                .with_writer(std::io::stderr)
                .with_timer(LangSettingsTimer)
                .init();
            tracing::warn!(error = %e, "failed to open log file; using stderr");
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args::determine_log_level(&args));
    tracing::info!("langsettings starting");

    let ops = match args.operations() {
        Ok(ops) => ops,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };
    let settings = config::load_settings(args.config.as_deref());

    let backend = Arc::new(MemoryBackend::new());
    if let Some(path) = &args.fixture {
        match load_fixture(path) {
            Ok(fixture) => backend.load(fixture),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to load fixture");
                eprintln!("error: cannot load fixture {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    let session = LanguageSettings::connect(Services::from_backend(&backend), settings);
    if let Err(e) = session.ready().await {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }
    let refused = match args::process_args(&ops, &session).await {
        Ok(refused) => refused,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    for (op, e) in &refused {
        eprintln!("refused {op:?}: {e}");
    }

    let code = match session.model() {
        Some(state) => match serde_json::to_string_pretty(state.as_ref()) {
            Ok(json) => {
                println!("{json}");
                if refused.is_empty() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(1)
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize model");
                ExitCode::FAILURE
            }
        },
        None => ExitCode::FAILURE,
    };
    session.shutdown().await;
    tracing::info!("langsettings exited");
    code
}
