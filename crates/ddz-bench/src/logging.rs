use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{Level, event};
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, format::FmtSpan};

use crate::config::{LoggingConfig, ResolvedOutputs};

pub const TELEMETRY_FILE: &str = "telemetry.jsonl";

/// Keeps the background writer alive; dropping it flushes pending events.
pub struct LoggingGuard {
    _worker: WorkerGuard,
    pub telemetry_path: PathBuf,
}

/// Telemetry lands beside the markdown summary.
pub fn telemetry_dir(outputs: &ResolvedOutputs) -> PathBuf {
    match outputs.summary_md.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// `RUST_LOG` wins over the configured level.
fn env_filter_or(fallback: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback.as_str()))
}

fn open_telemetry_file(dir: &Path) -> Result<(File, PathBuf)> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating telemetry directory at {}", dir.display()))?;
    let path = dir.join(TELEMETRY_FILE);
    let file = File::create(&path)
        .with_context(|| format!("creating telemetry file at {}", path.display()))?;
    Ok((file, path))
}

/// Installs the JSON subscriber for a batch run, or does nothing when
/// structured logging is off.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
    run_id: &str,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    let (file, telemetry_path) = open_telemetry_file(&telemetry_dir(outputs))?;
    let (writer, worker) = NonBlockingBuilder::default().lossy(false).finish(file);

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter_or(logging.level().unwrap_or(Level::INFO)))
        .json()
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    // Tests may have installed a global subscriber already.
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        event!(
            target: "ddz_bench::play",
            Level::INFO,
            run_id,
            telemetry = %telemetry_path.display(),
            "telemetry_started"
        );
    }

    Ok(Some(LoggingGuard {
        _worker: worker,
        telemetry_path,
    }))
}

/// Plain stderr logging for one-shot solves.
pub fn init_console_logging() {
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter_or(Level::WARN))
        .with_writer(io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::{TELEMETRY_FILE, init_logging, telemetry_dir};
    use crate::config::{LoggingConfig, ResolvedOutputs};
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn telemetry_sits_beside_the_summary() {
        let dir = tempdir().expect("temp dir");
        let outputs = ResolvedOutputs {
            jsonl: dir.path().join("games.jsonl"),
            summary_md: dir.path().join("out").join("summary.md"),
        };
        assert_eq!(telemetry_dir(&outputs), dir.path().join("out"));

        let bare = ResolvedOutputs {
            jsonl: PathBuf::from("games.jsonl"),
            summary_md: PathBuf::from("summary.md"),
        };
        assert_eq!(telemetry_dir(&bare), PathBuf::from("."));

        let disabled = LoggingConfig::default();
        assert!(init_logging(&disabled, &outputs, "unit").expect("init").is_none());

        let enabled = LoggingConfig {
            enable_structured: true,
            ..LoggingConfig::default()
        };
        let guard = init_logging(&enabled, &outputs, "unit")
            .expect("init")
            .expect("guard");
        assert_eq!(guard.telemetry_path, dir.path().join("out").join(TELEMETRY_FILE));
        assert!(guard.telemetry_path.exists());
    }
}
