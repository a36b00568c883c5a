//! Structured logging for wavegraph using the tracing crate.
//!
//! Logs go to daily-rotated files under the XDG state directory, never to the
//! terminal, which belongs to the TUI. Only the 7 most recent files are kept.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::rolling;
use tracing_subscriber::prelude::*;

pub const LOG_FILE_PREFIX: &str = "wavegraph.log";

const MAX_LOG_FILES: usize = 7;

/// Keeps the non-blocking writer alive for the program lifetime.
static APPENDER_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Initializes file logging.
///
/// Log level comes from `RUST_LOG` and defaults to "info".
///
/// # Errors
/// - If the log directory cannot be determined or created
/// - If logging was already initialized
pub fn init_logging() -> anyhow::Result<()> {
    let log_dir = get_log_dir()?;
    fs::create_dir_all(&log_dir)?;

    if let Err(e) = cleanup_old_logs(&log_dir) {
        eprintln!("Warning: Failed to cleanup old logs: {e}");
    }

    let file_appender = rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    APPENDER_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Logging already initialized"))?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_level(true)
                .with_thread_names(true)
                .with_ansi(false),
        )
        .init();

    tracing::debug!("Logging initialized. Log dir: {}", log_dir.display());
    Ok(())
}

/// Log directory: `$XDG_STATE_HOME/wavegraph`, else `~/.local/state/wavegraph`.
///
/// # Errors
/// - If the home directory cannot be determined
pub fn get_log_dir() -> anyhow::Result<PathBuf> {
    match std::env::var("XDG_STATE_HOME") {
        Ok(xdg_state) if !xdg_state.is_empty() => Ok(PathBuf::from(xdg_state).join("wavegraph")),
        _ => {
            let home = dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
            Ok(home.join(".local/state/wavegraph"))
        }
    }
}

/// Rotated log files in `log_dir`, newest first.
pub fn rotated_log_files(log_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut log_files: Vec<_> = fs::read_dir(log_dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let file_name = path.file_name()?.to_str()?;
            if !file_name.starts_with(LOG_FILE_PREFIX) {
                return None;
            }
            let modified = fs::metadata(&path).ok()?.modified().ok()?;
            Some((path, modified))
        })
        .collect();

    log_files.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(log_files.into_iter().map(|(path, _)| path).collect())
}

/// Removes all but the [`MAX_LOG_FILES`] newest dated log files.
fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<()> {
    let dated = rotated_log_files(log_dir)?
        .into_iter()
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.len() > LOG_FILE_PREFIX.len() && n.matches('-').count() == 2)
        });

    for path in dated.skip(MAX_LOG_FILES) {
        if let Err(e) = fs::remove_file(&path) {
            tracing::warn!("Failed to delete old log file {}: {}", path.display(), e);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, age_secs: u64) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "line\n").unwrap();
        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
            .unwrap();
        path
    }

    #[test]
    fn test_rotated_files_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "wavegraph.log.2026-01-01", 300);
        touch(temp_dir.path(), "wavegraph.log.2026-01-03", 100);
        touch(temp_dir.path(), "other.txt", 0);

        let files = rotated_log_files(temp_dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["wavegraph.log.2026-01-03", "wavegraph.log.2026-01-01"]);
    }

    #[test]
    fn test_cleanup_keeps_seven_newest() {
        let temp_dir = TempDir::new().unwrap();
        for day in 1..=9u64 {
            touch(
                temp_dir.path(),
                &format!("wavegraph.log.2026-02-0{day}"),
                (10 - day) * 60,
            );
        }

        cleanup_old_logs(temp_dir.path()).unwrap();

        let remaining = rotated_log_files(temp_dir.path()).unwrap();
        assert_eq!(remaining.len(), 7);
        assert!(!temp_dir.path().join("wavegraph.log.2026-02-01").exists());
        assert!(!temp_dir.path().join("wavegraph.log.2026-02-02").exists());
        assert!(temp_dir.path().join("wavegraph.log.2026-02-09").exists());
    }
}
