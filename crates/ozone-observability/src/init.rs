// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for Ozone
//!
//! Console output is always installed. With the `file-logging` feature and
//! `file_output` set, JSON logs are also written to a timestamped run folder:
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       ├── ozone-neural.log
//!       ├── ozone-config.log
//!       └── ozone.log (combined)
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingOptions};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps file writers alive; logs are flushed when this is dropped
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder receiving log files, if file output is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Install the global tracing subscriber
///
/// # Arguments
/// * `debug_flags` - Crates to raise to debug level
/// * `options` - Base level, format and file output settings
///
/// # Errors
///
/// Fails if the level does not parse as a filter, the log folder cannot be
/// created, or a global subscriber is already installed
pub fn init_logging(debug_flags: &CrateDebugFlags, options: &LoggingOptions) -> Result<LoggingGuard> {
    let filter = debug_flags.to_filter_string(&options.level);
    let mut layers: Vec<BoxedLayer> = vec![console_layer(options.format, build_filter(&filter)?)];

    #[cfg(feature = "file-logging")]
    let (file_guards, log_dir) = if options.file_output {
        let (guards, run_folder) = file::add_layers(&mut layers, &filter, options)?;
        (guards, Some(run_folder))
    } else {
        (Vec::new(), None)
    };
    #[cfg(not(feature = "file-logging"))]
    let log_dir: Option<PathBuf> = None;

    Registry::default()
        .with(layers)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if options.file_output && !cfg!(feature = "file-logging") {
        tracing::warn!(
            target: "ozone_observability",
            "[LOGGING] file_output requested but built without the file-logging feature"
        );
    }
    tracing::debug!(target: "ozone_observability", "[LOGGING] Filter: {}", filter);

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guards: file_guards,
        log_dir,
    })
}

/// Initialize console logging at `info` with the given debug flags
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    init_logging(debug_flags, &LoggingOptions::default())
}

fn build_filter(filter: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(filter).with_context(|| format!("Invalid log filter '{}'", filter))
}

fn console_layer(format: LogFormat, filter: EnvFilter) -> BoxedLayer {
    match format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .json()
            .with_filter(filter)
            .boxed(),
    }
}

#[cfg(feature = "file-logging")]
mod file {
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result};
    use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
    use tracing_appender::non_blocking::WorkerGuard;
    use tracing_appender::rolling;
    use tracing_subscriber::Layer;

    use super::{build_filter, BoxedLayer};
    use crate::config::LoggingOptions;

    const RUN_PREFIX: &str = "run_";
    const RUN_FORMAT: &str = "%Y%m%d_%H%M%S";

    /// Create the run folder, prune old runs and push one layer per known crate
    /// plus a combined layer
    pub(super) fn add_layers(
        layers: &mut Vec<BoxedLayer>,
        filter: &str,
        options: &LoggingOptions,
    ) -> Result<(Vec<WorkerGuard>, PathBuf)> {
        let timestamp = Utc::now().format(RUN_FORMAT);
        let run_folder = options.log_dir.join(format!("{}{}", RUN_PREFIX, timestamp));
        std::fs::create_dir_all(&run_folder)
            .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

        cleanup_old_logs(&options.log_dir, options.retention_days, options.retention_runs)?;

        let mut guards = Vec::new();
        for crate_name in crate::KNOWN_CRATES {
            let appender = rolling::daily(&run_folder, format!("{}.log", crate_name));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            guards.push(guard);

            let target = crate_name.replace('-', "_");
            layers.push(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_file(true)
                    .with_line_number(true)
                    .json()
                    .with_filter(build_filter(&format!("{}=debug,off", target))?)
                    .boxed(),
            );
        }

        let combined = rolling::daily(&run_folder, "ozone.log");
        let (writer, guard) = tracing_appender::non_blocking(combined);
        guards.push(guard);
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(build_filter(filter)?)
                .boxed(),
        );

        Ok((guards, run_folder))
    }

    fn run_started(path: &Path) -> Option<DateTime<Utc>> {
        let name = path.file_name()?.to_str()?;
        let stamp = name.strip_prefix(RUN_PREFIX)?;
        let naive = NaiveDateTime::parse_from_str(stamp, RUN_FORMAT).ok()?;
        Some(Utc.from_utc_datetime(&naive))
    }

    /// Remove run folders older than `retention_days`, then all but the
    /// newest `retention_runs`. Returns how many folders were removed.
    pub(super) fn cleanup_old_logs(base_log_dir: &Path, retention_days: u64, retention_runs: usize) -> Result<usize> {
        if !base_log_dir.exists() {
            return Ok(0);
        }

        let mut runs: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();
        for entry in std::fs::read_dir(base_log_dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            if let Some(started) = run_started(&path) {
                runs.push((path, started));
            }
        }

        // Newest first
        runs.sort_by(|a, b| b.1.cmp(&a.1));
        let cutoff = Utc::now() - chrono::Duration::days(retention_days as i64);

        let mut removed = 0;
        for (kept, (path, started)) in runs.iter().enumerate() {
            if *started >= cutoff && kept < retention_runs {
                continue;
            }
            match std::fs::remove_dir_all(path) {
                Ok(()) => removed += 1,
                // Subscriber is not installed yet
                Err(e) => eprintln!("Warning: Failed to remove old log directory {}: {}", path.display(), e),
            }
        }
        Ok(removed)
    }

}
