//! Hour-rotated diagnostics file
//!
//! One line per exhausted dispatch, appended to
//! `{log_dir}/{app_name}.{YYYY-MM-DD-HH}.log` (UTC hour). The hour is taken
//! from the sink's clock once per record, and that same hour names both the
//! file written and the path returned. Each hour gets its own
//! non-rotating [`RollingFileAppender`].

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use sigil_common::time::{hour_bucket, Clock, SystemClock, WALL_CLOCK_FORMAT};
use sigil_core::DiagnosticsSink;
use sigil_domain::constants::DIAGNOSTICS_FILE_SUFFIX;
use sigil_domain::ClientConfig;
use tracing::warn;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// [`DiagnosticsSink`] backed by an hourly rolling file.
///
/// The appender is opened lazily on the first record, so constructing the
/// sink never touches the filesystem. Every failure is logged and dropped.
///
/// Writes are small, synchronous appends and run on the calling thread.
pub struct FileDiagnosticsSink {
    log_dir: PathBuf,
    app_name: String,
    clock: Arc<dyn Clock>,
    appender: Mutex<Option<HourFile>>,
}

/// Appender for one hour bucket.
struct HourFile {
    bucket: String,
    appender: RollingFileAppender,
}

impl FileDiagnosticsSink {
    pub fn new(log_dir: impl Into<PathBuf>, app_name: impl Into<String>) -> Self {
        Self::with_clock(log_dir, app_name, Arc::new(SystemClock))
    }

    /// Sink whose line timestamps and reported paths come from `clock`.
    pub fn with_clock(
        log_dir: impl Into<PathBuf>,
        app_name: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            log_dir: log_dir.into(),
            app_name: app_name.into(),
            clock,
            appender: Mutex::new(None),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.log_dir.clone(), config.app_name.clone())
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// File the current hour's records land in.
    pub fn current_path(&self) -> PathBuf {
        self.path_for(&hour_bucket(self.clock.now()))
    }

    fn file_stem(&self, bucket: &str) -> String {
        format!("{}.{bucket}", self.app_name)
    }

    fn path_for(&self, bucket: &str) -> PathBuf {
        self.log_dir.join(format!("{}.{DIAGNOSTICS_FILE_SUFFIX}", self.file_stem(bucket)))
    }

    fn open(&self, bucket: &str) -> Option<HourFile> {
        RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(self.file_stem(bucket))
            .filename_suffix(DIAGNOSTICS_FILE_SUFFIX)
            .build(&self.log_dir)
            .map(|appender| HourFile { bucket: bucket.to_string(), appender })
            .map_err(|err| {
                warn!(dir = %self.log_dir.display(), error = %err, "cannot open diagnostics file");
            })
            .ok()
    }
}

impl DiagnosticsSink for FileDiagnosticsSink {
    fn record(&self, line: &str) -> Option<PathBuf> {
        let now = self.clock.now();
        let bucket = hour_bucket(now);

        let mut guard = self.appender.lock();
        if guard.as_ref().map_or(true, |file| file.bucket != bucket) {
            *guard = self.open(&bucket);
        }
        let file = guard.as_mut()?;

        let entry = format!("[{}] WARNING: {line}\n", now.format(WALL_CLOCK_FORMAT));
        if let Err(err) =
            file.appender.write_all(entry.as_bytes()).and_then(|()| file.appender.flush())
        {
            warn!(error = %err, "failed to write diagnostics record");
            return None;
        }

        Some(self.path_for(&bucket))
    }
}

impl std::fmt::Debug for FileDiagnosticsSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDiagnosticsSink")
            .field("log_dir", &self.log_dir)
            .field("app_name", &self.app_name)
            .finish_non_exhaustive()
    }
}
