//! Per-run audit logs.
//!
//! Every script writes to a named channel: `<dir>/<channel>.log`, one line per entry in the
//! form `"<ISO8601> - <message>"`. Messages are mirrored to the console through `tracing`.

use chrono::{SecondsFormat, Utc};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const DEFAULT_LOG_DIR: &str = "logs";

/// Channel that collects failures from every script.
pub const ERROR_CHANNEL: &str = "error";

pub struct RunLog {
    dir: PathBuf,
    // Serializes appends so concurrent writers never interleave partial lines.
    write_lock: Mutex<()>,
}

impl RunLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, channel: &str) -> PathBuf {
        self.dir.join(format!("{channel}.log"))
    }

    /// Appends one timestamped line to the channel and mirrors the message to the console.
    pub fn log(&self, channel: &str, message: &str) -> io::Result<()> {
        tracing::info!(target: "zkpay::run", channel, "{}", message);

        let line = format!(
            "{} - {}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            message
        );

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        fs::create_dir_all(&self.dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(channel))?;
        file.write_all(line.as_bytes())
    }

    /// Truncates the channel's log file, creating it if needed.
    pub fn clear(&self, channel: &str) -> io::Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(channel), "")
    }

    /// Borrows a handle that always writes to `channel`.
    pub fn channel<'a>(&'a self, channel: &'a str) -> Channel<'a> {
        Channel { log: self, channel }
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_DIR)
    }
}

/// A `RunLog` bound to one channel.
#[derive(Clone, Copy)]
pub struct Channel<'a> {
    log: &'a RunLog,
    channel: &'a str,
}

impl<'a> Channel<'a> {
    pub fn name(&self) -> &'a str {
        self.channel
    }

    pub fn log(&self, message: impl AsRef<str>) -> io::Result<()> {
        self.log.log(self.channel, message.as_ref())
    }

    pub fn clear(&self) -> io::Result<()> {
        self.log.clear(self.channel)
    }

    pub fn run_log(&self) -> &'a RunLog {
        self.log
    }
}
