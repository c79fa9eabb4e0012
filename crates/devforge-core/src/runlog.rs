//! Per-run provisioning log
//!
//! Every `provision` run appends `[timestamp] [LEVEL] message` lines to a
//! timestamp-named file under the log directory and mirrors them to the
//! console, color-coded by level. The file handle is opened once and held
//! for the process lifetime; dropping the log closes it on any exit path.

use crate::error::Result;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use console::style;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;
use tracing::debug;

/// Log levels carried in the per-run file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl LogLevel {
    fn label(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Success => "SUCCESS",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Run-scoped log writer
pub struct RunLog {
    file: Mutex<File>,
    path: Utf8PathBuf,
}

impl RunLog {
    /// Open a fresh log file named by the run's start timestamp.
    ///
    /// Timestamp-named files mean repeated runs never overwrite each other.
    pub fn open(log_dir: &Utf8Path) -> Result<Self> {
        Self::open_at(log_dir, Utc::now())
    }

    /// Open with an explicit start timestamp (tests pin this)
    pub fn open_at(log_dir: &Utf8Path, started: DateTime<Utc>) -> Result<Self> {
        std::fs::create_dir_all(log_dir)?;

        let filename = format!("provision-{}.log", started.format("%Y%m%dT%H%M%SZ"));
        let path = log_dir.join(filename);

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!("Opened run log: {}", path);

        Ok(Self {
            file: Mutex::new(file),
            path,
        })
    }

    /// Append one leveled line to the file and mirror it to the console
    pub fn log(&self, level: LogLevel, message: &str) {
        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        let line = format!("[{}] [{}] {}", timestamp, level, message);

        // Console mirror, color-coded by level
        match level {
            LogLevel::Info => println!("{} {}", style("ℹ").blue().bold(), message),
            LogLevel::Warning => eprintln!("{} {}", style("⚠").yellow().bold(), message),
            LogLevel::Error => eprintln!("{} {}", style("✗").red().bold(), message),
            LogLevel::Success => println!("{} {}", style("✓").green().bold(), message),
        }

        // A poisoned lock or failed write must never take down the run
        if let Ok(mut file) = self.file.lock() {
            if let Err(e) = writeln!(file, "{}", line) {
                debug!("Failed to append to run log: {}", e);
            }
        }
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    pub fn success(&self, message: &str) {
        self.log(LogLevel::Success, message);
    }

    /// Path of this run's log file
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}
