use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use toolset_core::ports::{LogArchive, Result};
use toolset_core::utils::{format_file_stamp, sanitize_filename};
use tracing::debug;

/// Placeholder that keeps the log directory from being listed when it sits
/// under a web-served upload area
const INDEX_FILE: &str = "index.html";

/// Upper bound on `-N` suffixes tried when a file name is already taken
const MAX_SUFFIX: u32 = 1000;

/// Writes each run log to its own file, `<prefix>-<YYYY-MM-DD_HHMMSS>.log`
pub struct FileLogArchive {
    log_dir: PathBuf,
    prefix: String,
}

impl FileLogArchive {
    pub fn new(log_dir: impl Into<PathBuf>, prefix: &str) -> Self {
        Self {
            log_dir: log_dir.into(),
            prefix: sanitize_filename(prefix),
        }
    }

    /// Archived log files, sorted by name
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        if !self.log_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut logs = fs::read_dir(&self.log_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "log"))
            .collect::<Vec<_>>();
        logs.sort();
        Ok(logs)
    }

    /// Creates the directory and its placeholder on first use
    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.log_dir)?;

        let index = self.log_dir.join(INDEX_FILE);
        if !index.exists() {
            fs::write(index, "")?;
        }
        Ok(())
    }

    fn file_name(&self, stamp: &str, attempt: u32) -> String {
        if attempt == 0 {
            format!("{}-{}.log", self.prefix, stamp)
        } else {
            format!("{}-{}-{}.log", self.prefix, stamp, attempt)
        }
    }
}

impl LogArchive for FileLogArchive {
    fn archive(&self, started_at: DateTime<Utc>, contents: &str) -> Result<PathBuf> {
        self.ensure_dir()?;

        let stamp = format_file_stamp(started_at);
        let mut attempt = 0;
        loop {
            let path = self.log_dir.join(self.file_name(&stamp, attempt));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(contents.as_bytes())?;
                    debug!(path = %path.display(), "Run log written");
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < MAX_SUFFIX => {
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn purge(&self) -> Result<()> {
        match fs::remove_dir_all(&self.log_dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
