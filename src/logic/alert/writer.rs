//! Alert Disk Log
//!
//! Append-only JSONL log of emitted alerts with automatic size-based
//! rotation. One line per alert; files are never rewritten, matching the
//! append-only contract of the alert store.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use parking_lot::Mutex;
use chrono::Utc;

use super::types::SecurityAlert;
use crate::constants;

const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10 MB

pub struct AlertLog {
    file: Mutex<Option<File>>,
    base_dir: PathBuf,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::from_path(PathBuf::from(constants::get_alert_dir()))
    }

    pub fn from_path(base_dir: PathBuf) -> Self {
        if let Err(e) = fs::create_dir_all(&base_dir) {
            // In test env, log might not be init, use eprintln
            eprintln!("Failed to create alert directory: {}", e);
        }

        Self {
            file: Mutex::new(None),
            base_dir,
        }
    }

    /// Append one alert to the log, rotating when the open file is full
    pub fn append(&self, alert: &SecurityAlert) -> io::Result<()> {
        let mut file_guard = self.file.lock();

        if file_guard.is_none() {
            match self.find_latest_log_file()? {
                Some(path) => {
                    let f = OpenOptions::new().create(true).append(true).open(&path)?;
                    if f.metadata()?.len() < MAX_FILE_SIZE {
                        *file_guard = Some(f);
                    } else {
                        *file_guard = Some(self.create_new_file()?);
                    }
                }
                None => {
                    *file_guard = Some(self.create_new_file()?);
                }
            }
        }

        let should_rotate = match file_guard.as_ref() {
            Some(f) => f.metadata()?.len() >= MAX_FILE_SIZE,
            None => false,
        };
        if should_rotate {
            *file_guard = Some(self.create_new_file()?);
        }

        if let Some(f) = file_guard.as_mut() {
            let line = serde_json::to_string(alert)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }

    fn create_new_file(&self) -> io::Result<File> {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let mut path = self.base_dir.join(format!("alerts_{}.jsonl", stamp));
        // Rotation within the same second must not land back in the full
        // file, so suffix until the name is fresh
        let mut seq = 1u32;
        while path.exists() {
            path = self
                .base_dir
                .join(format!("alerts_{}_{:02}.jsonl", stamp, seq));
            seq += 1;
        }
        OpenOptions::new().create(true).append(true).open(path)
    }

    fn find_latest_log_file(&self) -> io::Result<Option<PathBuf>> {
        if !self.base_dir.exists() {
            return Ok(None);
        }

        let mut logs: Vec<PathBuf> = fs::read_dir(&self.base_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension().map(|e| e == "jsonl").unwrap_or(false)
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .map(|n| n.starts_with("alerts_"))
                        .unwrap_or(false)
            })
            .collect();

        // Timestamped names sort lexicographically
        logs.sort();
        Ok(logs.pop())
    }
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
