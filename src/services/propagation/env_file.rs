use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A persisted `KEY=value` configuration file.
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
}

impl EnvFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads one value. A missing file reads as empty.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = match dotenvy::from_path_iter(&self.path) {
            Ok(entries) => entries,
            Err(e) if e.not_found() => return Ok(None),
            Err(e) => {
                return Err(Error::Configuration(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        let mut found = None;
        for entry in entries {
            let (k, v) = entry.map_err(|e| {
                Error::Configuration(format!("Malformed line in {}: {e}", self.path.display()))
            })?;
            if k == key {
                // Later assignments win, same as a shell would
                found = Some(v);
            }
        }
        Ok(found.filter(|v| !v.trim().is_empty()))
    }

    /// Appends `KEY=value` on its own line, creating the file if needed.
    pub fn append(&self, key: &str, value: &str) -> Result<()> {
        let needs_newline = match fs::read_to_string(&self.path) {
            Ok(existing) => !existing.is_empty() && !existing.ends_with('\n'),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let prefix = if needs_newline { "\n" } else { "" };
        file.write_all(format!("{prefix}{key}={value}\n").as_bytes())?;
        Ok(())
    }

    /// Replaces every assignment of each key, appending keys that are not present yet.
    pub fn upsert(&self, entries: &[(&str, String)]) -> Result<()> {
        let existing = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let updated = upsert_entries(&existing, entries);
        if updated != existing {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&self.path, updated)?;
        }
        Ok(())
    }
}

fn assigned_key(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return None;
    }
    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    let (key, _) = trimmed.split_once('=')?;
    Some(key.trim())
}

/// Pure rewrite behind [`EnvFile::upsert`].
pub fn upsert_entries(content: &str, entries: &[(&str, String)]) -> String {
    let mut seen = vec![false; entries.len()];
    let mut lines: Vec<String> = content
        .lines()
        .map(|line| {
            let Some(key) = assigned_key(line) else {
                return line.to_string();
            };
            match entries.iter().position(|(k, _)| *k == key) {
                Some(index) => {
                    seen[index] = true;
                    format!("{}={}", entries[index].0, entries[index].1)
                }
                None => line.to_string(),
            }
        })
        .collect();

    for (index, (key, value)) in entries.iter().enumerate() {
        if !seen[index] {
            lines.push(format!("{key}={value}"));
        }
    }

    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
