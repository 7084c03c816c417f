//! Error-code map backing the error extraction stage
//!
//! The map lives in a JSON file of the form `{"0": "message", "1": ...}`.
//! Extraction scans sources for `invariant(condition, "message")` calls and
//! assigns every message not seen before the next free code. The updated map
//! is written back with `save` once the build session is over.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use indexmap::IndexMap;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{BuildError, Result};

static INVARIANT_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\binvariant\s*\(\s*[^,()]*(?:\([^()]*\)[^,()]*)*,\s*(?:"((?:[^"\\\n]|\\.)*)"|'((?:[^'\\\n]|\\.)*)')"#,
    )
    .expect("valid invariant pattern")
});

#[derive(Debug)]
pub struct ErrorCodeMap {
    path: PathBuf,
    /// message -> code, in code order
    codes: Mutex<IndexMap<String, u32>>,
}

impl ErrorCodeMap {
    /// Load the map, failing if the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(BuildError::ResourceNotFound {
                what: "error code map",
                path: path.to_path_buf(),
            });
        }

        let contents = fs::read_to_string(path).map_err(|source| BuildError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let by_code: IndexMap<String, String> =
            serde_json::from_str(&contents).map_err(|source| BuildError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        let mut codes = IndexMap::with_capacity(by_code.len());
        for (code, message) in by_code {
            let code = code.parse::<u32>().map_err(|_| {
                BuildError::configuration(format!(
                    "error code `{code}` in {} is not a number",
                    path.display()
                ))
            })?;
            codes.insert(message, code);
        }
        debug!("Loaded {} error codes from {}", codes.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            codes: Mutex::new(codes),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record every invariant message in `source`, returning how many were new
    pub fn record_from_source(&self, source: &str) -> usize {
        let mut codes = self.lock();
        let mut added = 0;
        for captures in INVARIANT_CALL.captures_iter(source) {
            let Some(message) = captures.get(1).or_else(|| captures.get(2)) else {
                continue;
            };
            if codes.contains_key(message.as_str()) {
                continue;
            }
            let next = codes.values().max().map_or(0, |max| max + 1);
            codes.insert(message.as_str().to_owned(), next);
            added += 1;
        }
        added
    }

    pub fn code_for(&self, message: &str) -> Option<u32> {
        self.lock().get(message).copied()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Write the map back to the file it was loaded from
    pub fn save(&self) -> Result<()> {
        let by_code: IndexMap<String, String> = self
            .lock()
            .iter()
            .map(|(message, code)| (code.to_string(), message.clone()))
            .collect();
        let mut json = serde_json::to_string_pretty(&by_code).map_err(|source| BuildError::Json {
            path: self.path.clone(),
            source,
        })?;
        json.push('\n');
        fs::write(&self.path, json).map_err(|source| BuildError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!("Wrote {} error codes to {}", by_code.len(), self.path.display());
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<String, u32>> {
        self.codes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn write_map(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("codes.json");
        fs::write(&path, contents).expect("write codes.json");
        path
    }

    #[test]
    fn test_missing_file_is_resource_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let err = ErrorCodeMap::load(&temp_dir.path().join("codes.json")).unwrap_err();
        assert!(err.is_resource_not_found());
    }

    #[test]
    fn test_records_new_messages_with_increasing_codes() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_map(&temp_dir, r#"{"0": "Already known"}"#);
        let map = ErrorCodeMap::load(&path).unwrap();

        let source = r#"
            invariant(ready, "Already known");
            invariant(isValid(x), 'Expected %s to be valid');
            invariant(count > 0, "Count must be positive");
            invariant(count > 0, "Count must be positive");
        "#;
        assert_eq!(map.record_from_source(source), 2);
        assert_eq!(map.code_for("Already known"), Some(0));
        assert_eq!(map.code_for("Expected %s to be valid"), Some(1));
        assert_eq!(map.code_for("Count must be positive"), Some(2));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_save_round_trips_through_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_map(&temp_dir, "{}");
        let map = ErrorCodeMap::load(&path).unwrap();
        map.record_from_source("invariant(false, 'Broken');");
        map.save().unwrap();

        let reloaded = ErrorCodeMap::load(&path).unwrap();
        assert_eq!(reloaded.code_for("Broken"), Some(0));
    }

    #[test]
    fn test_non_numeric_codes_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_map(&temp_dir, r#"{"abc": "message"}"#);
        assert!(ErrorCodeMap::load(&path).unwrap_err().is_configuration());
    }
}
