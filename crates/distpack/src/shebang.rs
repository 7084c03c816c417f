//! Session-scoped store of interpreter directives
//!
//! The shebang stage strips `#!...` lines before the source reaches the
//! compiler and records them here, keyed by package name, so a later
//! packaging step can put them back on the emitted artifact.
//!
//! One cache is created per build session and shared between the format
//! builds of that session. Writes for the same package overwrite each other;
//! when formats build concurrently the last writer wins.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

static SHEBANG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A#!([^\r\n]*)(\r?\n)?").expect("valid shebang pattern"));

#[derive(Debug, Default)]
pub struct ShebangCache {
    directives: Mutex<FxHashMap<String, String>>,
}

impl ShebangCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strip a leading interpreter directive from `source` and record it
    ///
    /// Returns the stripped source and the directive (empty when the source
    /// has none). The entry for `package` is always overwritten.
    pub fn extract(&self, package: &str, source: &str) -> (String, String) {
        let (stripped, directive) = match SHEBANG.captures(source) {
            Some(captures) => {
                let whole = captures.get(0).map_or(0, |m| m.end());
                let directive = format!("#!{}", &captures[1]);
                (source[whole..].to_owned(), directive)
            }
            None => (source.to_owned(), String::new()),
        };

        trace!("Recording shebang {directive:?} for package {package}");
        self.lock().insert(package.to_owned(), directive.clone());
        (stripped, directive)
    }

    /// Directive recorded for `package`, if its sources were processed
    pub fn lookup(&self, package: &str) -> Option<String> {
        self.lock().get(package).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic mid-insert cannot leave the map inconsistent, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, FxHashMap<String, String>> {
        self.directives
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
