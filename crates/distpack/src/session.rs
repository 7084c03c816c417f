//! Build session state shared between format builds
//!
//! A session is created by the caller before the first format is assembled
//! and finished after the last one ran. It owns the only mutable state of a
//! build: the shebang cache and the error-code map.

use std::{path::Path, sync::Arc};

use log::debug;
use once_cell::sync::OnceCell;

use crate::{error::Result, error_codes::ErrorCodeMap, shebang::ShebangCache};

#[derive(Debug, Default)]
pub struct BuildSession {
    shebangs: Arc<ShebangCache>,
    error_codes: OnceCell<Arc<ErrorCodeMap>>,
}

impl BuildSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shebangs(&self) -> &Arc<ShebangCache> {
        &self.shebangs
    }

    /// Error-code map for this session, loaded from `path` on first use
    pub fn error_codes(&self, path: &Path) -> Result<Arc<ErrorCodeMap>> {
        self.error_codes
            .get_or_try_init(|| ErrorCodeMap::load(path).map(Arc::new))
            .cloned()
    }

    /// End the session, persisting the error-code map if one was used
    pub fn finish(self) -> Result<()> {
        if let Some(codes) = self.error_codes.get() {
            codes.save()?;
        }
        debug!("Build session finished with {} shebang entries", self.shebangs.len());
        Ok(())
    }
}
