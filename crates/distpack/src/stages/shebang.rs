//! Shebang extraction stage

use std::sync::Arc;

use super::{Stage, TransformResult};
use crate::shebang::ShebangCache;

/// Strips interpreter directives and records them in the session cache
///
/// This is the only stage that touches the cache. Each run strips at most
/// one directive, the one at the very start of the module.
#[derive(Debug)]
pub struct ShebangStage {
    package: String,
    cache: Arc<ShebangCache>,
}

impl ShebangStage {
    pub fn new(package: impl Into<String>, cache: Arc<ShebangCache>) -> Self {
        Self {
            package: package.into(),
            cache,
        }
    }
}

impl Stage for ShebangStage {
    fn name(&self) -> &'static str {
        "shebang"
    }

    fn transform(&self, code: &str, _id: &str) -> anyhow::Result<TransformResult> {
        let (code, _directive) = self.cache.extract(&self.package, code);
        Ok(TransformResult::new(code))
    }
}
