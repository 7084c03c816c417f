//! Transform stages
//!
//! Every stage exposes a name, the parameters handed to the bundling engine
//! and a transform. Stages backed by an external engine (resolution,
//! compilation, style processing, minification) keep the default identity
//! transform; the engine does the actual work from their parameters. Stages
//! owned by distpack transform the source in-process.

use std::fmt;

use serde_json::Value;

mod babel;
mod commonjs;
mod extract_errors;
mod json;
mod postcss;
mod replace;
mod resolve;
mod shebang;
mod sourcemaps;
mod terser;
mod typescript;

pub use babel::{BabelPlugin, BabelStage, PresetEnv};
pub use commonjs::CommonJsStage;
pub use extract_errors::ExtractErrorsStage;
pub use json::JsonStage;
pub use postcss::PostcssStage;
pub use replace::ReplaceStage;
pub use resolve::NodeResolveStage;
pub use shebang::ShebangStage;
pub use sourcemaps::SourceMapsStage;
pub use terser::TerserStage;
pub use typescript::TypeScriptStage;

/// Output of a single stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    pub code: String,
}

impl TransformResult {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    /// Identity result for stages that leave the module alone
    pub fn unchanged(code: &str) -> Self {
        Self::new(code)
    }
}

/// One unit of the ordered build pipeline
pub trait Stage: fmt::Debug + Send + Sync {
    /// Stable stage name, also used in error reports
    fn name(&self) -> &'static str;

    /// Parameters passed to the engine running this stage
    fn options(&self) -> Value {
        Value::Null
    }

    /// Transform one module; `id` is the module's path
    fn transform(&self, code: &str, _id: &str) -> anyhow::Result<TransformResult> {
        Ok(TransformResult::unchanged(code))
    }
}
