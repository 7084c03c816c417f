//! Source-map resolution stage

use super::Stage;

/// Loads existing source maps of input modules, executed by the engine
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceMapsStage;

impl Stage for SourceMapsStage {
    fn name(&self) -> &'static str {
        "sourcemaps"
    }
}
