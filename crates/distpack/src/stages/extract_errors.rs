//! Error-code extraction stage

use std::sync::Arc;

use log::debug;
use serde_json::{Value, json};

use super::{Stage, TransformResult};
use crate::error_codes::ErrorCodeMap;

/// Records error-message templates into the session's error-code map
///
/// The module itself passes through untouched; the messages are shortened
/// later by the transpiler's error-message plugin.
#[derive(Debug)]
pub struct ExtractErrorsStage {
    codes: Arc<ErrorCodeMap>,
}

impl ExtractErrorsStage {
    pub fn new(codes: Arc<ErrorCodeMap>) -> Self {
        Self { codes }
    }
}

impl Stage for ExtractErrorsStage {
    fn name(&self) -> &'static str {
        "extract-errors"
    }

    fn options(&self) -> Value {
        json!({ "errorMapFilePath": self.codes.path().display().to_string() })
    }

    fn transform(&self, code: &str, id: &str) -> anyhow::Result<TransformResult> {
        let added = self.codes.record_from_source(code);
        if added > 0 {
            debug!("Recorded {added} new error messages from {id}");
        }
        Ok(TransformResult::unchanged(code))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_passes_source_through_and_records_messages() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("codes.json");
        fs::write(&path, "{}")?;
        let codes = Arc::new(ErrorCodeMap::load(&path)?);
        let stage = ExtractErrorsStage::new(Arc::clone(&codes));

        let source = "invariant(ok, 'Something broke');\nexport const x = 1;\n";
        let result = stage.transform(source, "src/index.ts")?;

        assert_eq!(result.code, source);
        assert_eq!(codes.code_for("Something broke"), Some(0));
        Ok(())
    }
}
