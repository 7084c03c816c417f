//! Minification stage

use serde_json::{Value, json};

use super::Stage;

/// Conservative compressor profile
///
/// Top-level mangling is only safe for cjs, where the module wrapper scopes
/// every top-level binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerserStage {
    pub toplevel: bool,
}

impl TerserStage {
    pub const PASSES: u32 = 10;
    pub const ECMA: u32 = 5;

    pub fn new(toplevel: bool) -> Self {
        Self { toplevel }
    }
}

impl Stage for TerserStage {
    fn name(&self) -> &'static str {
        "terser"
    }

    fn options(&self) -> Value {
        json!({
            "sourcemap": true,
            "output": { "comments": false },
            "compress": {
                "keep_infinity": true,
                "pure_getters": true,
                "passes": Self::PASSES,
            },
            "ecma": Self::ECMA,
            "toplevel": self.toplevel,
            "warnings": true,
        })
    }
}
