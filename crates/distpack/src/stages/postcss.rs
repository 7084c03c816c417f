//! Style-sheet processing stage

use serde_json::{Value, json};

use super::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostcssStage {
    /// Write styles to a separate file instead of injecting them
    pub extract: bool,
    pub minimize: bool,
}

impl PostcssStage {
    pub fn new(extract: bool, minimize: bool) -> Self {
        Self { extract, minimize }
    }
}

impl Stage for PostcssStage {
    fn name(&self) -> &'static str {
        "postcss"
    }

    fn options(&self) -> Value {
        json!({
            "extract": self.extract,
            "minimize": self.minimize,
            "plugins": [
                ["postcss-flexbugs-fixes", {}],
                ["postcss-preset-env", { "autoprefixer": { "flexbox": "no-2009" }, "stage": 3 }],
                ["postcss-normalize", {}],
            ],
        })
    }
}
