//! Script-level transpilation stage

use serde_json::{Value, json};

use super::Stage;
use crate::{
    config::ImportReplacement,
    options::{ErrorExtraction, Format, Target},
};

const DEFAULT_EXTENSIONS: [&str; 7] = [".js", ".jsx", ".es6", ".es", ".mjs", ".ts", ".tsx"];

/// Environment preset configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetEnv {
    /// Minimum node version, only set for node builds
    pub node_version: Option<String>,
}

impl PresetEnv {
    /// Generators are lowered by the async-to-promises plugin instead.
    pub const EXCLUDED_TRANSFORMS: [&'static str; 1] = ["transform-async-to-generator"];

    fn options(&self) -> Value {
        let mut options = json!({
            "loose": true,
            "modules": false,
            "exclude": Self::EXCLUDED_TRANSFORMS,
        });
        if let Some(node) = &self.node_version {
            options["targets"] = json!({ "node": node });
        }
        json!(["@babel/preset-env", options])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BabelPlugin {
    /// Marks top-level calls as side-effect free for tree shaking
    AnnotatePureCalls,
    /// Strips development-only expressions in production builds
    DevExpression,
    /// Rewrites imports of heavy modules to their lighter twins
    RenameImport { replacements: Vec<ImportReplacement> },
    /// Lowers async functions to promise chains with shared helpers
    AsyncToPromises,
    ClassProperties,
    /// Swaps extracted error messages for their codes
    TransformErrorMessages { decoder_url: Option<String> },
}

impl BabelPlugin {
    pub fn module(&self) -> &'static str {
        match self {
            Self::AnnotatePureCalls => "babel-plugin-annotate-pure-calls",
            Self::DevExpression => "babel-plugin-dev-expression",
            Self::RenameImport { .. } => "babel-plugin-transform-rename-import",
            Self::AsyncToPromises => "babel-plugin-transform-async-to-promises",
            Self::ClassProperties => "@babel/plugin-proposal-class-properties",
            Self::TransformErrorMessages { .. } => "distpack/transform-error-messages",
        }
    }

    fn to_value(&self) -> Value {
        let options = match self {
            Self::AnnotatePureCalls | Self::DevExpression => return json!(self.module()),
            Self::RenameImport { replacements } => json!({
                "replacements": replacements
                    .iter()
                    .map(|r| json!({ "original": r.original, "replacement": r.replacement }))
                    .collect::<Vec<_>>(),
            }),
            Self::AsyncToPromises => json!({ "inlineHelpers": true, "externalHelpers": true }),
            Self::ClassProperties => json!({ "loose": true }),
            Self::TransformErrorMessages { decoder_url } => json!({ "decoderUrl": decoder_url }),
        };
        json!([self.module(), options])
    }
}

#[derive(Debug, Clone)]
pub struct BabelStage {
    preset: PresetEnv,
    plugins: Vec<BabelPlugin>,
}

impl BabelStage {
    pub fn new(
        format: Format,
        target: Target,
        node_version: &str,
        replacements: &[ImportReplacement],
        extract_errors: Option<&ErrorExtraction>,
    ) -> Self {
        let preset = PresetEnv {
            node_version: (target == Target::Node).then(|| node_version.to_owned()),
        };

        let mut plugins = vec![BabelPlugin::AnnotatePureCalls, BabelPlugin::DevExpression];
        if format != Format::Cjs {
            plugins.push(BabelPlugin::RenameImport {
                replacements: replacements.to_vec(),
            });
        }
        plugins.push(BabelPlugin::AsyncToPromises);
        plugins.push(BabelPlugin::ClassProperties);
        if let Some(extraction) = extract_errors {
            plugins.push(BabelPlugin::TransformErrorMessages {
                decoder_url: extraction.decoder_url.clone(),
            });
        }

        Self { preset, plugins }
    }

    pub fn preset(&self) -> &PresetEnv {
        &self.preset
    }

    pub fn plugins(&self) -> &[BabelPlugin] {
        &self.plugins
    }
}

impl Stage for BabelStage {
    fn name(&self) -> &'static str {
        "babel"
    }

    fn options(&self) -> Value {
        json!({
            "exclude": "node_modules/**",
            "extensions": DEFAULT_EXTENSIONS,
            "passPerPreset": true,
            "presets": [self.preset.options()],
            "plugins": self.plugins.iter().map(BabelPlugin::to_value).collect::<Vec<_>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn stage(format: Format, target: Target, extract: Option<&ErrorExtraction>) -> BabelStage {
        let config = Config::default();
        BabelStage::new(
            format,
            target,
            &config.node_version,
            &config.import_replacements,
            extract,
        )
    }

    fn modules(stage: &BabelStage) -> Vec<&'static str> {
        stage.plugins().iter().map(BabelPlugin::module).collect()
    }

    #[test]
    fn test_cjs_skips_import_renaming() {
        assert_eq!(
            modules(&stage(Format::Cjs, Target::Browser, None)),
            vec![
                "babel-plugin-annotate-pure-calls",
                "babel-plugin-dev-expression",
                "babel-plugin-transform-async-to-promises",
                "@babel/plugin-proposal-class-properties",
            ]
        );
    }

    #[test]
    fn test_esm_and_umd_rename_lodash() {
        for format in [Format::Esm, Format::Umd] {
            let stage = stage(format, Target::Browser, None);
            assert_eq!(
                stage.plugins()[2],
                BabelPlugin::RenameImport {
                    replacements: vec![ImportReplacement {
                        original: "lodash".to_owned(),
                        replacement: "lodash-es".to_owned(),
                    }],
                }
            );
        }
    }

    #[test]
    fn test_error_message_plugin_follows_extraction() {
        let extraction = ErrorExtraction {
            decoder_url: Some("https://example.com/decoder".to_owned()),
        };
        let stage = stage(Format::Esm, Target::Browser, Some(&extraction));
        assert_eq!(
            stage.plugins().last(),
            Some(&BabelPlugin::TransformErrorMessages {
                decoder_url: Some("https://example.com/decoder".to_owned()),
            })
        );
    }

    #[test]
    fn test_node_target_pins_runtime_version() {
        let node = stage(Format::Cjs, Target::Node, None);
        assert_eq!(node.preset().node_version.as_deref(), Some("8"));
        assert_eq!(node.options()["presets"][0][1]["targets"]["node"], "8");

        let browser = stage(Format::Cjs, Target::Browser, None);
        assert_eq!(browser.preset().node_version, None);
        assert!(browser.options()["presets"][0][1].get("targets").is_none());
    }

    #[test]
    fn test_async_lowering_uses_shared_helpers() {
        let options = stage(Format::Cjs, Target::Browser, None).options();
        let plugins = options["plugins"].as_array().unwrap();
        let async_plugin = plugins
            .iter()
            .find(|plugin| plugin[0] == "babel-plugin-transform-async-to-promises")
            .unwrap();
        assert_eq!(async_plugin[1]["inlineHelpers"], true);
        assert_eq!(async_plugin[1]["externalHelpers"], true);
        assert_eq!(
            options["presets"][0][1]["exclude"][0],
            "transform-async-to-generator"
        );
    }
}
