//! Pipeline assembly
//!
//! Given a format and normalized options, the assembler produces the complete
//! configuration handed to the bundling engine: the input, the external
//! predicate, the output descriptor and the ordered stage list.
//!
//! Stage order is fixed by `STAGES`. Each slot carries a named predicate over
//! `(format, options)`, so two assemblies with the same inputs always produce
//! the same stages in the same order.

use std::{path::PathBuf, sync::Arc};

use indexmap::IndexMap;
use log::info;
use serde::Serialize;
use serde_json::Value;

use crate::{
    config::Config,
    error::{BuildError, Result},
    external::{BareSpecifierClassifier, DependencyClassifier, External, ExternalDescription},
    naming,
    options::{Format, NormalizedOptions},
    paths::ProjectPaths,
    session::BuildSession,
    stages::Stage,
};

pub mod builder;
pub mod predicates;


pub use builder::{PipelineBuilder, StageContext};
use predicates::StagePredicate;

pub type StageConstructor = fn(&StageContext<'_>) -> Result<Box<dyn Stage>>;

/// One position in the pipeline
#[derive(Debug, Clone, Copy)]
pub struct StageSlot {
    pub name: &'static str,
    pub enabled: StagePredicate,
    pub build: StageConstructor,
}

/// The pipeline, in execution order
pub const STAGES: [StageSlot; 11] = [
    StageSlot {
        name: "extract-errors",
        enabled: predicates::extracts_errors,
        build: builder::extract_errors,
    },
    StageSlot {
        name: "node-resolve",
        enabled: predicates::always,
        build: builder::node_resolve,
    },
    StageSlot {
        name: "commonjs",
        enabled: predicates::needs_commonjs_interop,
        build: builder::commonjs,
    },
    StageSlot {
        name: "json",
        enabled: predicates::always,
        build: builder::json,
    },
    StageSlot {
        name: "shebang",
        enabled: predicates::always,
        build: builder::shebang,
    },
    StageSlot {
        name: "typescript",
        enabled: predicates::always,
        build: builder::typescript,
    },
    StageSlot {
        name: "postcss",
        enabled: predicates::always,
        build: builder::postcss,
    },
    StageSlot {
        name: "babel",
        enabled: predicates::always,
        build: builder::babel,
    },
    StageSlot {
        name: "replace",
        enabled: predicates::substitutes_env,
        build: builder::replace,
    },
    StageSlot {
        name: "sourcemaps",
        enabled: predicates::always,
        build: builder::sourcemaps,
    },
    StageSlot {
        name: "terser",
        enabled: predicates::minifies,
        build: builder::terser,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Treeshake {
    /// Reading a property is assumed side-effect free, so unused getters go
    pub property_read_side_effects: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    Named,
}

/// Where and how the engine writes the bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputDescriptor {
    pub file: PathBuf,
    pub format: Format,
    pub sourcemap: bool,
    /// Namespace objects are not frozen
    pub freeze: bool,
    /// No `__esModule` marker on non-esm output
    pub es_module: bool,
    pub treeshake: Treeshake,
    pub name: String,
    pub globals: IndexMap<String, String>,
    pub exports: ExportMode,
}

/// Assembled configuration for one format
#[derive(Debug)]
pub struct BuildConfig {
    pub input: PathBuf,
    pub external: External,
    pub output: OutputDescriptor,
    pub plugins: Vec<Box<dyn Stage>>,
}

impl BuildConfig {
    pub fn format(&self) -> Format {
        self.output.format
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|stage| stage.name()).collect()
    }

    pub fn stage(&self, name: &str) -> Option<&dyn Stage> {
        self.plugins
            .iter()
            .find(|stage| stage.name() == name)
            .map(|stage| &**stage)
    }

    pub fn has_stage(&self, name: &str) -> bool {
        self.stage(name).is_some()
    }

    /// Run one module through every stage in order
    ///
    /// The first failing stage aborts this format's build only.
    pub fn transform(&self, id: &str, code: &str) -> Result<String> {
        let mut code = code.to_owned();
        for stage in &self.plugins {
            code = stage
                .transform(&code, id)
                .map_err(|source| BuildError::Tooling {
                    format: self.format(),
                    stage: stage.name(),
                    source,
                })?
                .code;
        }
        Ok(code)
    }

    /// Serializable form handed to the bundling engine
    pub fn to_manifest(&self) -> BuildManifest {
        BuildManifest {
            input: self.input.display().to_string(),
            external: self.external.describe(),
            output: self.output.clone(),
            plugins: self
                .plugins
                .iter()
                .map(|stage| PluginManifest {
                    name: stage.name(),
                    options: stage.options(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildManifest {
    pub input: String,
    pub external: ExternalDescription,
    pub output: OutputDescriptor,
    pub plugins: Vec<PluginManifest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PluginManifest {
    pub name: &'static str,
    pub options: Value,
}

/// Produces build configurations for one project
#[derive(Debug, Clone)]
pub struct PipelineAssembler {
    paths: ProjectPaths,
    config: Config,
    classifier: Arc<dyn DependencyClassifier>,
}

impl PipelineAssembler {
    pub fn new(paths: ProjectPaths, config: Config) -> Self {
        Self {
            paths,
            config,
            classifier: Arc::new(BareSpecifierClassifier),
        }
    }

    /// Replace the classifier consulted for imports not covered by the options
    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<dyn DependencyClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    /// Assemble the configuration for one format
    ///
    /// Fails before returning anything if a referenced resource (tsconfig,
    /// error-code map) is missing.
    pub fn assemble(
        &self,
        format: Format,
        options: &NormalizedOptions,
        session: &BuildSession,
    ) -> Result<BuildConfig> {
        let output = OutputDescriptor {
            file: naming::output_path(&self.paths.dist, options, format)?,
            format,
            sourcemap: true,
            freeze: false,
            es_module: false,
            treeshake: Treeshake {
                property_read_side_effects: false,
            },
            name: naming::exported_name(options)?,
            globals: options.globals.clone(),
            exports: ExportMode::Named,
        };

        let ctx = StageContext {
            format,
            options,
            paths: &self.paths,
            config: &self.config,
            session,
        };
        let mut builder = PipelineBuilder::new(ctx);
        builder.add_all(&STAGES)?;
        let plugins = builder.build();

        info!(
            "Assembled {format} build for {} -> {}",
            options.name,
            output.file.display()
        );

        Ok(BuildConfig {
            input: options.input.clone(),
            external: External::new(options, Arc::clone(&self.classifier)),
            output,
            plugins,
        })
    }
}
