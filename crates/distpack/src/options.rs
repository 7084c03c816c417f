//! Build options as supplied by a caller, and their validated form
//!
//! `BuildOptions` mirrors the command-line surface one-to-one and keeps every
//! field optional. `BuildOptions::resolve` turns it into `NormalizedOptions`,
//! rejecting anything the pipeline cannot work with.

use std::{fmt, path::PathBuf, str::FromStr};

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::error::{BuildError, Result};

/// Output module shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Cjs,
    Esm,
    Umd,
}

impl Format {
    pub const ALL: [Self; 3] = [Self::Cjs, Self::Esm, Self::Umd];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cjs => "cjs",
            Self::Esm => "esm",
            Self::Umd => "umd",
        }
    }
}

impl FromStr for Format {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cjs" => Ok(Self::Cjs),
            "esm" => Ok(Self::Esm),
            "umd" => Ok(Self::Umd),
            other => Err(BuildError::configuration(format!(
                "unsupported format `{other}`, expected one of cjs, esm, umd"
            ))),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime the bundle is meant for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Node,
    #[default]
    Browser,
}

impl FromStr for Target {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "node" => Ok(Self::Node),
            "browser" => Ok(Self::Browser),
            other => Err(BuildError::configuration(format!(
                "unsupported target `{other}`, expected node or browser"
            ))),
        }
    }
}

/// Build environment baked into the bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Env {
    Development,
    Production,
}

impl Env {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl FromStr for Env {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(BuildError::configuration(format!(
                "unsupported env `{other}`, expected development or production"
            ))),
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw options, one field per command-line flag
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub entry: Option<Vec<PathBuf>>,
    pub externals: IndexSet<String>,
    pub globals: IndexMap<String, String>,
    pub input: Option<PathBuf>,
    pub name: Option<String>,
    pub target: Option<String>,
    pub env: Option<String>,
    pub tsconfig: Option<PathBuf>,
    /// A bare flag (`"true"`) or the URL used to decode shortened error messages
    pub extract_errors: Option<String>,
    pub minify: Option<bool>,
    pub include_deps: bool,
    pub inline_styles: bool,
    /// Value substituted for `process.env.REACT_APP_ENV`
    pub app_env: Option<String>,
}

/// Error-code extraction settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorExtraction {
    pub decoder_url: Option<String>,
}

/// Validated options consumed by the namer, classifier and assembler
#[derive(Debug, Clone)]
pub struct NormalizedOptions {
    pub entry: Vec<PathBuf>,
    pub multiple_entries: bool,
    pub externals: IndexSet<String>,
    pub globals: IndexMap<String, String>,
    pub input: PathBuf,
    pub name: String,
    pub target: Target,
    pub env: Option<Env>,
    pub tsconfig: Option<PathBuf>,
    pub extract_errors: Option<ErrorExtraction>,
    pub should_minify: bool,
    pub include_deps: bool,
    pub inline_styles: bool,
    pub app_env: Option<String>,
}

impl BuildOptions {
    /// Validate and normalize these options
    pub fn resolve(&self) -> Result<NormalizedOptions> {
        let entry = self.entry.clone().unwrap_or_default();
        let multiple_entries = entry.len() > 1;

        let input = match (&self.input, entry.first()) {
            (Some(input), _) => input.clone(),
            (None, Some(first)) if !multiple_entries => first.clone(),
            _ => {
                return Err(BuildError::configuration(
                    "an input file is required when zero or several entries are given",
                ));
            }
        };

        let name = self
            .name
            .clone()
            .ok_or_else(|| BuildError::configuration("a package name is required"))?;

        let target = self
            .target
            .as_deref()
            .map(Target::from_str)
            .transpose()?
            .unwrap_or_default();
        let env = self.env.as_deref().map(Env::from_str).transpose()?;

        let should_minify = self.minify.unwrap_or(env == Some(Env::Production));

        Ok(NormalizedOptions {
            entry,
            multiple_entries,
            externals: self.externals.clone(),
            globals: self.globals.clone(),
            input,
            name,
            target,
            env,
            tsconfig: self.tsconfig.clone(),
            extract_errors: parse_extract_errors(self.extract_errors.as_deref()),
            should_minify,
            include_deps: self.include_deps,
            inline_styles: self.inline_styles,
            app_env: self.app_env.clone(),
        })
    }
}

fn parse_extract_errors(value: Option<&str>) -> Option<ErrorExtraction> {
    match value.map(str::trim) {
        None | Some("" | "false") => None,
        Some("true") => Some(ErrorExtraction { decoder_url: None }),
        Some(url) => Some(ErrorExtraction {
            decoder_url: Some(url.to_owned()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_options() -> BuildOptions {
        BuildOptions {
            entry: Some(vec![PathBuf::from("src/index.ts")]),
            input: Some(PathBuf::from("src/index.ts")),
            name: Some("foo".to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn test_format_parsing_rejects_unknown_values() {
        assert_eq!("cjs".parse::<Format>().unwrap(), Format::Cjs);
        assert_eq!("esm".parse::<Format>().unwrap(), Format::Esm);
        assert_eq!("umd".parse::<Format>().unwrap(), Format::Umd);

        let err = "iife".parse::<Format>().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("iife"));
    }

    #[test]
    fn test_minify_follows_env_when_unset() {
        let mut options = base_options();
        options.env = Some("production".to_owned());
        assert!(options.resolve().unwrap().should_minify);

        options.env = Some("development".to_owned());
        assert!(!options.resolve().unwrap().should_minify);

        options.env = None;
        assert!(!options.resolve().unwrap().should_minify);
    }

    #[test]
    fn test_explicit_minify_wins_over_env() {
        let mut options = base_options();
        options.env = Some("production".to_owned());
        options.minify = Some(false);
        assert!(!options.resolve().unwrap().should_minify);

        options.env = Some("development".to_owned());
        options.minify = Some(true);
        assert!(options.resolve().unwrap().should_minify);
    }

    #[test]
    fn test_single_entry_detection() {
        let mut options = base_options();
        assert!(!options.resolve().unwrap().multiple_entries);

        options.entry = None;
        assert!(!options.resolve().unwrap().multiple_entries);

        options.entry = Some(vec![
            PathBuf::from("src/a.ts"),
            PathBuf::from("src/b.ts"),
        ]);
        assert!(options.resolve().unwrap().multiple_entries);
    }

    #[test]
    fn test_input_defaults_to_single_entry() {
        let mut options = base_options();
        options.input = None;
        let resolved = options.resolve().unwrap();
        assert_eq!(resolved.input, PathBuf::from("src/index.ts"));

        options.entry = None;
        assert!(options.resolve().unwrap_err().is_configuration());
    }

    #[test]
    fn test_unknown_target_and_env_are_rejected() {
        let mut options = base_options();
        options.target = Some("deno".to_owned());
        assert!(options.resolve().unwrap_err().is_configuration());

        let mut options = base_options();
        options.env = Some("staging".to_owned());
        assert!(options.resolve().unwrap_err().is_configuration());
    }

    #[test]
    fn test_extract_errors_flag_and_url() {
        assert_eq!(parse_extract_errors(None), None);
        assert_eq!(parse_extract_errors(Some("false")), None);
        assert_eq!(parse_extract_errors(Some("")), None);
        assert_eq!(
            parse_extract_errors(Some("true")),
            Some(ErrorExtraction { decoder_url: None })
        );
        assert_eq!(
            parse_extract_errors(Some("https://example.com/errors")),
            Some(ErrorExtraction {
                decoder_url: Some("https://example.com/errors".to_owned())
            })
        );
    }
}
