//! Lint report generation
//!
//! distpack does not lint anything itself. It configures an external lint
//! engine with a fixed extension allowlist and one shared base ruleset, runs
//! it over the source directory, prints the formatted report and hands the
//! raw report back to the caller.

use std::{
    fmt::Write as _,
    io::Write,
    path::PathBuf,
    process::Command,
};

use anyhow::{Context, Result, bail};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::paths::ProjectPaths;

pub const LINT_EXTENSIONS: [&str; 2] = [".ts", ".tsx"];
pub const SHARED_RULESET: &str = "@foreachbe/eslint-config-react-app";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseConfig {
    pub extends: Vec<String>,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LintSetup {
    pub extensions: Vec<String>,
    pub base_config: BaseConfig,
    pub src: PathBuf,
}

impl LintSetup {
    pub fn new(paths: &ProjectPaths) -> Self {
        Self {
            extensions: LINT_EXTENSIONS.iter().map(|ext| (*ext).to_owned()).collect(),
            base_config: BaseConfig {
                extends: vec![SHARED_RULESET.to_owned()],
            },
            src: paths.src.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintMessage {
    pub rule_id: Option<String>,
    pub severity: u8,
    pub message: String,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintResult {
    pub file_path: PathBuf,
    pub messages: Vec<LintMessage>,
    #[serde(default)]
    pub error_count: usize,
    #[serde(default)]
    pub warning_count: usize,
}

/// Raw report as produced by the engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintReport {
    pub results: Vec<LintResult>,
    pub error_count: usize,
    pub warning_count: usize,
}

/// The external lint engine
pub trait LintEngine {
    fn execute_on_files(&mut self, setup: &LintSetup, files: &[PathBuf]) -> Result<LintReport>;

    /// Render the results for humans
    fn format(&self, results: &[LintResult]) -> String;
}

/// Runs the `eslint` executable with its JSON formatter
#[derive(Debug, Clone)]
pub struct EslintEngine {
    program: PathBuf,
}

impl Default for EslintEngine {
    fn default() -> Self {
        Self::new("eslint")
    }
}

impl EslintEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl LintEngine for EslintEngine {
    fn execute_on_files(&mut self, setup: &LintSetup, files: &[PathBuf]) -> Result<LintReport> {
        let mut base_config = tempfile::Builder::new()
            .prefix("distpack-eslintrc")
            .suffix(".json")
            .tempfile()
            .context("could not create the base lint configuration")?;
        serde_json::to_writer(&mut base_config, &setup.base_config)?;
        base_config.flush()?;

        let mut command = Command::new(&self.program);
        command
            .arg("--no-eslintrc")
            .arg("--config")
            .arg(base_config.path())
            .arg("--ext")
            .arg(setup.extensions.join(","))
            .arg("--format")
            .arg("json")
            .args(files);
        debug!("Running {command:?}");

        let output = command
            .output()
            .with_context(|| format!("could not run {}", self.program.display()))?;
        // Exit code 1 only means lint errors were found.
        if !matches!(output.status.code(), Some(0 | 1)) {
            bail!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        parse_report(&output.stdout)
    }

    fn format(&self, results: &[LintResult]) -> String {
        let mut out = String::new();
        for result in results.iter().filter(|result| !result.messages.is_empty()) {
            let _ = writeln!(out, "{}", result.file_path.display());
            for message in &result.messages {
                let _ = writeln!(
                    out,
                    "  {}:{}  {}  {}  {}",
                    message.line,
                    message.column,
                    if message.severity >= 2 { "error" } else { "warning" },
                    message.message,
                    message.rule_id.as_deref().unwrap_or_default()
                );
            }
        }
        let errors: usize = results.iter().map(|result| result.error_count).sum();
        let warnings: usize = results.iter().map(|result| result.warning_count).sum();
        let _ = write!(out, "{errors} errors, {warnings} warnings");
        out
    }
}

/// Parse the JSON formatter output into a report with totals
pub fn parse_report(json: &[u8]) -> Result<LintReport> {
    let results: Vec<LintResult> =
        serde_json::from_slice(json).context("malformed lint engine output")?;
    Ok(LintReport {
        error_count: results.iter().map(|result| result.error_count).sum(),
        warning_count: results.iter().map(|result| result.warning_count).sum(),
        results,
    })
}

/// Runs the engine over the source directory and prints the outcome
#[derive(Debug)]
pub struct LintRunner<E, W> {
    setup: LintSetup,
    engine: E,
    out: W,
}

pub fn create_lint_runner<E: LintEngine, W: Write>(
    paths: &ProjectPaths,
    engine: E,
    out: W,
) -> LintRunner<E, W> {
    LintRunner {
        setup: LintSetup::new(paths),
        engine,
        out,
    }
}

impl<E: LintEngine, W: Write> LintRunner<E, W> {
    pub fn setup(&self) -> &LintSetup {
        &self.setup
    }

    pub fn run(&mut self) -> Result<LintReport> {
        let files = vec![self.setup.src.clone()];
        let report = self
            .engine
            .execute_on_files(&self.setup, &files)
            .with_context(|| format!("linting {} failed", self.setup.src.display()))?;

        writeln!(self.out, "{}", self.engine.format(&report.results))?;
        info!(
            "Lint finished with {} errors and {} warnings",
            report.error_count, report.warning_count
        );
        Ok(report)
    }
}
