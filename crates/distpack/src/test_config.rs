//! Test-runner configuration
//!
//! A one-shot construction from the project root. The only input read from
//! disk is whether the test setup file exists; when it does not, the setup
//! list is simply left empty.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use crate::config::Config;

const IDENTITY_PROXY: &str = "identity-obj-proxy";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunnerConfig {
    pub transform: IndexMap<String, String>,
    pub module_name_mapper: IndexMap<String, String>,
    pub setup_files_after_env: Vec<String>,
    pub transform_ignore_patterns: Vec<String>,
    pub module_file_extensions: Vec<String>,
    pub collect_coverage_from: Vec<String>,
    pub test_match: Vec<String>,
    #[serde(rename = "testURL")]
    pub test_url: String,
    pub root_dir: PathBuf,
    pub watch_plugins: Vec<String>,
}

impl TestRunnerConfig {
    pub fn new(root_dir: &Path, config: &Config) -> Self {
        let setup_file = root_dir.join(&config.tests_setup);
        let setup_files_after_env = if setup_file.is_file() {
            vec![format!(
                "<rootDir>/{}",
                config.tests_setup.to_string_lossy().replace('\\', "/")
            )]
        } else {
            debug!("No test setup file at {}", setup_file.display());
            Vec::new()
        };

        Self {
            transform: strings_map([(".(ts|tsx)", "ts-jest/dist")]),
            module_name_mapper: strings_map([
                (r"^.+\.css$", IDENTITY_PROXY),
                (r"^.+\.scss$", IDENTITY_PROXY),
            ]),
            setup_files_after_env,
            transform_ignore_patterns: strings([r"[/\\]node_modules[/\\].+\.(js|jsx)$"]),
            module_file_extensions: strings(["ts", "tsx", "js", "jsx", "json", "node"]),
            collect_coverage_from: strings(["src/**/*.{ts,tsx}"]),
            test_match: strings(["<rootDir>/**/*.(spec|test).{ts,tsx}"]),
            test_url: "http://localhost".to_owned(),
            root_dir: root_dir.to_path_buf(),
            watch_plugins: strings([
                "jest-watch-typeahead/filename",
                "jest-watch-typeahead/testname",
            ]),
        }
    }
}

fn strings<const N: usize>(items: [&str; N]) -> Vec<String> {
    items.into_iter().map(str::to_owned).collect()
}

fn strings_map<const N: usize>(items: [(&str, &str); N]) -> IndexMap<String, String> {
    items
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect()
}
