//! Well-known locations inside a project

use std::path::{Path, PathBuf};

use crate::{config::Config, options::Format};

#[derive(Debug, Clone)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub dist: PathBuf,
    pub src: PathBuf,
    pub error_codes: PathBuf,
    pub tests_setup: PathBuf,
    cache_prefix: String,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>, config: &Config) -> Self {
        let root = root.into();
        Self {
            dist: under(&root, &config.dist_dir),
            src: under(&root, &config.src_dir),
            error_codes: under(&root, &config.error_codes),
            tests_setup: under(&root, &config.tests_setup),
            cache_prefix: config.cache_prefix.clone(),
            root,
        }
    }

    /// Resolve a caller-supplied path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        under(&self.root, path)
    }

    /// Compiler cache directory for one format
    ///
    /// Each format gets its own directory so concurrent builds never share
    /// compiler state.
    pub fn compiler_cache(&self, format: Format) -> PathBuf {
        under(&self.root, Path::new(&format!("{}_{format}", self.cache_prefix)))
    }
}

// Keeps paths relative when the root is the current directory.
fn under(root: &Path, relative: &Path) -> PathBuf {
    if root.as_os_str().is_empty() || root == Path::new(".") {
        relative.to_path_buf()
    } else {
        root.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_directory_keeps_paths_relative() {
        let paths = ProjectPaths::new(".", &Config::default());
        assert_eq!(paths.dist, PathBuf::from("dist"));
        assert_eq!(paths.error_codes, PathBuf::from("errors/codes.json"));
        assert_eq!(paths.compiler_cache(Format::Esm), PathBuf::from(".rts2_cache_esm"));
    }

    #[test]
    fn test_cache_directories_are_distinct_per_format() {
        let paths = ProjectPaths::new("/work/pkg", &Config::default());
        let caches: Vec<_> = Format::ALL
            .iter()
            .map(|format| paths.compiler_cache(*format))
            .collect();
        assert_eq!(
            caches,
            vec![
                PathBuf::from("/work/pkg/.rts2_cache_cjs"),
                PathBuf::from("/work/pkg/.rts2_cache_esm"),
                PathBuf::from("/work/pkg/.rts2_cache_umd"),
            ]
        );
    }
}
