//! Output file naming
//!
//! The output path is a pure function of the dist root, the package (or input)
//! name, the format, the env and the minify decision, so every
//! `(name, format, env, minify)` tuple lands in its own file.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    error::{BuildError, Result},
    options::{Env, Format, NormalizedOptions},
};

static UNSAFE_PACKAGE_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@.*/|^[^a-zA-Z]+|[^\w.-]|[^a-zA-Z0-9]+$").expect("valid package name pattern")
});

static UNSAFE_VARIABLE_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^a-zA-Z]+|[^\w.-]|[^a-zA-Z0-9]+$").expect("valid variable name pattern")
});

/// Sanitize a package name into something usable as a file name
///
/// Drops any `@scope/` prefix, leading non-letters, characters outside
/// `[\w.-]` and trailing non-alphanumerics.
pub fn safe_package_name(name: &str) -> String {
    UNSAFE_PACKAGE_CHARS
        .replace_all(&name.to_lowercase(), "")
        .into_owned()
}

/// Sanitize a name into a camel-cased identifier
pub fn safe_variable_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let cleaned = UNSAFE_VARIABLE_CHARS.replace_all(&lowered, "");
    let mut words = cleaned
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty());

    let mut identifier = words.next().map(str::to_owned).unwrap_or_default();
    for word in words {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            identifier.extend(first.to_uppercase());
            identifier.push_str(chars.as_str());
        }
    }
    identifier
}

/// Base name of the output file, before format and env suffixes
///
/// With several entries the name comes from the input file rather than the
/// package, so each entry gets its own artifact.
pub fn file_stem(options: &NormalizedOptions) -> Result<String> {
    let stem = if options.multiple_entries {
        let input = options.input.to_string_lossy();
        let file_name = input.rsplit(['/', '\\']).next().unwrap_or_default();
        let base = file_name.split('.').next().unwrap_or_default();
        safe_package_name(base)
    } else {
        safe_package_name(&options.name)
    };

    if stem.is_empty() {
        return Err(BuildError::configuration(format!(
            "cannot derive an output file name from `{}`",
            if options.multiple_entries {
                options.input.display().to_string()
            } else {
                options.name.clone()
            }
        )));
    }
    Ok(stem)
}

/// Compute the output file path for one format
pub fn output_path(dist_root: &Path, options: &NormalizedOptions, format: Format) -> Result<PathBuf> {
    let stem = file_stem(options)?;
    let file_name = [
        stem.as_str(),
        format.as_str(),
        options.env.map(Env::as_str).unwrap_or_default(),
        if options.should_minify { "min" } else { "" },
        "js",
    ]
    .into_iter()
    .filter(|segment| !segment.is_empty())
    .collect::<Vec<_>>()
    .join(".");

    Ok(dist_root.join(file_name))
}

/// Name the bundle exports itself under (the UMD global)
pub fn exported_name(options: &NormalizedOptions) -> Result<String> {
    if options.name.is_empty() {
        Ok(safe_variable_name(&file_stem(options)?))
    } else {
        Ok(options.name.clone())
    }
}
