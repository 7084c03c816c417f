//! Named inclusion rules for conditional stages
//!
//! Every rule is a pure function of the format and the normalized options.

use crate::options::{Format, NormalizedOptions};

pub type StagePredicate = fn(Format, &NormalizedOptions) -> bool;

pub fn always(_format: Format, _options: &NormalizedOptions) -> bool {
    true
}

/// Error-code extraction was requested
pub fn extracts_errors(_format: Format, options: &NormalizedOptions) -> bool {
    options.extract_errors.is_some()
}

/// UMD bundles inline their dependencies and need CommonJS interop
pub fn needs_commonjs_interop(format: Format, _options: &NormalizedOptions) -> bool {
    format == Format::Umd
}

pub fn substitutes_env(_format: Format, options: &NormalizedOptions) -> bool {
    options.env.is_some()
}

pub fn minifies(_format: Format, options: &NormalizedOptions) -> bool {
    options.should_minify
}

/// Style sheets are minimized for minified builds and always for esm
pub fn minimizes_styles(format: Format, options: &NormalizedOptions) -> bool {
    options.should_minify || format == Format::Esm
}

/// Top-level identifiers can only be mangled under the cjs module wrapper
pub fn mangles_toplevel(format: Format, _options: &NormalizedOptions) -> bool {
    format == Format::Cjs
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::options::{BuildOptions, ErrorExtraction};

    fn options(env: Option<&str>, minify: Option<bool>) -> NormalizedOptions {
        BuildOptions {
            input: Some(PathBuf::from("src/index.ts")),
            name: Some("foo".to_owned()),
            env: env.map(str::to_owned),
            minify,
            ..Default::default()
        }
        .resolve()
        .expect("valid options")
    }

    #[test]
    fn test_commonjs_interop_only_for_umd() {
        let options = options(None, None);
        assert!(!needs_commonjs_interop(Format::Cjs, &options));
        assert!(!needs_commonjs_interop(Format::Esm, &options));
        assert!(needs_commonjs_interop(Format::Umd, &options));
    }

    #[test]
    fn test_minification_rules() {
        assert!(minifies(Format::Cjs, &options(Some("production"), None)));
        assert!(!minifies(Format::Cjs, &options(Some("production"), Some(false))));
        assert!(minifies(Format::Cjs, &options(None, Some(true))));
        assert!(!minifies(Format::Cjs, &options(Some("development"), None)));
    }

    #[test]
    fn test_style_minimization_includes_esm() {
        let unminified = options(Some("development"), None);
        assert!(minimizes_styles(Format::Esm, &unminified));
        assert!(!minimizes_styles(Format::Cjs, &unminified));
        assert!(!minimizes_styles(Format::Umd, &unminified));
        assert!(minimizes_styles(Format::Umd, &options(Some("production"), None)));
    }

    #[test]
    fn test_env_substitution_requires_env() {
        assert!(substitutes_env(Format::Cjs, &options(Some("development"), None)));
        assert!(!substitutes_env(Format::Cjs, &options(None, Some(true))));
    }

    #[test]
    fn test_error_extraction_rule() {
        let mut options = options(None, None);
        assert!(!extracts_errors(Format::Esm, &options));
        options.extract_errors = Some(ErrorExtraction { decoder_url: None });
        assert!(extracts_errors(Format::Esm, &options));
    }

    #[test]
    fn test_toplevel_mangling_only_for_cjs() {
        let options = options(None, None);
        assert!(mangles_toplevel(Format::Cjs, &options));
        assert!(!mangles_toplevel(Format::Esm, &options));
        assert!(!mangles_toplevel(Format::Umd, &options));
    }
}
