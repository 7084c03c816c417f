//! Build configuration generator for packaging a library as cjs, esm and umd
//! bundles.
//!
//! The entry point is [`pipeline::PipelineAssembler`]: given a [`Format`] and
//! [`NormalizedOptions`] it produces a [`BuildConfig`] holding the input, the
//! external predicate, the output descriptor and the ordered stage list that
//! an external bundling engine executes.

pub mod config;
pub mod error;
pub mod error_codes;
pub mod external;
pub mod lint;
pub mod manifest;
pub mod naming;
pub mod options;
pub mod paths;
pub mod pipeline;
pub mod session;
pub mod shebang;
pub mod stages;
pub mod test_config;

pub use config::Config;
pub use error::{BuildError, Result};
pub use options::{BuildOptions, Env, Format, NormalizedOptions, Target};
pub use paths::ProjectPaths;
pub use pipeline::{BuildConfig, BuildManifest, PipelineAssembler};
pub use session::BuildSession;
