#![allow(clippy::print_stdout)]

use std::{io, path::PathBuf, sync::Arc};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use distpack::{
    BuildOptions, BuildSession, Config, Format, PipelineAssembler, ProjectPaths,
    external::ManifestClassifier,
    lint::{EslintEngine, LintSetup, create_lint_runner},
    manifest::PackageManifest,
    test_config::TestRunnerConfig,
};
use indexmap::IndexMap;
use log::{error, info};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "distpack", version, about = "Generate bundler configurations for a library")]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble one bundler configuration per format and print them as JSON
    Build(BuildArgs),
    /// Print the test-runner configuration
    TestConfig(RootArgs),
    /// Print the lint engine configuration
    LintConfig(RootArgs),
    /// Lint the project sources and print the report
    Lint(LintArgs),
}

#[derive(Args, Debug)]
struct LintArgs {
    #[command(flatten)]
    root: RootArgs,

    /// Lint executable to run
    #[arg(long, default_value = "eslint")]
    eslint: PathBuf,
}

#[derive(Args, Debug)]
struct RootArgs {
    /// Project root
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

#[derive(Args, Debug)]
struct BuildArgs {
    #[command(flatten)]
    root: RootArgs,

    /// Output formats
    #[arg(long, value_delimiter = ',', default_value = "cjs,esm")]
    format: Vec<String>,

    /// Entry modules
    #[arg(long, value_delimiter = ',')]
    entry: Vec<PathBuf>,

    /// Modules kept external when dependencies are bundled
    #[arg(long = "external", value_delimiter = ',')]
    externals: Vec<String>,

    /// Global binding for an external module, as `id=Name`
    #[arg(long = "global", value_delimiter = ',')]
    globals: Vec<String>,

    #[arg(long)]
    input: Option<PathBuf>,

    /// Package name, defaults to the name in package.json
    #[arg(long)]
    name: Option<String>,

    /// node or browser
    #[arg(long)]
    target: Option<String>,

    /// development or production
    #[arg(long)]
    env: Option<String>,

    #[arg(long)]
    tsconfig: Option<PathBuf>,

    /// Extract error messages into the error-code map, optionally with a decoder URL
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    extract_errors: Option<String>,

    /// Force minification on or off
    #[arg(long)]
    minify: Option<bool>,

    /// Bundle dependencies except the explicit externals
    #[arg(long)]
    include_deps: bool,

    /// Inject styles instead of extracting them to a file
    #[arg(long)]
    inline_styles: bool,

    /// Only treat dependencies declared in package.json as external
    #[arg(long)]
    manifest_externals: bool,

    #[arg(long, env = "REACT_APP_ENV", hide = true)]
    app_env: Option<String>,
}

#[derive(Serialize)]
struct FormatOutput<'a> {
    format: &'a str,
    config: distpack::BuildManifest,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Build(args) => build(args),
        Command::TestConfig(args) => {
            let config = Config::load(&args.root)?;
            let test_config = TestRunnerConfig::new(&args.root, &config);
            println!("{}", serde_json::to_string_pretty(&test_config)?);
            Ok(())
        }
        Command::LintConfig(args) => {
            let config = Config::load(&args.root)?;
            let setup = LintSetup::new(&ProjectPaths::new(&args.root, &config));
            println!("{}", serde_json::to_string_pretty(&setup)?);
            Ok(())
        }
        Command::Lint(args) => lint(&args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn parse_globals(globals: &[String]) -> Result<IndexMap<String, String>> {
    globals
        .iter()
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(id, name)| (id.trim().to_owned(), name.trim().to_owned()))
                .with_context(|| format!("global `{entry}` must look like `module=GlobalName`"))
        })
        .collect()
}

fn lint(args: &LintArgs) -> Result<()> {
    let root = &args.root.root;
    let config = Config::load(root)?;
    let paths = ProjectPaths::new(root, &config);
    let report = create_lint_runner(&paths, EslintEngine::new(&args.eslint), io::stdout().lock())
        .run()?;
    if report.error_count > 0 {
        bail!("linting found {} errors", report.error_count);
    }
    Ok(())
}

fn build(args: BuildArgs) -> Result<()> {
    let root = args.root.root;
    let config = Config::load(&root)?;
    let paths = ProjectPaths::new(&root, &config);
    let manifest = PackageManifest::from_root_if_present(&root)?;

    let options = BuildOptions {
        entry: (!args.entry.is_empty()).then_some(args.entry),
        externals: args.externals.into_iter().collect(),
        globals: parse_globals(&args.globals)?,
        input: args.input,
        name: args
            .name
            .or_else(|| manifest.as_ref().and_then(|m| m.name.clone())),
        target: args.target,
        env: args.env,
        tsconfig: args.tsconfig,
        extract_errors: args.extract_errors,
        minify: args.minify,
        include_deps: args.include_deps,
        inline_styles: args.inline_styles,
        app_env: args.app_env,
    }
    .resolve()?;

    let mut assembler = PipelineAssembler::new(paths, config);
    if args.manifest_externals {
        let manifest = manifest.context("--manifest-externals needs a package.json")?;
        assembler = assembler.with_classifier(Arc::new(ManifestClassifier::from_manifest(&manifest)));
    }

    let session = BuildSession::new();
    let mut outputs = Vec::new();
    let mut failed = Vec::new();
    for format in &args.format {
        let assembled = format
            .parse::<Format>()
            .and_then(|parsed| assembler.assemble(parsed, &options, &session));
        match assembled {
            Ok(build_config) => outputs.push(FormatOutput {
                format: format.as_str(),
                config: build_config.to_manifest(),
            }),
            Err(e) => {
                error!("Could not assemble the {format} build: {e}");
                failed.push(format.as_str());
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&outputs)?);
    session.finish()?;

    if !failed.is_empty() {
        bail!("failed to assemble: {}", failed.join(", "));
    }
    info!("Assembled {} configurations", outputs.len());
    Ok(())
}
