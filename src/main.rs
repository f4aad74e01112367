// Command-line entry point for Codereptile.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use codereptile::api::dto::SceneDto;
use codereptile::api::session::run_session;
use codereptile::application::{AnalyzeUsecase, Scene};
use codereptile::domain::language::Language;
use codereptile::domain::reducer::{AstReducer, ErrorPolicy, ReduceError};
use codereptile::domain::scaler::{Scaler, MAX_SCALE};
use codereptile::domain::std_filter::StandardHeaderFilter;
use codereptile::infrastructure::{ClangProvider, Config};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Cpp,
    Py,
}

impl From<Mode> for Language {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Cpp => Language::Cpp,
            Mode::Py => Language::Python,
        }
    }
}

/// Visualize the control flow and call graph of a C++ source tree.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source language of the target
    #[arg(value_enum)]
    mode: Mode,

    /// Directory to scan for translation units
    #[arg(short, long)]
    target: PathBuf,

    /// Initial scale factor (overrides [view] scale)
    #[arg(short, long)]
    scale: Option<f64>,

    /// Skip unsupported constructs instead of aborting
    #[arg(short, long)]
    bruteforce: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (default: <target>/codereptile.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the rendered scene as SVG
    #[arg(short, long)]
    output: Option<String>,

    /// Write the laid-out scene as JSON
    #[arg(long)]
    json: Option<String>,

    /// Viewport width (overrides [view] width)
    #[arg(long)]
    width: Option<i32>,

    /// Viewport height (overrides [view] height)
    #[arg(long)]
    height: Option<i32>,

    /// Serve JSON commands on stdin/stdout
    #[arg(long)]
    interactive: bool,

    /// Print the reduced tree outline
    #[arg(long)]
    print: bool,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let language = Language::from(cli.mode);
    if !language.is_implemented() {
        error!("{} code parsing is not implemented yet", language);
        return ExitCode::from(1);
    }
    if !cli.target.is_dir() {
        error!("Target {} is not a directory", cli.target.display());
        return ExitCode::from(1);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            exit_code_for(&e)
        }
    }
}

/// 2 for compiler diagnostics, 3 for other reduction aborts, 1 otherwise.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<ReduceError>() {
        Some(ReduceError::UpstreamDiagnostics { .. }) => ExitCode::from(2),
        Some(_) => ExitCode::from(3),
        None => ExitCode::from(1),
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load(&cli.target)?,
    };
    if let Some(source) = &config.source {
        info!("using config {}", source.display());
    }
    let scale = cli.scale.unwrap_or(config.view.scale);
    if !Scaler::is_valid_scale(scale) {
        anyhow::bail!("--scale must be positive and at most {}", MAX_SCALE);
    }

    let provider = ClangProvider::from_config(&config.parse);
    provider.check_available()?;

    let reducer = AstReducer::new(ErrorPolicy::from_bruteforce(cli.bruteforce)).with_std_filter(
        StandardHeaderFilter::with_extra(config.parse.extra_std_filters.iter().cloned()),
    );
    if reducer.policy().is_tolerant() {
        warn!("brute-force mode: unsupported constructs are skipped");
    }
    let usecase = AnalyzeUsecase {
        provider: &provider,
        reducer,
        extensions: config.parse.extensions.clone(),
    };
    let analysis = usecase.run(&cli.target)?;

    if cli.print || (cli.output.is_none() && cli.json.is_none() && !cli.interactive) {
        print!("{}", analysis.tree.outline());
    }

    let scaler = Scaler::new(scale);
    let mut scene = Scene::new(
        analysis.tree,
        scaler,
        cli.width.unwrap_or(config.view.width),
        cli.height.unwrap_or(config.view.height),
        config.view.curve_steps,
    );

    if let Some(path) = &cli.output {
        scene.export_svg(path)?;
        info!("scene written to {}", path);
    }
    if let Some(path) = &cli.json {
        let dto = SceneDto::from(&scene);
        let content = serde_json::to_string_pretty(&dto)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path))?;
        info!("scene JSON written to {}", path);
    }
    if cli.interactive {
        let stdin = io::stdin();
        run_session(&mut scene, stdin.lock(), io::stdout())?;
    }
    Ok(())
}
