//! Enhanced CADENCE demo runner.
//!
//! Provisions configuration, runs the bootstrap gates and serves the demo
//! until Ctrl+C. The exit code is decided here and nowhere else.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use cadence_demo::bootstrap::{BootstrapError, SqliteFileStorage, SystemProbe};
use cadence_demo::config::{load_config, ConfigurationSet, DemoConfig};
use cadence_demo::console;
use cadence_demo::http::{demo_router, AppState, AxumHost, ServeConfig};
use cadence_demo::lifecycle::{shutdown_on_stop, wait_for_stop, BootSequence, Shutdown};
use cadence_demo::observability::logging;

#[derive(Parser)]
#[command(name = "cadence-demo")]
#[command(about = "Bootstrap and serve the Enhanced CADENCE search demo", long_about = None)]
struct Args {
    /// Optional TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Workspace root (overrides `workspace.root`).
    #[arg(short, long)]
    workdir: Option<PathBuf>,

    /// Skip the banner and instructions.
    #[arg(short, long)]
    quiet: bool,

    /// Run the preflight gates and exit without serving.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("cadence-demo: {e}");
            return ExitCode::from(e.exit_code());
        }
    };

    let options = Arc::new(ConfigurationSet::provision(&config.environment));
    if let Err(e) = logging::init(options.get("LOG_LEVEL").unwrap_or("info")) {
        eprintln!("cadence-demo: logging unavailable: {e}");
    }

    if !args.quiet {
        console::print_banner();
    }
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Enhanced CADENCE demo");

    match run(&args, config, options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, exit_code = e.exit_code(), "Demo failed");
            ExitCode::from(e.exit_code())
        }
    }
}

fn load(args: &Args) -> Result<DemoConfig, BootstrapError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => DemoConfig::default(),
    };
    if let Some(dir) = &args.workdir {
        config.workspace.root = dir.clone();
    }
    Ok(config)
}

async fn run(args: &Args, config: DemoConfig, options: Arc<ConfigurationSet>) -> Result<(), BootstrapError> {
    let root = config.workspace.root.clone();
    let probe = SystemProbe::from_env(&config.probe.library_dirs);
    let storage = SqliteFileStorage::new(&root);

    let ready = BootSequence::new(options, &root, probe, storage).prepare().await?;
    let serve_config = ServeConfig::from_options(ready.options())?;

    if args.check {
        tracing::info!(state = ?ready.report().state(), "Preflight passed, not serving");
        return Ok(());
    }

    if !args.quiet {
        console::print_instructions(&browser_address(&serve_config));
    }

    let app = demo_router(
        AppState::from_report(ready.report()),
        &root.join(&config.server.static_dir),
    );
    let host = AxumHost::new(app)
        .request_timeout(Duration::from_secs(config.server.request_timeout_secs))
        .shutdown_grace(Duration::from_secs(config.server.shutdown_grace_secs));

    let shutdown = Shutdown::new();
    let stopped = shutdown.signalled();
    tokio::spawn(shutdown_on_stop(shutdown, wait_for_stop()));

    ready.serve(host, stopped).await?;

    if !args.quiet {
        console::print_farewell();
    }
    Ok(())
}

/// Address an operator can open locally.
fn browser_address(config: &ServeConfig) -> String {
    match config.host.as_str() {
        "0.0.0.0" | "::" => format!("localhost:{}", config.port),
        _ => config.bind_address(),
    }
}
