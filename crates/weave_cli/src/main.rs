//! Weave CLI
//!
//! Command-line driver for the Weave UI controller:
//! - inspect and change the persisted theme/density
//! - replay or simulate host application messages
//! - initialize a page from a declarative layout and watch its events

mod renderer;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use renderer::LogRenderer;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use weave_core::{InputAction, InputEvent};
use weave_theme::{PreferenceStore, Preferences};
use weave_ui::{BridgeOutcome, FileStorage, HostChannel, PageScan, WeaveConfig, WeaveUi};

#[derive(Parser, Debug)]
#[command(name = "weave")]
#[command(about = "Drive the Weave UI controller from the command line")]
#[command(version)]
struct Cli {
    /// Configuration file, or a directory containing weave.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Preference file (overrides `[storage] path`)
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the persisted theme and density
    Show,

    /// Change the theme and/or density
    Set {
        #[arg(long)]
        theme: Option<String>,
        #[arg(long)]
        density: Option<String>,
    },

    /// Deliver a raw host message, e.g. '{"type":"weave-ui-theme-change","payload":{"theme":"dark-blue"}}'
    HostMessage { message: String },

    /// Apply a theme change as if the host application had sent it
    SimulateHost {
        #[arg(long)]
        theme: Option<String>,
        #[arg(long)]
        density: Option<String>,
    },

    /// Initialize a page from a layout file and print the events it emits
    Scan {
        layout: PathBuf,

        /// Activate these controls after initialization, in order
        #[arg(long = "activate")]
        activate: Vec<String>,
    },

    /// Print the effective configuration
    Config,
}

/// Host channel that prints outbound messages
struct StdoutHost;

impl HostChannel for StdoutHost {
    fn post(&self, message: &str) {
        println!("host <- {message}");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let storage = cli
        .storage
        .clone()
        .unwrap_or_else(|| config.storage.path.clone());
    tracing::debug!("preferences stored in {}", storage.display());

    match cli.command {
        Command::Show => {
            let store = PreferenceStore::new(FileStorage::open(&storage));
            print_preferences(store.preferences());
        }
        Command::Set { theme, density } => {
            let mut ui = controller(&config, &storage, &PageScan::default());
            let prefs = match (theme.as_deref(), density.as_deref()) {
                (Some(theme), Some(density)) => ui.set_theme_and_density(theme, density)?,
                (Some(theme), None) => ui.set_theme(theme)?,
                (None, Some(density)) => ui.set_density(density)?,
                (None, None) => anyhow::bail!("Nothing to set. Pass --theme and/or --density."),
            };
            print_preferences(prefs);
        }
        Command::HostMessage { message } => {
            let mut ui = controller(&config, &storage, &PageScan::default());
            report(ui.receive_host_message(&message))?;
        }
        Command::SimulateHost { theme, density } => {
            let mut ui = controller(&config, &storage, &PageScan::default());
            report(ui.simulate_host_app_message(theme.as_deref(), density.as_deref()))?;
        }
        Command::Scan { layout, activate } => {
            let content = fs::read_to_string(&layout)
                .with_context(|| format!("Failed to read {}", layout.display()))?;
            let scan = PageScan::from_toml_str(&content)
                .with_context(|| format!("Failed to parse {}", layout.display()))?;

            let mut ui = controller(&config, &storage, &scan);
            for target in activate {
                ui.handle_input(InputEvent::new(target.as_str(), InputAction::Activate))
                    .with_context(|| format!("Failed to activate {target}"))?;
            }

            for (target, state) in ui.renderer().states() {
                println!("{target}: {state:?}");
            }
        }
        Command::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<WeaveConfig> {
    match path {
        Some(path) => WeaveConfig::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None if Path::new("weave.toml").is_file() => {
            WeaveConfig::load_from_path(Path::new("weave.toml")).context("Failed to load weave.toml")
        }
        None => Ok(WeaveConfig::default()),
    }
}

/// Controller over file storage that prints every event it publishes
fn controller(
    config: &WeaveConfig,
    storage: &Path,
    scan: &PageScan,
) -> WeaveUi<FileStorage, LogRenderer> {
    let mut ui = WeaveUi::from_config(config, FileStorage::open(storage), LogRenderer::default());
    ui.bus().subscribe_all(|event| match event.source {
        Some(source) => println!("{} ({}) {:?}", event.kind, source, event.payload),
        None => println!("{} {:?}", event.kind, event.payload),
    });
    if config.host.forward {
        ui.forward_to_host(Arc::new(StdoutHost));
    }
    ui.initialize(scan);
    ui
}

fn print_preferences(prefs: Preferences) {
    println!("theme: {} ({})", prefs.theme.id(), prefs.theme.display_name());
    println!(
        "density: {} ({})",
        prefs.density.id(),
        prefs.density.display_name()
    );
}

fn report(outcome: BridgeOutcome) -> Result<()> {
    match outcome {
        BridgeOutcome::Applied(prefs) => print_preferences(prefs),
        BridgeOutcome::Disabled => println!("host app integration is disabled"),
        BridgeOutcome::Ignored => println!("message ignored"),
        BridgeOutcome::Rejected(err) => anyhow::bail!("Host message rejected: {err}"),
    }
    Ok(())
}
