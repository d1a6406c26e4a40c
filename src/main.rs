//! QuakeSphere CLI
//!
//! Extracts the window of seismic velocity samples around an event mark.

use clap::{Args, Parser, Subcommand};
use quakesphere::{
    config::Config,
    logging::init_logging,
    pipeline::ImportPipeline,
    VERSION,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quakesphere")]
#[command(version = VERSION)]
#[command(about = "Seismic event window service", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the import endpoint over HTTP
    #[cfg(feature = "server")]
    Serve {
        /// Port to listen on (0 for random)
        #[arg(long)]
        port: Option<u16>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Select the window once and print it as JSON
    Select {
        #[command(flatten)]
        overrides: Overrides,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Show configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,

        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Command-line overrides for values in the config file.
#[derive(Args, Debug, Default)]
struct Overrides {
    /// CSV recording to read
    #[arg(long)]
    source: Option<PathBuf>,

    /// Samples to take before the mark
    #[arg(long)]
    points_before: Option<usize>,

    /// Total samples in the window
    #[arg(long)]
    total_points: Option<usize>,

    /// Fixed event mark time in seconds
    #[arg(long)]
    mark_time: Option<f64>,

    /// JSON catalogue of per-recording mark times
    #[arg(long)]
    mark_catalog: Option<PathBuf>,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(source) = self.source {
            config.source_path = source;
        }
        if let Some(n) = self.points_before {
            config.points_before = n;
        }
        if let Some(n) = self.total_points {
            config.total_points = n;
        }
        if let Some(t) = self.mark_time {
            config.mark_time = t;
        }
        if self.mark_catalog.is_some() {
            config.mark_catalog = self.mark_catalog;
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        #[cfg(feature = "server")]
        Commands::Serve { port, overrides } => cmd_serve(port, overrides),
        Commands::Select { overrides, pretty } => cmd_select(overrides, pretty),
        Commands::Config { save, overrides } => cmd_config(save, overrides),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn load_config(overrides: Overrides) -> anyhow::Result<Config> {
    let mut config = Config::load()?;
    overrides.apply(&mut config);
    Ok(config)
}

#[cfg(feature = "server")]
fn cmd_serve(port: Option<u16>, overrides: Overrides) -> anyhow::Result<()> {
    use quakesphere::server::{self, ServerConfig};
    use std::sync::Arc;

    let mut config = load_config(overrides)?;
    if let Some(port) = port {
        config.port = port;
    }

    let server_config = ServerConfig::from_config(&config)?;
    let provider: Arc<dyn quakesphere::MarkTimeProvider> = Arc::from(config.mark_provider()?);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let server = server::run(server_config, provider).await?;
        println!("QuakeSphere v{VERSION} listening on http://{}", server.addr());
        println!("Press Ctrl+C to stop.");

        tokio::signal::ctrl_c().await?;
        // Waits for in-flight requests to drain
        server.shutdown().await?;
        Ok::<(), anyhow::Error>(())
    })
}

fn cmd_select(overrides: Overrides, pretty: bool) -> anyhow::Result<()> {
    let config = load_config(overrides)?;
    let response = ImportPipeline::from_config(&config)?.run()?;

    let json = if pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{json}");
    Ok(())
}

fn cmd_config(save: bool, overrides: Overrides) -> anyhow::Result<()> {
    let config = load_config(overrides)?;
    config.window_spec()?;

    println!("QuakeSphere Configuration");
    println!("=========================");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);

    if save {
        config.save()?;
        println!();
        println!("Saved to {:?}", Config::config_path());
    }
    Ok(())
}
