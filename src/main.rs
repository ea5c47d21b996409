//! rext server binary.
//!
//! Serves a build output directory: `<root>/<build>/resources.json` for
//! routes, `<root>/<build>/server/` for page modules, `<root>/<build>/static/`
//! for client assets.

use std::path::PathBuf;

use clap::Parser;

use rext::config::{load_config, RextConfig};
use rext::http::dev::{self, DevUpdate};
use rext::lifecycle::{signals, Shutdown};
use rext::manifest::ManifestWatcher;
use rext::observability::{logging, metrics};
use rext::Server;

#[derive(Parser)]
#[command(name = "rext")]
#[command(about = "Server-side rendering for pre-compiled pages", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Development mode: no module cache, manifest reloads on change.
    #[arg(long)]
    dev: bool,

    #[arg(long)]
    host: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,

    /// Watch the manifest on disk (development only).
    #[arg(long)]
    watch: bool,
}

impl Cli {
    fn apply(&self, config: &mut RextConfig) {
        if self.dev {
            config.dev = true;
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RextConfig::default(),
    };
    cli.apply(&mut config);

    if let Err(e) = logging::init(&config.observability) {
        eprintln!("tracing subscriber already installed: {}", e);
    }

    tracing::info!("rext v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        dev = config.dev,
        root = %config.dir.root,
        manifest = ?config.manifest_path(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let mut builder = Server::builder(config.clone());

    // Kept alive for the life of the server; dropping it stops watching.
    let mut _watcher = None;
    if config.dev {
        let (tx, rx) = dev::channel();
        // No build pushes an in-memory filesystem here, so read the disk once.
        let _ = tx.send(DevUpdate::ManifestChanged);
        if cli.watch {
            _watcher = Some(ManifestWatcher::new(&config.manifest_path(), tx.clone()).run()?);
        }
        builder = builder.dev_updates(rx);
    }

    let server = builder.build()?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());
    server.listen(shutdown.wait()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
