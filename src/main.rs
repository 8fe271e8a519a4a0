use std::path::PathBuf;

use clap::Parser;
use eframe::egui;

use token_gauge::config::store::{provision_defaults, ConfigStore, JsonFileStore, MemoryStore};
use token_gauge::net::open_source;

mod app;

use app::GaugeApp;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Live usage gauge for a chat page")]
struct Args {
    /// Conversation page: an http(s) URL or an HTML file
    source: String,

    /// Path to the settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(e) = run(args) {
        log::error!("Token Gauge: {}", e);
        eprintln!("token-gauge: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let store: Box<dyn ConfigStore> = match args.config.or_else(JsonFileStore::default_path) {
        Some(path) => Box::new(JsonFileStore::open(path)?),
        None => {
            log::warn!("Token Gauge: no config directory, settings will not persist");
            Box::new(MemoryStore::new())
        }
    };
    provision_defaults(store.as_ref())?;

    let source = open_source(&args.source)?;
    let title = format!("Token Gauge: {}", source.describe());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([520.0, 340.0])
            .with_min_inner_size([220.0, 160.0]),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(GaugeApp::new(cc, store, source)))),
    )?;
    Ok(())
}
