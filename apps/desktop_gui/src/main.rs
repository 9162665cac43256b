use std::{path::PathBuf, sync::Arc};

mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::{connect_store, load_settings, MissingVenueStore, Settings, VenueStore};
use crossbeam_channel::bounded;
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::ui::VenueMapApp;

#[derive(Parser, Debug)]
#[command(name = "venue-map-gui", about = "Interactive map of venues")]
struct Args {
    /// Settings file; defaults to $VENUE_MAP_CONFIG or ./venue_map.toml.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let (settings, store, startup_error): (Settings, Arc<dyn VenueStore>, Option<UiError>) =
        match load_settings(args.config.as_deref()) {
            Ok(settings) => {
                let store = connect_store(&settings.store);
                (settings, store, None)
            }
            Err(err) => {
                tracing::error!("config: {err}");
                let banner = UiError::from_message(
                    UiErrorContext::Settings,
                    format!("Invalid settings, venue store disabled: {err}"),
                );
                (Settings::default(), Arc::new(MissingVenueStore), Some(banner))
            }
        };

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(1024);
    let _backend = backend_bridge::runtime::launch(store, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Venue Map")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Venue Map",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(VenueMapApp::new(
                &settings,
                cmd_tx,
                ui_rx,
                startup_error,
            )))
        }),
    )
    .map_err(|err| anyhow::anyhow!("failed to run the map window: {err}"))
}
