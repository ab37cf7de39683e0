use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{config::load_settings, BindingTable, ClientSettings, Layout};
use crossbeam_channel::bounded;
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use controller::events::{UiError, UiErrorContext, UiEvent};
use ui::TravellerApp;

#[derive(Parser, Debug)]
struct Args {
    /// Character server base URL, e.g. http://127.0.0.1:5000
    #[arg(long)]
    server_url: Option<String>,
    /// Settings file; defaults to ./traveller.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    layout: Option<Layout>,
}

fn settings_from(args: &Args) -> Result<(ClientSettings, BindingTable)> {
    let mut settings = load_settings(args.config.as_deref()).context("failed to load settings")?;
    if let Some(server_url) = &args.server_url {
        settings = settings
            .with_server_url(server_url)
            .context("invalid --server-url")?;
    }
    if let Some(layout) = args.layout {
        settings.layout = layout;
        settings.bindings = None;
    }
    let bindings = BindingTable::from_settings(&settings).context("invalid page bindings")?;
    Ok((settings, bindings))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let (settings, bindings, startup_error) = match settings_from(&args) {
        Ok((settings, bindings)) => (settings, bindings, None),
        Err(err) => (
            ClientSettings::local().context("built-in settings are invalid")?,
            BindingTable::full(),
            Some(UiError::from_message(
                UiErrorContext::Settings,
                format!("{err:#}; using defaults"),
            )),
        ),
    };

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(settings.clone(), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Traveller Character Generator")
            .with_inner_size([960.0, 640.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Traveller Character Generator",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(TravellerApp::new(
                cmd_tx,
                ui_rx,
                &settings,
                &bindings,
                startup_error,
            )))
        }),
    )
    .map_err(|err| anyhow::anyhow!("traveller gui exited: {err}"))
}
