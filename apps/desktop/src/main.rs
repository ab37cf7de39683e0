use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::load_settings, execute, render, Action, AppState, BindingTable, ClientSettings,
    HttpCharacterApi, Layout, Page, TermCheck,
};
use shared::domain::{Characteristic, Service};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Drive a Traveller character server from the terminal.
#[derive(Parser, Debug)]
#[command(name = "traveller")]
struct Args {
    /// Character server base URL, e.g. http://127.0.0.1:5000
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// Settings file; defaults to ./traveller.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Page variant to print: full or compact.
    #[arg(long, global = true)]
    layout: Option<Layout>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the current character.
    Status,
    /// Roll up a new character, replacing any existing one.
    Create,
    /// Delete the current character.
    Delete,
    /// Reveal one characteristic (strength, dex, soc, ...).
    Reveal { characteristic: Characteristic },
    /// Attempt to enlist in a service (Navy, Marines, Army, Scouts, Merchants, Others).
    Enlist { service: Service },
    /// Roll this term's survival check.
    Survival,
    /// Roll this term's commission check.
    Commission,
    /// Roll this term's promotion check.
    Promotion,
    /// Roll for re-enlistment.
    Reenlist,
}

impl Command {
    fn action(&self) -> Action {
        match self {
            Command::Status => Action::Refresh,
            Command::Create => Action::Create,
            Command::Delete => Action::Delete,
            Command::Reveal { characteristic } => Action::Reveal(*characteristic),
            Command::Enlist { service } => Action::Enlist(*service),
            Command::Survival => Action::Check(TermCheck::Survival),
            Command::Commission => Action::Check(TermCheck::Commission),
            Command::Promotion => Action::Check(TermCheck::Promotion),
            Command::Reenlist => Action::Reenlist,
        }
    }
}

fn settings_from(args: &Args) -> Result<ClientSettings> {
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
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = settings_from(&args)?;
    let bindings = BindingTable::from_settings(&settings).context("invalid page bindings")?;
    let api = HttpCharacterApi::new(&settings).context("failed to build character client")?;
    info!(server_url = %settings.server_url, "using character server");

    let features = settings.features;
    let mut state = AppState::new(features);
    state.apply(execute(&api, Action::Refresh, &features).await);

    let action = args.command.action();
    let mut failed = false;
    if action != Action::Refresh && state.begin(action) {
        let report = execute(&api, action, &features).await;
        if let Err(err) = &report.result {
            warn!(action = %action, error = %err, "command failed");
            failed = true;
        }
        state.apply(report);
    }

    let mut page = Page::new(&bindings);
    render(&state, &mut page);
    print!("{page}");

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
