use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    connect_store, drive, load_settings,
    mode::{DEFAULT_HOURS_END, DEFAULT_HOURS_START},
    ConfirmPrompt, HeadlessMap, MapOptions, MapSession,
};
use shared::domain::{LngLat, Venue, VenueId};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "List, add, edit and delete venues on the shared map")]
struct Args {
    /// Settings file; defaults to $VENUE_MAP_CONFIG or ./venue_map.toml.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List {
        #[arg(long)]
        json: bool,
    },
    Show {
        id: String,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = DEFAULT_HOURS_START)]
        opens: String,
        #[arg(long, default_value = DEFAULT_HOURS_END)]
        closes: String,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
    },
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        opens: Option<String>,
        #[arg(long)]
        closes: Option<String>,
    },
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

struct TerminalPrompt {
    assume_yes: bool,
}

impl ConfirmPrompt for TerminalPrompt {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{prompt} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(err) => {
                tracing::warn!("failed to read confirmation: {err}");
                false
            }
        }
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn format_venue_line(venue: &Venue) -> String {
    let position = match venue.location() {
        Some(at) if venue.is_placeable() => format!("{:.5}, {:.5}", at.lat, at.lng),
        Some(_) | None => "not on map".to_string(),
    };
    format!(
        "{}  {}  [{}]  {}  ({position})",
        venue.id, venue.name, venue.address, venue.hours
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref()).context("failed to load settings")?;
    let store = connect_store(&settings.store);
    let mut map = HeadlessMap::new(MapOptions::from_settings(&settings.map));
    let mut session = MapSession::from_settings(&settings.map);

    let initial = session.mount(&mut map);
    drive(store.as_ref(), &mut session, &mut map, initial)
        .await
        .context("failed to load venues")?;

    match args.command {
        Command::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(session.venues())?);
            } else if session.venues().is_empty() {
                println!("No venues yet.");
            } else {
                for venue in session.venues() {
                    println!("{}", format_venue_line(venue));
                }
                println!(
                    "{} venues, {} on the map",
                    session.venues().len(),
                    session.marker_count()
                );
            }
        }
        Command::Show { id } => {
            let id = VenueId::new(id);
            if !session.select(&id, &mut map) {
                bail!("no venue with id {id}");
            }
            for event in map.take_events() {
                session.handle_map_event(event, &mut map);
            }
            if let Some(venue) = session.selection() {
                println!("{}", venue.name);
                println!("Address: {}", venue.address);
                println!("Hours:   {}", venue.hours);
            }
            println!("{}", session.readout());
        }
        Command::Add {
            name,
            address,
            opens,
            closes,
            lng,
            lat,
        } => {
            session.toggle_add();
            let click = map.click(LngLat::new(lng, lat));
            session.handle_map_event(click, &mut map);
            if let Some(form) = session.form_mut() {
                form.name = name;
                form.address = address;
                form.hours_start = opens;
                form.hours_end = closes;
            }
            let command = session.submit_draft().context("venue not saved")?;
            drive(store.as_ref(), &mut session, &mut map, command)
                .await
                .context("failed to save venue")?;
            println!("Saved. {} venues in store.", session.venues().len());
        }
        Command::Edit {
            id,
            name,
            address,
            opens,
            closes,
        } => {
            let id = VenueId::new(id);
            if !session.select(&id, &mut map) {
                bail!("no venue with id {id}");
            }
            session.start_editing();
            if let Some(form) = session.form_mut() {
                if let Some(name) = name {
                    form.name = name;
                }
                if let Some(address) = address {
                    form.address = address;
                }
                if let Some(opens) = opens {
                    form.hours_start = opens;
                }
                if let Some(closes) = closes {
                    form.hours_end = closes;
                }
            }
            let command = session.submit_draft().context("venue not saved")?;
            drive(store.as_ref(), &mut session, &mut map, command)
                .await
                .context("failed to update venue")?;
            if let Some(venue) = session.venue(&id) {
                println!("Updated: {}", format_venue_line(venue));
            }
        }
        Command::Delete { id, yes } => {
            let id = VenueId::new(id);
            if session.venue(&id).is_none() {
                bail!("no venue with id {id}");
            }
            let mut prompt = TerminalPrompt { assume_yes: yes };
            match session.request_delete(&id, &mut prompt) {
                Some(command) => {
                    let result = drive(store.as_ref(), &mut session, &mut map, command).await;
                    for alert in session.take_alerts() {
                        eprintln!("{alert}");
                    }
                    result.context("failed to delete venue")?;
                    println!("Deleted {id}.");
                }
                None => println!("Delete cancelled."),
            }
        }
    }

    session.unmount(&mut map);
    Ok(())
}
