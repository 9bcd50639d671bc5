use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::domain::Coordinate;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::RecvError},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod controller;
mod ui;

use config::{load_settings, Settings};
use controller::{InputCommand, InteractionController, PipelineOutcome, HELP_TEXT};
use ui::{
    display::{DisplayUpdate, ElementId},
    render, DisplayController, LoadingPolicy, TerminalMap,
};

#[derive(Parser, Debug)]
#[command(name = "atlas", about = "Country facts and neighbours by map click or name")]
struct Cli {
    /// Config file; `atlas.toml` in the working directory is used when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    loading_policy: Option<LoadingPolicy>,
    #[arg(long)]
    geocode_base_url: Option<String>,
    #[arg(long)]
    countries_base_url: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Click the map once and print the resulting panels.
    Click {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
    /// Submit a country name once and print the resulting panels.
    Search { name: Vec<String> },
}

impl Cli {
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(policy) = self.loading_policy {
            settings.loading_policy = policy;
        }
        if let Some(url) = &self.geocode_base_url {
            settings.geocode_base_url = url.clone();
        }
        if let Some(url) = &self.countries_base_url {
            settings.countries_base_url = url.clone();
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    cli.apply_overrides(&mut settings);
    init_tracing(&settings.log_filter);

    let (geocoder, directory) = settings
        .endpoints()
        .connect()
        .context("failed to build service clients")?;
    let display = DisplayController::new(settings.loading_policy);
    let map = Arc::new(TerminalMap::new(settings.map_view()?));
    let controller = InteractionController::new(
        Arc::new(geocoder),
        Arc::new(directory),
        display.clone(),
        map.clone(),
    );
    info!(
        geocode = %settings.geocode_base_url,
        countries = %settings.countries_base_url,
        loading_policy = ?settings.loading_policy,
        "atlas ready"
    );

    match cli.command {
        Some(Command::Click { lat, lon }) => {
            let coordinate = Coordinate::new(lat, lon).context("invalid click coordinate")?;
            let outcome = controller.on_map_click(coordinate).await?;
            finish_one_shot(&display, outcome).await;
        }
        Some(Command::Search { name }) => match controller.on_submit(&name.join(" ")) {
            Ok(pipeline) => finish_one_shot(&display, pipeline.await?).await,
            Err(prompt) => eprintln!("{prompt}"),
        },
        None => run_interactive(controller, display, map).await?,
    }

    Ok(())
}

async fn finish_one_shot(display: &DisplayController, outcome: PipelineOutcome) {
    let stage = outcome.stage();
    match &outcome {
        PipelineOutcome::Displayed { country, borders } => info!(
            stage = stage.as_str(),
            %country,
            neighbours = borders.len(),
            "lookup finished"
        ),
        PipelineOutcome::Failed {
            stage: failed_at,
            error,
        } => warn!(
            stage = stage.as_str(),
            failed_at = failed_at.as_str(),
            %error,
            "lookup failed"
        ),
    }
    outcome.settle().await;
    print!("{}", render::render_panels(&display.snapshot()));
}

async fn run_interactive(
    controller: Arc<InteractionController>,
    display: DisplayController,
    map: Arc<TerminalMap>,
) -> Result<()> {
    let renderer = tokio::spawn(print_updates(display.subscribe()));
    println!("{HELP_TEXT}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match InputCommand::parse(&line) {
            Ok(InputCommand::Click(coordinate)) => {
                // Detached: the pipeline keeps running while more input arrives.
                drop(controller.on_map_click(coordinate));
            }
            Ok(InputCommand::Submit(text)) => {
                info!(element = %ElementId::SubmitControl, "submit activated");
                if let Err(prompt) = controller.on_submit(&text) {
                    println!("{prompt}");
                }
            }
            Ok(InputCommand::Show) => {
                let current = controller.current_marker();
                for (marker, at) in map.live_markers() {
                    let tag = if Some(marker) == current {
                        " (current)"
                    } else {
                        ""
                    };
                    println!(
                        "marker {}{tag} at {}, {}",
                        marker.0, at.latitude, at.longitude
                    );
                }
                print!("{}", render::render_panels(&display.snapshot()));
            }
            Ok(InputCommand::Help) => println!("{HELP_TEXT}"),
            Ok(InputCommand::Quit) => break,
            Ok(InputCommand::Nothing) => {}
            Err(err) => println!("{err}"),
        }
    }

    renderer.abort();
    Ok(())
}

async fn print_updates(mut updates: broadcast::Receiver<DisplayUpdate>) {
    loop {
        match updates.recv().await {
            Ok(update) => println!(
                "[{}] {}",
                update.change.element(),
                render::render_change(&update.change)
            ),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "display renderer fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
