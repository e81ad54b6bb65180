use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use weatherclock_core::{
    ClockFace, Config, ConfigStore, Connector, DisplayState, PipelineState, WeatherError,
    WeatherPipeline, pipeline::REFRESH_INTERVAL,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherclock", version, about = "Clock with current weather")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, host and city, then refresh. Prompts when no flags are given.
    Configure {
        #[arg(long)]
        api_key: Option<String>,

        /// API host, e.g. "simple.ai.qweatherapi.com".
        #[arg(long)]
        host: Option<String>,

        /// City name; an empty value means "locate by IP".
        #[arg(long)]
        city: Option<String>,
    },

    /// Print the clock with the last known weather, without touching the network.
    Show,

    /// Fetch the weather once and print the clock.
    Refresh,

    /// Keep running: refresh every 30 minutes, `r` + Enter refreshes now, Ctrl-C quits.
    Watch,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let store = Arc::new(ConfigStore::open_default()?);
        let connector = Connector::new().context("Failed to build HTTP client")?;
        let pipeline = Arc::new(WeatherPipeline::new(Arc::clone(&store), connector));

        match self.command {
            Command::Configure { api_key, host, city } => {
                let current = store.load();
                let (api_key, host, city) = if api_key.is_none() && host.is_none() && city.is_none()
                {
                    prompt_settings(&current)?
                } else {
                    (
                        api_key.unwrap_or(current.api_key),
                        host.unwrap_or(current.api_host),
                        city.unwrap_or(current.custom_city),
                    )
                };

                store.update(|cfg| cfg.apply_settings(&api_key, &host, &city))?;
                println!("Saved settings to {}", store.path().display());
                refresh_once(&pipeline).await;
            }
            Command::Show => render(&pipeline),
            Command::Refresh => refresh_once(&pipeline).await,
            Command::Watch => watch(pipeline).await?,
        }

        Ok(())
    }
}

fn prompt_settings(current: &Config) -> Result<(String, String, String)> {
    let api_key = inquire::Text::new("QWeather API key:")
        .with_initial_value(&current.api_key)
        .prompt()?;
    let host = inquire::Text::new("API host:")
        .with_initial_value(&current.api_host)
        .with_help_message("Leave empty for the default host")
        .prompt()?;
    let city = inquire::Text::new("Custom city:")
        .with_initial_value(&current.custom_city)
        .with_help_message("Leave empty to locate by IP")
        .prompt()?;

    Ok((api_key, host, city))
}

async fn refresh_once(pipeline: &WeatherPipeline) {
    if let Err(WeatherError::NoApiKey) = pipeline.run().await {
        eprintln!("Hint: run `weatherclock configure` and enter your QWeather API key.");
    }
    render(pipeline);
}

async fn watch(pipeline: Arc<WeatherPipeline>) -> Result<()> {
    render(&pipeline);

    let mut states = pipeline.subscribe();
    // First tick fires immediately and serves as the startup refresh.
    let mut schedule = tokio::time::interval(REFRESH_INTERVAL);
    schedule.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut redraw = tokio::time::interval(Duration::from_secs(60));
    redraw.tick().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = schedule.tick() => spawn_run(&pipeline),
            _ = redraw.tick() => render(&pipeline),
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                render(&pipeline);
            }
            line = lines.next_line(), if stdin_open => match line.context("Failed to read stdin")? {
                Some(l) if l.trim().eq_ignore_ascii_case("r") => spawn_run(&pipeline),
                Some(_) => {}
                None => stdin_open = false,
            },
            _ = &mut ctrl_c => break,
        }
    }

    Ok(())
}

/// Runs are not deduplicated; an overlapping trigger starts its own run.
fn spawn_run(pipeline: &Arc<WeatherPipeline>) {
    let pipeline = Arc::clone(pipeline);
    tokio::spawn(async move {
        // Outcome is logged and published by the pipeline.
        let _ = pipeline.run().await;
    });
}

fn render(pipeline: &WeatherPipeline) {
    let cached = pipeline.cached();
    let state = pipeline.state();
    println!("{}", format_face(&ClockFace::at(&Local::now()), &state, &cached));
}

fn format_face(face: &ClockFace, state: &PipelineState, cached: &DisplayState) -> String {
    format!(
        "{}\n{}\n{} {} {}\n",
        face.time,
        face.date,
        state.location_text(cached),
        cached.icon_glyph,
        cached.temperature_text
    )
}
