//! Weather update run: resolve location, fetch conditions, commit the display state.
//!
//! Runs are independent. Overlapping runs are allowed, and whichever finishes last
//! owns the persisted [`DisplayState`]. Persistence itself goes through
//! [`ConfigStore::update`], so concurrent writers never drop each other's fields.

use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    config::ConfigStore,
    error::WeatherError,
    location,
    model::DisplayState,
    provider::{Connector, WeatherProvider},
};

/// Interval between scheduled runs.
pub const REFRESH_INTERVAL: std::time::Duration = std::time::Duration::from_secs(30 * 60);

pub const REFRESHING_TEXT: &str = "Refreshing...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    /// `city` is the custom city being looked up, if one is configured.
    ResolvingLocation { city: Option<String> },
    FetchingWeather { label: String },
    Succeeded(DisplayState),
    /// Short diagnostic for the location field.
    Failed(String),
}

impl PipelineState {
    /// Text for the location field. `cached` fills in while nothing newer is known.
    pub fn location_text(&self, cached: &DisplayState) -> String {
        match self {
            PipelineState::Idle => cached.location_label.clone(),
            PipelineState::ResolvingLocation { city: Some(city) } => city.clone(),
            PipelineState::ResolvingLocation { city: None } => REFRESHING_TEXT.to_string(),
            PipelineState::FetchingWeather { label } => label.clone(),
            PipelineState::Succeeded(state) => state.location_label.clone(),
            PipelineState::Failed(status) => status.clone(),
        }
    }
}

#[derive(Debug)]
pub struct WeatherPipeline {
    store: Arc<ConfigStore>,
    connector: Connector,
    state: watch::Sender<PipelineState>,
}

impl WeatherPipeline {
    pub fn new(store: Arc<ConfigStore>, connector: Connector) -> Self {
        let (state, _) = watch::channel(PipelineState::Idle);
        Self { store, connector, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> PipelineState {
        self.state.borrow().clone()
    }

    /// Last persisted snapshot, for display before the first run completes.
    pub fn cached(&self) -> DisplayState {
        self.store.load().display_state()
    }

    /// Execute one run. Failures leave the persisted state untouched.
    pub async fn run(&self) -> Result<DisplayState, WeatherError> {
        tracing::info!("weather update started");
        let result = self.execute().await;

        match &result {
            Ok(snapshot) => {
                tracing::info!(
                    location = %snapshot.location_label,
                    temp = %snapshot.temperature_text,
                    icon = %snapshot.icon_glyph,
                    "weather update finished"
                );
                self.state.send_replace(PipelineState::Succeeded(snapshot.clone()));
            }
            Err(err) => {
                tracing::error!("weather update failed: {err}");
                self.state.send_replace(PipelineState::Failed(err.status_text()));
            }
        }

        result
    }

    async fn execute(&self) -> Result<DisplayState, WeatherError> {
        let config = self.store.load().pipeline_config();
        if config.api_key.is_empty() {
            return Err(WeatherError::NoApiKey);
        }
        tracing::debug!(host = %config.api_host, city = %config.custom_city, "pipeline config");

        let city = (!config.custom_city.is_empty()).then(|| config.custom_city.clone());
        self.state.send_replace(PipelineState::ResolvingLocation { city });
        let provider = self.connector.weather_provider(&config);
        let locator = self.connector.ip_locator();
        let resolved = location::resolve(&config.custom_city, &provider, &locator).await?;

        self.state.send_replace(PipelineState::FetchingWeather { label: resolved.label.clone() });
        let reading = provider.current_conditions(&resolved.id).await?;

        let display = DisplayState::from_reading(&resolved.label, &reading);
        if let Err(err) = self.store.update(|cfg| cfg.set_display_state(&display)) {
            tracing::warn!("failed to persist display state: {err:#}");
        }

        Ok(display)
    }
}
