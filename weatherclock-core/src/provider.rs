use crate::{
    error::WeatherError,
    model::{GeoLocation, PipelineConfig, WeatherReading},
    provider::{ip9::Ip9Locator, qweather::QWeatherProvider},
};
use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};

pub mod ip9;
pub mod qweather;

pub const DEFAULT_IP_LOCATOR_URL: &str = "https://ip9.com.cn/get";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "WeatherClock/2.0";

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Geocode a city name. `Ok(None)` means the provider answered but had no usable hit;
    /// `Err` is reserved for transport and HTTP-level failures.
    async fn lookup_city(&self, city: &str) -> Result<Option<GeoLocation>, WeatherError>;

    /// Current conditions for a location identifier.
    async fn current_conditions(&self, location_id: &str) -> Result<WeatherReading, WeatherError>;
}

#[async_trait]
pub trait IpLocator: Send + Sync + Debug {
    /// City name for the caller's public IP.
    async fn locate_city(&self) -> Result<String, WeatherError>;
}

/// Shared HTTP client plus endpoint wiring, built once at the composition root.
#[derive(Debug, Clone)]
pub struct Connector {
    http: Client,
    scheme: String,
    ip_locator_url: String,
}

impl Connector {
    pub fn new() -> Result<Self, WeatherError> {
        Self::with_endpoints("https", DEFAULT_IP_LOCATOR_URL)
    }

    /// Override the provider URL scheme and the IP geolocation URL, e.g. to target a local server.
    pub fn with_endpoints(scheme: &str, ip_locator_url: &str) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).user_agent(USER_AGENT).build()?;

        Ok(Self { http, scheme: scheme.to_string(), ip_locator_url: ip_locator_url.to_string() })
    }

    pub fn weather_provider(&self, config: &PipelineConfig) -> QWeatherProvider {
        let base_url = format!("{}://{}", self.scheme, config.api_host);
        QWeatherProvider::new(self.http.clone(), base_url, config.api_key.clone())
    }

    pub fn ip_locator(&self) -> Ip9Locator {
        Ip9Locator::new(self.http.clone(), self.ip_locator_url.clone())
    }
}
