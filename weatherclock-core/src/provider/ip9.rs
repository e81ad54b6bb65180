use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{WeatherError, truncate_body};

use super::IpLocator;

/// ip9.com.cn public-IP city lookup. No authentication.
#[derive(Debug, Clone)]
pub struct Ip9Locator {
    http: Client,
    url: String,
}

impl Ip9Locator {
    pub fn new(http: Client, url: String) -> Self {
        Self { http, url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Deserialize)]
struct Ip9Response {
    data: Option<Ip9Data>,
}

#[derive(Debug, Deserialize)]
struct Ip9Data {
    city: Option<String>,
}

pub(crate) fn parse_city(body: &str) -> Result<String, WeatherError> {
    let parsed: Ip9Response = serde_json::from_str(body)
        .map_err(|e| WeatherError::GeoFailure(format!("IP lookup JSON: {e}")))?;

    let data = parsed.data.ok_or_else(|| WeatherError::GeoFailure("missing `data`".into()))?;
    match data.city {
        Some(city) if !city.trim().is_empty() => Ok(city.trim().to_string()),
        _ => Err(WeatherError::GeoFailure("missing `data.city`".into())),
    }
}

#[async_trait]
impl IpLocator for Ip9Locator {
    async fn locate_city(&self) -> Result<String, WeatherError> {
        tracing::debug!(url = %self.url, "sending IP geolocation request");

        let res = self.http.get(&self.url).send().await?;
        let status = res.status();
        let body = res.text().await?;
        tracing::debug!(%status, body = %truncate_body(&body), "IP geolocation response");

        if !status.is_success() {
            return Err(WeatherError::Http { status: status.as_u16(), body: truncate_body(&body) });
        }

        parse_city(&body)
    }
}
