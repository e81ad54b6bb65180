use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{WeatherError, truncate_body},
    model::{GeoLocation, WeatherReading},
};

use super::WeatherProvider;

const API_KEY_HEADER: &str = "X-QW-Api-Key";
const SUCCESS_CODE: &str = "200";

/// QWeather client bound to one API host and key.
#[derive(Debug, Clone)]
pub struct QWeatherProvider {
    http: Client,
    base_url: String,
    api_key: String,
}

impl QWeatherProvider {
    pub fn new(http: Client, base_url: String, api_key: String) -> Self {
        Self { http, base_url, api_key }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` with the auth header; returns the body of a 2xx response.
    async fn get(&self, path: &str, location: &str) -> Result<String, WeatherError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, location, api_key = %mask_key(&self.api_key), "sending QWeather request");

        let res = self
            .http
            .get(&url)
            .query(&[("location", location)])
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        tracing::debug!(%url, %status, body = %truncate_body(&body), "QWeather response");

        if !status.is_success() {
            return Err(WeatherError::Http { status: status.as_u16(), body: truncate_body(&body) });
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct QwLookupResponse {
    code: Option<String>,
    location: Option<Vec<QwLocation>>,
}

#[derive(Debug, Deserialize)]
struct QwLocation {
    id: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QwNowResponse {
    code: Option<String>,
    now: Option<QwNow>,
}

#[derive(Debug, Deserialize)]
struct QwNow {
    temp: Option<String>,
    icon: Option<String>,
}

/// First geocode hit, or `None` for any business-level miss.
pub(crate) fn parse_lookup(body: &str) -> Result<Option<GeoLocation>, WeatherError> {
    let parsed: QwLookupResponse = serde_json::from_str(body)
        .map_err(|e| WeatherError::Malformed(format!("city lookup JSON: {e}")))?;

    match parsed.code.as_deref() {
        Some(SUCCESS_CODE) => {}
        other => {
            tracing::debug!(code = ?other, "city lookup returned non-success code");
            return Ok(None);
        }
    }

    let Some(first) = parsed.location.and_then(|list| list.into_iter().next()) else {
        tracing::debug!("city lookup returned an empty location list");
        return Ok(None);
    };

    match first.id {
        Some(id) if !id.is_empty() => Ok(Some(GeoLocation { id, name: first.name })),
        _ => {
            tracing::debug!("first city lookup entry has no id");
            Ok(None)
        }
    }
}

/// Validate a `/v7/weather/now` body: code == "200", then `now.temp` and `now.icon`.
pub(crate) fn parse_now(body: &str) -> Result<WeatherReading, WeatherError> {
    let parsed: QwNowResponse = serde_json::from_str(body)
        .map_err(|e| WeatherError::Malformed(format!("weather JSON: {e}")))?;

    let code = parsed.code.ok_or_else(|| WeatherError::Malformed("missing `code`".into()))?;
    if code != SUCCESS_CODE {
        return Err(WeatherError::BusinessCode(code));
    }

    let now = parsed.now.ok_or_else(|| WeatherError::Malformed("missing `now`".into()))?;
    let temperature_c =
        now.temp.ok_or_else(|| WeatherError::Malformed("missing `now.temp`".into()))?;
    let condition_code =
        now.icon.ok_or_else(|| WeatherError::Malformed("missing `now.icon`".into()))?;

    Ok(WeatherReading { temperature_c, condition_code })
}

fn mask_key(key: &str) -> String {
    let head: String = key.chars().take(4).collect();
    format!("{head}***")
}

#[async_trait]
impl WeatherProvider for QWeatherProvider {
    async fn lookup_city(&self, city: &str) -> Result<Option<GeoLocation>, WeatherError> {
        let body = self.get("/geo/v2/city/lookup", city).await?;
        parse_lookup(&body)
    }

    async fn current_conditions(&self, location_id: &str) -> Result<WeatherReading, WeatherError> {
        let body = self.get("/v7/weather/now", location_id).await?;
        let reading = parse_now(&body)?;
        tracing::info!(
            location_id,
            temp = %reading.temperature_c,
            icon = %reading.condition_code,
            "current conditions received"
        );
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_takes_first_entry() {
        let body = r#"{"code":"200","location":[{"id":"101020100","name":"上海"},{"id":"2"}]}"#;
        let hit = parse_lookup(body).unwrap().unwrap();
        assert_eq!(hit.id, "101020100");
        assert_eq!(hit.name.as_deref(), Some("上海"));
    }

    #[test]
    fn lookup_misses_are_none() {
        assert_eq!(parse_lookup(r#"{"code":"404"}"#).unwrap(), None);
        assert_eq!(parse_lookup(r#"{"code":"200","location":[]}"#).unwrap(), None);
        assert_eq!(parse_lookup(r#"{"code":"200"}"#).unwrap(), None);
        assert_eq!(parse_lookup(r#"{"code":"200","location":[{"name":"x"}]}"#).unwrap(), None);
    }

    #[test]
    fn lookup_rejects_non_json() {
        assert!(matches!(parse_lookup("<html>"), Err(WeatherError::Malformed(_))));
    }

    #[test]
    fn now_success() {
        let reading = parse_now(r#"{"code":"200","now":{"temp":"23","icon":"100"}}"#).unwrap();
        assert_eq!(reading.temperature_c, "23");
        assert_eq!(reading.condition_code, "100");
    }

    #[test]
    fn now_distinguishes_business_code_from_shape() {
        assert!(matches!(
            parse_now(r#"{"code":"402"}"#),
            Err(WeatherError::BusinessCode(c)) if c == "402"
        ));
        assert!(matches!(parse_now(r#"{"now":{}}"#), Err(WeatherError::Malformed(_))));
        assert!(matches!(parse_now(r#"{"code":"200"}"#), Err(WeatherError::Malformed(_))));
        assert!(matches!(
            parse_now(r#"{"code":"200","now":{"temp":"23"}}"#),
            Err(WeatherError::Malformed(m)) if m.contains("icon")
        ));
        assert!(matches!(
            parse_now(r#"{"code":"200","now":{"icon":"100"}}"#),
            Err(WeatherError::Malformed(m)) if m.contains("temp")
        ));
    }

    #[test]
    fn now_rejects_numeric_temperature() {
        assert!(matches!(
            parse_now(r#"{"code":"200","now":{"temp":23,"icon":"100"}}"#),
            Err(WeatherError::Malformed(_))
        ));
    }

    #[test]
    fn key_is_masked() {
        assert_eq!(mask_key("abcdef123456"), "abcd***");
        assert_eq!(mask_key(""), "***");
    }
}
