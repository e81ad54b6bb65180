use thiserror::Error;

/// Maximum number of characters of an error message shown in the location field.
const STATUS_DETAIL_CHARS: usize = 20;

/// Failure outcomes of a weather update run.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("no API key configured")]
    NoApiKey,

    /// The explicitly configured city could not be geocoded.
    #[error("city '{0}' not found")]
    CityNotFound(String),

    /// IP geolocation (or the geocode of its city) failed. Recovered by the
    /// resolver via the default location and never surfaced to the user.
    #[error("geolocation failed: {0}")]
    GeoFailure(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The provider answered 2xx but with a non-"200" business code.
    #[error("provider returned code {0}")]
    BusinessCode(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

impl WeatherError {
    /// Short text shown in place of the location label after a failed run.
    pub fn status_text(&self) -> String {
        match self {
            WeatherError::NoApiKey => "Set API key".to_string(),
            WeatherError::CityNotFound(_) => "City not found".to_string(),
            WeatherError::BusinessCode(code) => format!("API error: {code}"),
            WeatherError::Malformed(_) => "Bad data format".to_string(),
            WeatherError::Http { .. } | WeatherError::Transport(_) | WeatherError::GeoFailure(_) => {
                let msg = self.to_string();
                format!("offline: {}", truncate_chars(&msg, STATUS_DETAIL_CHARS))
            }
        }
    }
}

/// Char-boundary safe prefix; provider bodies are frequently non-ASCII.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    let head = truncate_chars(body, MAX);
    if head.len() < body.len() { format!("{head}...") } else { body.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text_per_category() {
        assert_eq!(WeatherError::NoApiKey.status_text(), "Set API key");
        assert_eq!(WeatherError::CityNotFound("Nowhere".into()).status_text(), "City not found");
        assert_eq!(WeatherError::BusinessCode("401".into()).status_text(), "API error: 401");
        assert_eq!(WeatherError::Malformed("missing icon".into()).status_text(), "Bad data format");
    }

    #[test]
    fn offline_status_is_truncated() {
        let err = WeatherError::Http { status: 503, body: "service unavailable, try later".into() };
        let text = err.status_text();
        assert_eq!(text, "offline: HTTP 503: service un");
        assert_eq!(text.chars().count(), "offline: ".len() + STATUS_DETAIL_CHARS);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("北京市朝阳区", 2), "北京");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_body("short"), "short");
        assert!(truncate_body(&"x".repeat(300)).ends_with("..."));
    }
}
