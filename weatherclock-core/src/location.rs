//! Location resolution: custom city, then IP geolocation, then a fixed default.

use crate::{
    error::WeatherError,
    model::{LocationSource, ResolvedLocation},
    provider::{IpLocator, WeatherProvider},
};

/// Identifier used when every other resolution path fails (Beijing).
pub const DEFAULT_LOCATION_ID: &str = "101010100";
pub const DEFAULT_LOCATION_LABEL: &str = "Beijing";

/// Resolve the location to query. Each stage runs at most once.
///
/// A non-empty `custom_city` is an explicit override: if it cannot be geocoded the
/// run fails with [`WeatherError::CityNotFound`] and IP geolocation is not tried.
/// Otherwise every failure on the IP path falls back to [`DEFAULT_LOCATION_ID`].
pub async fn resolve(
    custom_city: &str,
    provider: &dyn WeatherProvider,
    locator: &dyn IpLocator,
) -> Result<ResolvedLocation, WeatherError> {
    let custom_city = custom_city.trim();

    if !custom_city.is_empty() {
        tracing::info!(city = custom_city, "resolving custom city");
        return match geocode(provider, custom_city, LocationSource::Custom).await {
            Ok(resolved) => Ok(resolved),
            Err(err) => {
                tracing::warn!(city = custom_city, "custom city lookup failed: {err}");
                Err(WeatherError::CityNotFound(custom_city.to_string()))
            }
        };
    }

    match resolve_by_ip(provider, locator).await {
        Ok(resolved) => Ok(resolved),
        Err(err) => {
            tracing::warn!("{err}; using default location {DEFAULT_LOCATION_ID}");
            Ok(ResolvedLocation {
                id: DEFAULT_LOCATION_ID.to_string(),
                label: DEFAULT_LOCATION_LABEL.to_string(),
                source: LocationSource::Default,
            })
        }
    }
}

async fn resolve_by_ip(
    provider: &dyn WeatherProvider,
    locator: &dyn IpLocator,
) -> Result<ResolvedLocation, WeatherError> {
    tracing::info!("resolving location by IP");
    let city = locator.locate_city().await.map_err(|e| match e {
        geo @ WeatherError::GeoFailure(_) => geo,
        other => WeatherError::GeoFailure(other.to_string()),
    })?;
    tracing::info!(%city, "IP geolocation returned city");

    geocode(provider, &city, LocationSource::IpLookup)
        .await
        .map_err(|e| WeatherError::GeoFailure(format!("geocoding '{city}': {e}")))
}

/// One city lookup. A business-level miss becomes `CityNotFound`.
/// The label is the queried city name, not the provider's canonical name.
async fn geocode(
    provider: &dyn WeatherProvider,
    city: &str,
    source: LocationSource,
) -> Result<ResolvedLocation, WeatherError> {
    let hit = provider
        .lookup_city(city)
        .await?
        .ok_or_else(|| WeatherError::CityNotFound(city.to_string()))?;

    tracing::info!(id = %hit.id, provider_name = ?hit.name, city, "city resolved");

    Ok(ResolvedLocation { id: hit.id, label: city.to_string(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GeoLocation, WeatherReading};
    use async_trait::async_trait;
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
    };

    #[derive(Debug, Default)]
    struct FakeProvider {
        cities: HashMap<String, GeoLocation>,
        fail_transport: bool,
        lookups: AtomicUsize,
    }

    impl FakeProvider {
        fn with_city(city: &str, id: &str, name: Option<&str>) -> Self {
            let mut cities = HashMap::new();
            cities.insert(
                city.to_string(),
                GeoLocation { id: id.to_string(), name: name.map(str::to_string) },
            );
            Self { cities, ..Self::default() }
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn lookup_city(&self, city: &str) -> Result<Option<GeoLocation>, WeatherError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail_transport {
                return Err(WeatherError::Http { status: 500, body: String::new() });
            }
            Ok(self.cities.get(city).cloned())
        }

        async fn current_conditions(
            &self,
            _location_id: &str,
        ) -> Result<WeatherReading, WeatherError> {
            unreachable!("resolver never fetches conditions")
        }
    }

    #[derive(Debug)]
    struct FakeLocator {
        city: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl FakeLocator {
        fn returning(city: Option<&'static str>) -> Self {
            Self { city, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl IpLocator for FakeLocator {
        async fn locate_city(&self) -> Result<String, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.city
                .map(str::to_string)
                .ok_or_else(|| WeatherError::GeoFailure("unreachable".into()))
        }
    }

    #[tokio::test]
    async fn custom_city_wins() {
        let provider = FakeProvider::with_city("Shanghai", "101020100", Some("上海"));
        let locator = FakeLocator::returning(Some("Hangzhou"));

        let resolved = resolve("Shanghai", &provider, &locator).await.unwrap();
        assert_eq!(resolved.id, "101020100");
        assert_eq!(resolved.label, "Shanghai");
        assert_eq!(resolved.source, LocationSource::Custom);
        assert_eq!(locator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_custom_city_does_not_fall_back() {
        let provider = FakeProvider::default();
        let locator = FakeLocator::returning(Some("Hangzhou"));

        let err = resolve("Nowhere", &provider, &locator).await.unwrap_err();
        assert!(matches!(err, WeatherError::CityNotFound(c) if c == "Nowhere"));
        assert_eq!(locator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(provider.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn custom_city_transport_failure_is_city_not_found() {
        let provider = FakeProvider { fail_transport: true, ..FakeProvider::default() };
        let locator = FakeLocator::returning(None);

        let err = resolve("Shanghai", &provider, &locator).await.unwrap_err();
        assert!(matches!(err, WeatherError::CityNotFound(_)));
    }

    #[tokio::test]
    async fn label_echoes_queried_city_not_provider_name() {
        let provider = FakeProvider::with_city("Hangzhou", "101210101", Some("杭州"));
        let locator = FakeLocator::returning(Some("Hangzhou"));

        let resolved = resolve("", &provider, &locator).await.unwrap();
        assert_eq!(resolved.label, "Hangzhou");

        let resolved = resolve("Hangzhou", &provider, &locator).await.unwrap();
        assert_eq!(resolved.label, "Hangzhou");
    }

    #[tokio::test]
    async fn ip_city_is_geocoded() {
        let provider = FakeProvider::with_city("Hangzhou", "101210101", None);
        let locator = FakeLocator::returning(Some("Hangzhou"));

        let resolved = resolve("", &provider, &locator).await.unwrap();
        assert_eq!(resolved.id, "101210101");
        assert_eq!(resolved.label, "Hangzhou");
        assert_eq!(resolved.source, LocationSource::IpLookup);
    }

    #[tokio::test]
    async fn failing_ip_lookup_uses_default() {
        let provider = FakeProvider::default();
        let locator = FakeLocator::returning(None);

        let resolved = resolve("", &provider, &locator).await.unwrap();
        assert_eq!(resolved.id, DEFAULT_LOCATION_ID);
        assert_eq!(resolved.source, LocationSource::Default);
        assert_eq!(provider.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ungeocodable_ip_city_uses_default() {
        let provider = FakeProvider::default();
        let locator = FakeLocator::returning(Some("Atlantis"));

        let resolved = resolve("   ", &provider, &locator).await.unwrap();
        assert_eq!(resolved.id, DEFAULT_LOCATION_ID);
        assert_eq!(resolved.label, DEFAULT_LOCATION_LABEL);
        assert_eq!(locator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.lookups.load(Ordering::SeqCst), 1);
    }
}
