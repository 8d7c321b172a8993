use std::time::Duration;

use foundation::{COUNTRY_CENTROID, LngLat};
use tracing::warn;

pub const WINDY_EMBED_BASE: &str = "https://embed.windy.com/embed.html";
pub const WEATHER_ZOOM: u32 = 10;

pub const NOTICE_UNSUPPORTED: &str = "Geolocation is not supported by your browser";
pub const NOTICE_UNRESOLVED: &str = "Could not get your location";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GeolocationOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Accept a cached position up to this old.
    pub maximum_age: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(5 * 60),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GeolocationOutcome {
    Located(LngLat),
    Unsupported,
    Denied,
    Unavailable,
    TimedOut,
}

/// Platform position lookup (browser geolocation in the web client).
///
/// Implementations enforce `options.timeout` themselves and report
/// [`GeolocationOutcome::TimedOut`] when it elapses.
#[allow(async_fn_in_trait)]
pub trait GeolocationProvider {
    async fn locate(&self, options: &GeolocationOptions) -> GeolocationOutcome;
}

/// Coordinates the weather view is centered on, resolved exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherLocation {
    pub coords: LngLat,
    /// Transient message shown when the fallback coordinate is in use.
    pub notice: Option<String>,
}

impl WeatherLocation {
    pub fn from_outcome(outcome: GeolocationOutcome) -> Self {
        match outcome {
            GeolocationOutcome::Located(coords) => Self {
                coords,
                notice: None,
            },
            GeolocationOutcome::Unsupported => Self::fallback(NOTICE_UNSUPPORTED),
            GeolocationOutcome::Denied
            | GeolocationOutcome::Unavailable
            | GeolocationOutcome::TimedOut => Self::fallback(NOTICE_UNRESOLVED),
        }
    }

    fn fallback(reason: &str) -> Self {
        Self {
            coords: COUNTRY_CENTROID,
            notice: Some(format!("{reason} - showing general map")),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.notice.is_some()
    }

    pub fn embed_url(&self) -> String {
        format!(
            "{WINDY_EMBED_BASE}?type=map&location=coordinates&metricWind=km%2Fh&metricTemp=%C2%B0C\
             &radarRange=-1&lat={}&lon={}&zoom={WEATHER_ZOOM}&overlay=wind",
            self.coords.lat, self.coords.lng
        )
    }
}

pub async fn resolve_location<P: GeolocationProvider>(
    provider: &P,
    options: &GeolocationOptions,
) -> WeatherLocation {
    let outcome = provider.locate(options).await;
    if !matches!(outcome, GeolocationOutcome::Located(_)) {
        warn!("geolocation unavailable ({outcome:?}); using fallback coordinate");
    }
    WeatherLocation::from_outcome(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Fixed(GeolocationOutcome);

    impl GeolocationProvider for Fixed {
        async fn locate(&self, _options: &GeolocationOptions) -> GeolocationOutcome {
            self.0
        }
    }

    #[tokio::test]
    async fn timeout_falls_back_to_centroid_with_notice() {
        let loc = resolve_location(&Fixed(GeolocationOutcome::TimedOut), &Default::default()).await;
        assert_eq!(loc.coords, LngLat::new(-47.9292, -15.7801));
        assert_eq!(
            loc.notice.as_deref(),
            Some("Could not get your location - showing general map")
        );
    }

    #[tokio::test]
    async fn located_position_has_no_notice() {
        let here = LngLat::new(-43.2, -22.9);
        let loc = resolve_location(&Fixed(GeolocationOutcome::Located(here)), &Default::default()).await;
        assert_eq!(loc.coords, here);
        assert!(!loc.is_fallback());
    }

    #[test]
    fn unsupported_uses_its_own_notice() {
        let loc = WeatherLocation::from_outcome(GeolocationOutcome::Unsupported);
        assert_eq!(loc.coords, COUNTRY_CENTROID);
        assert!(loc.notice.unwrap().starts_with(NOTICE_UNSUPPORTED));
    }

    #[test]
    fn default_options_match_lookup_policy() {
        let o = GeolocationOptions::default();
        assert!(o.high_accuracy);
        assert_eq!(o.timeout, Duration::from_secs(10));
        assert_eq!(o.maximum_age, Duration::from_secs(300));
    }

    #[test]
    fn embed_url_carries_lat_then_lon() {
        let loc = WeatherLocation {
            coords: LngLat::new(-47.9292, -15.7801),
            notice: None,
        };
        assert_eq!(
            loc.embed_url(),
            "https://embed.windy.com/embed.html?type=map&location=coordinates&metricWind=km%2Fh\
             &metricTemp=%C2%B0C&radarRange=-1&lat=-15.7801&lon=-47.9292&zoom=10&overlay=wind"
        );
    }
}
