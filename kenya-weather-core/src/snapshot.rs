//! Offline copy of the last OpenWeather payloads for a location.
//!
//! A snapshot file looks like:
//!
//! ```json
//! {
//!   "city": "Nairobi",
//!   "timestamp": 1714554000000,
//!   "weather": { ...OpenWeather /data/2.5/weather response... },
//!   "forecast": { ...OpenWeather /data/2.5/forecast response... }
//! }
//! ```

use std::{fs, path::Path};

use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;

use crate::{
    forecast::{MAX_DAILY, daily_from, interpolate_hourly},
    model::{ConditionCode, Forecast, LocalWeather, MAX_SERIES_LEN, WeatherSample},
};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse snapshot JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    pop: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    #[serde(default)]
    city: Option<OwCity>,
    list: Vec<OwForecastEntry>,
}

/// Parsed snapshot file.
#[derive(Debug, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    city: Option<String>,
    /// Capture time in epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    timestamp: DateTime<Utc>,
    weather: OwCurrentResponse,
    forecast: OwForecastResponse,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let contents = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Location label: explicit city, then the forecast's city, then the
    /// current observation's station name.
    pub fn location_name(&self) -> String {
        if let Some(city) = self.city.as_deref().filter(|c| !c.is_empty()) {
            return city.to_string();
        }
        if let Some(city) = &self.forecast.city {
            return match &city.country {
                Some(country) => format!("{}, {}", city.name, country),
                None => city.name.clone(),
            };
        }
        if self.weather.name.is_empty() {
            "Unknown Location".to_string()
        } else {
            self.weather.name.clone()
        }
    }

    /// Build the current sample and the hourly/daily series. Day boundaries
    /// are taken in `offset`.
    pub fn to_local_weather(&self, offset: &FixedOffset) -> LocalWeather {
        let current = sample_from(
            self.weather.dt,
            &self.weather.main,
            &self.weather.weather,
            &self.weather.wind,
            None,
        );

        let raw: Vec<WeatherSample> = self
            .forecast
            .list
            .iter()
            .map(|e| sample_from(e.dt, &e.main, &e.weather, &e.wind, e.pop))
            .collect();

        let forecast = Forecast::new(
            interpolate_hourly(&raw, MAX_SERIES_LEN),
            daily_from(&raw, offset, MAX_DAILY),
        );

        tracing::debug!(
            location = %self.location_name(),
            hourly = forecast.hourly.len(),
            daily = forecast.daily.len(),
            "snapshot assembled"
        );

        LocalWeather {
            location_name: self.location_name(),
            current,
            forecast,
            captured_at: self.timestamp,
        }
    }
}

fn sample_from(
    dt: i64,
    main: &OwMain,
    weather: &[OwWeather],
    wind: &OwWind,
    pop: Option<f64>,
) -> WeatherSample {
    let (condition, description) = weather
        .first()
        .map(|w| (ConditionCode::from_openweather_main(&w.main), w.description.clone()))
        .unwrap_or((ConditionCode::Clear, String::new()));

    WeatherSample {
        timestamp: dt,
        temperature_c: main.temp,
        feels_like_c: main.feels_like,
        humidity_pct: main.humidity.min(100),
        wind_speed_ms: wind.speed,
        precipitation_probability: pop.map(|p| p.clamp(0.0, 1.0)),
        condition,
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{at, eat};
    use std::io::Write;

    fn entry(dt: i64, temp: f64, main: &str, pop: f64) -> serde_json::Value {
        serde_json::json!({
            "dt": dt,
            "main": {"temp": temp, "feels_like": temp, "humidity": 70},
            "weather": [{"main": main, "description": main.to_lowercase()}],
            "wind": {"speed": 4.0},
            "pop": pop
        })
    }

    fn snapshot_json() -> String {
        let base = at(2024, 5, 1, 12, 0).timestamp();
        let list: Vec<_> = (0..17)
            .map(|i| {
                let main = if i == 1 { "Rain" } else { "Clouds" };
                entry(base + i * 3 * 3600, 20.0 + i as f64, main, if i == 1 { 0.6 } else { 0.1 })
            })
            .collect();

        serde_json::json!({
            "city": "Nairobi",
            "timestamp": 1_714_554_000_000_i64,
            "weather": {
                "name": "Nairobi",
                "dt": base,
                "main": {"temp": 21.4, "feels_like": 21.0, "humidity": 64},
                "weather": [{"main": "Clouds", "description": "broken clouds"}],
                "wind": {"speed": 3.6}
            },
            "forecast": {
                "city": {"name": "Nairobi", "country": "KE"},
                "list": list
            }
        })
        .to_string()
    }

    #[test]
    fn parses_and_assembles() {
        let snapshot = Snapshot::from_json(&snapshot_json()).unwrap();
        let local = snapshot.to_local_weather(&eat());

        assert_eq!(local.location_name, "Nairobi");
        assert_eq!(local.current.description, "broken clouds");
        assert_eq!(local.current.condition, ConditionCode::Clouds);
        assert_eq!(local.current.precipitation_probability, None);

        assert_eq!(local.forecast.hourly.len(), MAX_SERIES_LEN);
        let at_three = local.forecast.hourly.select(&at(2024, 5, 1, 15, 0)).unwrap();
        assert_eq!(at_three.condition, ConditionCode::Rain);
        assert_eq!(at_three.precipitation_probability, Some(0.6));

        // 12:00 on day one through 12:00 on day three.
        assert_eq!(local.forecast.daily.len(), 3);
        assert_eq!(local.captured_at.timestamp_millis(), 1_714_554_000_000);
    }

    #[test]
    fn location_falls_back_to_forecast_city() {
        let json = snapshot_json().replace("\"city\":\"Nairobi\",", "");
        let snapshot = Snapshot::from_json(&json).unwrap();
        assert_eq!(snapshot.location_name(), "Nairobi, KE");
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(snapshot_json().as_bytes()).unwrap();

        let snapshot = Snapshot::load(file.path()).unwrap();
        assert_eq!(snapshot.location_name(), "Nairobi");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Snapshot::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
        assert!(err.to_string().contains("Failed to read snapshot file"));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = Snapshot::from_json("{\"city\": 1}").unwrap_err();
        assert!(matches!(err, SnapshotError::Parse(_)));
    }
}
