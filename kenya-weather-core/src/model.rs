use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::intent::Intent;

/// Upper bound on the number of samples a [`ForecastSeries`] holds.
pub const MAX_SERIES_LEN: usize = 48;

/// Probability above which a sample counts as rainy even without a rain condition.
pub const RAIN_PROBABILITY_THRESHOLD: f64 = 0.3;

/// Categorical weather condition, as reported in OpenWeather's `weather[0].main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionCode {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Mist,
    Fog,
}

impl ConditionCode {
    /// Map an OpenWeather `main` group. Atmosphere groups without a variant of
    /// their own (Haze, Smoke, Dust, ...) collapse into `Mist`.
    pub fn from_openweather_main(main: &str) -> Self {
        match main.to_lowercase().as_str() {
            "clear" => Self::Clear,
            "clouds" => Self::Clouds,
            "rain" => Self::Rain,
            "drizzle" => Self::Drizzle,
            "thunderstorm" => Self::Thunderstorm,
            "snow" => Self::Snow,
            "fog" => Self::Fog,
            _ => Self::Mist,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Clouds => "clouds",
            Self::Rain => "rain",
            Self::Drizzle => "drizzle",
            Self::Thunderstorm => "thunderstorm",
            Self::Snow => "snow",
            Self::Mist => "mist",
            Self::Fog => "fog",
        }
    }
}

impl std::fmt::Display for ConditionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed or forecast point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    /// Epoch seconds.
    pub timestamp: i64,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_ms: f64,
    /// Chance of precipitation in `0.0..=1.0`, when the source reports one.
    pub precipitation_probability: Option<f64>,
    pub condition: ConditionCode,
    pub description: String,
}

impl WeatherSample {
    /// The sample's instant expressed in `offset`.
    pub fn time_in(&self, offset: &FixedOffset) -> Option<DateTime<FixedOffset>> {
        DateTime::<Utc>::from_timestamp(self.timestamp, 0).map(|dt| dt.with_timezone(offset))
    }

    pub fn wind_speed_kmh(&self) -> f64 {
        self.wind_speed_ms * 3.6
    }

    /// Rain is expected when the condition says so or the chance exceeds 30%.
    pub fn rain_expected(&self) -> bool {
        self.condition == ConditionCode::Rain
            || self
                .precipitation_probability
                .is_some_and(|p| p > RAIN_PROBABILITY_THRESHOLD)
    }

    /// Rounded precipitation chance in whole percent.
    pub fn precipitation_percent(&self) -> Option<u8> {
        self.precipitation_probability
            .map(|p| (p.clamp(0.0, 1.0) * 100.0).round() as u8)
    }

    /// Free-text description, or the condition name when the source left it blank.
    pub fn summary(&self) -> &str {
        if self.description.trim().is_empty() {
            self.condition.as_str()
        } else {
            &self.description
        }
    }
}

/// Time-ordered samples: ascending, unique timestamps, at most [`MAX_SERIES_LEN`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<WeatherSample>", into = "Vec<WeatherSample>")]
pub struct ForecastSeries {
    samples: Vec<WeatherSample>,
}

impl ForecastSeries {
    /// Sorts, drops repeated timestamps (first one wins) and truncates to the cap.
    pub fn new(mut samples: Vec<WeatherSample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        samples.dedup_by_key(|s| s.timestamp);
        samples.truncate(MAX_SERIES_LEN);
        Self { samples }
    }

    pub fn samples(&self) -> &[WeatherSample] {
        &self.samples
    }

    pub fn get(&self, index: usize) -> Option<&WeatherSample> {
        self.samples.get(index)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WeatherSample> {
        self.samples.iter()
    }

    /// Sample for `target`: the first entry on the same calendar date and hour,
    /// otherwise the first entry at minimum absolute distance.
    pub fn select(&self, target: &DateTime<FixedOffset>) -> Option<&WeatherSample> {
        let offset = target.offset();
        let date = target.date_naive();
        let hour = target.hour();

        self.samples
            .iter()
            .find(|s| {
                s.time_in(offset)
                    .is_some_and(|t| t.date_naive() == date && t.hour() == hour)
            })
            .or_else(|| {
                // `min_by_key` keeps the first of several equal minima.
                let target_ts = target.timestamp();
                self.samples
                    .iter()
                    .min_by_key(|s| (s.timestamp - target_ts).abs())
            })
    }

    /// First sample whose local calendar date is `date`.
    pub fn on_date(&self, date: NaiveDate, offset: &FixedOffset) -> Option<&WeatherSample> {
        self.samples
            .iter()
            .find(|s| s.time_in(offset).is_some_and(|t| t.date_naive() == date))
    }
}

impl From<Vec<WeatherSample>> for ForecastSeries {
    fn from(samples: Vec<WeatherSample>) -> Self {
        Self::new(samples)
    }
}

impl From<ForecastSeries> for Vec<WeatherSample> {
    fn from(series: ForecastSeries) -> Self {
        series.samples
    }
}

impl<'a> IntoIterator for &'a ForecastSeries {
    type Item = &'a WeatherSample;
    type IntoIter = std::slice::Iter<'a, WeatherSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Hourly and daily outlook for one location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub hourly: ForecastSeries,
    /// One sample per calendar day; index 0 is today, index 1 tomorrow.
    pub daily: ForecastSeries,
}

impl Forecast {
    pub fn new(hourly: ForecastSeries, daily: ForecastSeries) -> Self {
        Self { hourly, daily }
    }

    /// Hourly pick for `target`, or the daily entry on the same date when the
    /// hourly series is empty.
    pub fn sample_at(&self, target: &DateTime<FixedOffset>) -> Option<&WeatherSample> {
        self.hourly
            .select(target)
            .or_else(|| self.daily.on_date(target.date_naive(), target.offset()))
    }

    /// Next day's daily sample.
    pub fn tomorrow(&self) -> Option<&WeatherSample> {
        self.daily.get(1)
    }
}

/// Everything known about one location at capture time.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalWeather {
    pub location_name: String,
    pub current: WeatherSample,
    pub forecast: Forecast,
    pub captured_at: DateTime<Utc>,
}

/// Outcome of interpreting one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedQuery {
    pub intent: Intent,
    pub target_time: Option<DateTime<FixedOffset>>,
}


#[cfg(test)]
mod tests {
    use super::fixtures::{at, eat, sample};
    use super::*;

    #[test]
    fn condition_from_openweather_main() {
        assert_eq!(ConditionCode::from_openweather_main("Rain"), ConditionCode::Rain);
        assert_eq!(ConditionCode::from_openweather_main("clouds"), ConditionCode::Clouds);
        assert_eq!(ConditionCode::from_openweather_main("Haze"), ConditionCode::Mist);
    }

    #[test]
    fn rain_expected_by_condition_or_probability() {
        let mut s = sample(at(2024, 5, 1, 12, 0));
        assert!(!s.rain_expected());

        s.precipitation_probability = Some(0.31);
        assert!(s.rain_expected());

        s.precipitation_probability = Some(0.3);
        assert!(!s.rain_expected());

        s.precipitation_probability = None;
        s.condition = ConditionCode::Rain;
        assert!(s.rain_expected());
    }

    #[test]
    fn series_is_sorted_deduplicated_and_capped() {
        let base = at(2024, 5, 1, 0, 0);
        let mut samples: Vec<_> = (0..60)
            .rev()
            .map(|h| sample(base + chrono::Duration::hours(h)))
            .collect();
        let mut dup = sample(base);
        dup.temperature_c = 99.0;
        samples.push(dup);

        let series = ForecastSeries::new(samples);

        assert_eq!(series.len(), MAX_SERIES_LEN);
        assert_eq!(series.get(0).unwrap().timestamp, base.timestamp());
        assert!(series.samples().windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn select_prefers_same_hour() {
        let series = ForecastSeries::new(vec![
            sample(at(2024, 5, 1, 14, 50)),
            sample(at(2024, 5, 1, 15, 40)),
        ]);

        // 14:50 is closer to 15:10, but 15:40 shares the hour.
        let picked = series.select(&at(2024, 5, 1, 15, 10)).unwrap();
        assert_eq!(picked.timestamp, at(2024, 5, 1, 15, 40).timestamp());
    }

    #[test]
    fn select_nearest_keeps_first_minimum() {
        let series = ForecastSeries::new(vec![
            sample(at(2024, 5, 1, 12, 0)),
            sample(at(2024, 5, 1, 18, 0)),
        ]);

        let picked = series.select(&at(2024, 5, 1, 15, 0)).unwrap();
        assert_eq!(picked.timestamp, at(2024, 5, 1, 12, 0).timestamp());
    }

    #[test]
    fn select_on_empty_series_is_none() {
        assert!(ForecastSeries::default().select(&at(2024, 5, 1, 15, 0)).is_none());
    }

    #[test]
    fn sample_at_falls_back_to_daily_on_same_date() {
        let forecast = Forecast::new(
            ForecastSeries::default(),
            ForecastSeries::new(vec![
                sample(at(2024, 5, 1, 12, 0)),
                sample(at(2024, 5, 2, 12, 0)),
            ]),
        );

        let picked = forecast.sample_at(&at(2024, 5, 2, 9, 0)).unwrap();
        assert_eq!(picked.timestamp, at(2024, 5, 2, 12, 0).timestamp());
        assert!(forecast.sample_at(&at(2024, 5, 3, 9, 0)).is_none());
    }

    #[test]
    fn series_deserializes_through_normalisation() {
        let later = sample(at(2024, 5, 1, 15, 0));
        let earlier = sample(at(2024, 5, 1, 12, 0));
        let json = serde_json::to_string(&vec![later, earlier.clone()]).unwrap();

        let series: ForecastSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(series.get(0), Some(&earlier));
        assert_eq!(series.get(0).unwrap().time_in(&eat()).unwrap().hour(), 12);
    }
}
