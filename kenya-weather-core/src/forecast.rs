//! Assembly of hourly and daily series from coarse forecast samples.

use chrono::FixedOffset;

use crate::model::{ForecastSeries, WeatherSample};

const HOUR_SECS: i64 = 3600;

/// Maximum number of days in a daily series.
pub const MAX_DAILY: usize = 5;

/// Fill the gaps between (typically 3-hourly) samples with hourly points.
///
/// Numeric fields are interpolated linearly; condition and description are
/// carried over from the earlier sample. Gaps of an hour or less are kept
/// as-is. The output stops at `max_len` samples.
pub fn interpolate_hourly(samples: &[WeatherSample], max_len: usize) -> ForecastSeries {
    let sorted = sorted_unique(samples);
    let mut out: Vec<WeatherSample> = Vec::with_capacity(max_len);

    for pair in sorted.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let gap = b.timestamp - a.timestamp;
        let steps = (gap / HOUR_SECS).max(1);

        for k in 0..steps {
            if out.len() >= max_len {
                return ForecastSeries::new(out);
            }
            let offset = k * HOUR_SECS;
            if offset >= gap {
                break;
            }
            out.push(lerp(a, b, offset as f64 / gap as f64, a.timestamp + offset));
        }
    }

    if out.len() < max_len {
        out.extend(sorted.last().cloned());
    }

    ForecastSeries::new(out)
}

/// Ascending copy without repeated timestamps; unlike [`ForecastSeries::new`]
/// the input is not truncated.
fn sorted_unique(samples: &[WeatherSample]) -> Vec<WeatherSample> {
    let mut sorted = samples.to_vec();
    sorted.sort_by_key(|s| s.timestamp);
    sorted.dedup_by_key(|s| s.timestamp);
    sorted
}

fn lerp(a: &WeatherSample, b: &WeatherSample, t: f64, timestamp: i64) -> WeatherSample {
    let mix = |x: f64, y: f64| x + (y - x) * t;

    let precipitation_probability = match (a.precipitation_probability, b.precipitation_probability) {
        (Some(x), Some(y)) => Some(mix(x, y)),
        (x, _) => x,
    };

    WeatherSample {
        timestamp,
        temperature_c: mix(a.temperature_c, b.temperature_c),
        feels_like_c: mix(a.feels_like_c, b.feels_like_c),
        humidity_pct: mix(f64::from(a.humidity_pct), f64::from(b.humidity_pct))
            .round()
            .clamp(0.0, 100.0) as u8,
        wind_speed_ms: mix(a.wind_speed_ms, b.wind_speed_ms),
        precipitation_probability,
        condition: a.condition,
        description: a.description.clone(),
    }
}

/// First sample of each local calendar day, at most `max_days` of them.
pub fn daily_from(samples: &[WeatherSample], offset: &FixedOffset, max_days: usize) -> ForecastSeries {
    let sorted = sorted_unique(samples);
    let mut days = Vec::new();
    let mut out = Vec::new();

    for sample in sorted.iter() {
        let Some(date) = sample.time_in(offset).map(|t| t.date_naive()) else {
            continue;
        };
        if days.contains(&date) {
            continue;
        }
        days.push(date);
        out.push(sample.clone());
        if out.len() >= max_days {
            break;
        }
    }

    ForecastSeries::new(out)
}
