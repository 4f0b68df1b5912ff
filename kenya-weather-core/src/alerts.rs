//! Weather warnings and pre-event reminders derived from a forecast series.
//!
//! Nothing here delivers anything; callers decide whether to print,
//! persist or push the planned reminders.

use chrono::{DateTime, Duration, FixedOffset};
use serde::Serialize;

use crate::{
    language::Language,
    model::{ConditionCode, ForecastSeries, WeatherSample},
    recommend::HOT_ABOVE_C,
};

const EXTREME_HEAT_ABOVE_C: f64 = 35.0;
const COLD_ALERT_BELOW_C: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Rain,
    Heat,
    Cold,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Rain => "rain",
            AlertKind::Heat => "heat",
            AlertKind::Cold => "cold",
        }
    }

    /// How long before the event a reminder goes out. Cold spells get none.
    pub fn lead_time(&self) -> Option<Duration> {
        match self {
            AlertKind::Rain => Some(Duration::hours(2)),
            AlertKind::Heat => Some(Duration::hours(1)),
            AlertKind::Cold => None,
        }
    }

    fn recommendation_keys(&self) -> &'static [&'static str] {
        match self {
            AlertKind::Rain => &["umbrella", "raincoat"],
            AlertKind::Heat => &["water", "light-clothing", "sunscreen"],
            AlertKind::Cold => &[],
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherAlert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub time: DateTime<FixedOffset>,
    pub message: String,
}

/// A reminder to fire at `notify_at` about an event at `event_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledAlert {
    pub kind: AlertKind,
    /// Stable identifier, e.g. `rain-1714568400000`; re-planning the same
    /// forecast yields the same tags.
    pub tag: String,
    pub title: String,
    pub body: String,
    pub event_at: DateTime<FixedOffset>,
    pub notify_at: DateTime<FixedOffset>,
    pub recommendations: Vec<String>,
}

fn rounded(celsius: f64) -> i64 {
    celsius.round() as i64
}

fn local_time(sample: &WeatherSample, offset: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    let time = sample.time_in(offset);
    if time.is_none() {
        tracing::warn!(timestamp = sample.timestamp, "skipping sample with out-of-range timestamp");
    }
    time
}

/// Rain, extreme heat and cold warnings for every sample in `series`.
pub fn weather_alerts(series: &ForecastSeries, offset: &FixedOffset) -> Vec<WeatherAlert> {
    let mut alerts = Vec::new();

    for sample in series {
        let Some(time) = local_time(sample, offset) else {
            continue;
        };
        let temp = sample.temperature_c;

        if sample.condition == ConditionCode::Rain {
            alerts.push(WeatherAlert {
                kind: AlertKind::Rain,
                severity: Severity::Medium,
                time,
                message: format!("Rain expected at {}", Language::En.clock(&time)),
            });
        }
        if temp > EXTREME_HEAT_ABOVE_C {
            alerts.push(WeatherAlert {
                kind: AlertKind::Heat,
                severity: Severity::High,
                time,
                message: format!("Very hot weather expected ({}°C)", rounded(temp)),
            });
        }
        if temp < COLD_ALERT_BELOW_C {
            alerts.push(WeatherAlert {
                kind: AlertKind::Cold,
                severity: Severity::Medium,
                time,
                message: format!("Cold weather expected ({}°C)", rounded(temp)),
            });
        }
    }

    alerts
}

/// Reminders for upcoming rain and heat. Events at or before `now`, and
/// events whose reminder time has already passed, are skipped.
pub fn plan_notifications(
    series: &ForecastSeries,
    now: &DateTime<FixedOffset>,
    user_name: &str,
) -> Vec<ScheduledAlert> {
    let mut planned = Vec::new();

    for sample in series {
        let Some(event_at) = local_time(sample, now.offset()) else {
            continue;
        };
        if event_at <= *now {
            continue;
        }

        if sample.condition == ConditionCode::Rain {
            planned.extend(schedule(
                AlertKind::Rain,
                event_at,
                now,
                format!("Hey {user_name}! Rain Alert"),
                format!(
                    "Rain expected at {}. Don't forget your umbrella!",
                    Language::En.clock(&event_at)
                ),
            ));
        }
        if sample.temperature_c > HOT_ABOVE_C {
            planned.extend(schedule(
                AlertKind::Heat,
                event_at,
                now,
                format!("{user_name}, Hot Weather Alert!"),
                format!(
                    "Very hot weather ({}°C) expected. Stay hydrated and wear light clothing!",
                    rounded(sample.temperature_c)
                ),
            ));
        }
    }

    tracing::debug!(count = planned.len(), "planned weather reminders");
    planned
}

fn schedule(
    kind: AlertKind,
    event_at: DateTime<FixedOffset>,
    now: &DateTime<FixedOffset>,
    title: String,
    body: String,
) -> Option<ScheduledAlert> {
    let notify_at = event_at - kind.lead_time()?;
    if notify_at <= *now {
        return None;
    }

    Some(ScheduledAlert {
        kind,
        tag: format!("{}-{}", kind, event_at.timestamp_millis()),
        title,
        body,
        event_at,
        notify_at,
        recommendations: kind
            .recommendation_keys()
            .iter()
            .map(|k| k.to_string())
            .collect(),
    })
}
