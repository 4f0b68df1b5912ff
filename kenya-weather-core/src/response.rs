//! Sentence generation for classified weather queries.
//!
//! [`generate`] picks the sample a query is about and renders one sentence
//! for it. Every intent and language combination has a template, including
//! the "no data" cases, so the result is never empty.

use chrono::{DateTime, FixedOffset};

use crate::{
    intent::{Intent, classify},
    language::Language,
    model::{ConditionCode, Forecast, ResolvedQuery, WeatherSample},
    recommend::{COLD_BELOW_C, HOT_ABOVE_C},
    time_expr::extract_time,
};

/// When the selected sample applies.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Moment {
    Now,
    At(DateTime<FixedOffset>),
    Tomorrow,
}

impl Moment {
    fn phrase(&self, lang: Language) -> String {
        match (self, lang) {
            (Moment::Now, Language::En) => "right now".to_string(),
            (Moment::Now, Language::Sw) => "sasa hivi".to_string(),
            (Moment::At(t), Language::En) => format!("at {}", lang.clock(t)),
            (Moment::At(t), Language::Sw) => lang.clock(t),
            (Moment::Tomorrow, Language::En) => "tomorrow".to_string(),
            (Moment::Tomorrow, Language::Sw) => "kesho".to_string(),
        }
    }
}

/// Which fixed sentence to use when no sample is available.
#[derive(Debug, Clone, Copy)]
enum Missing {
    Current(Intent),
    ForecastAt,
    Tomorrow,
}

/// Interpret a query locally and answer it.
///
/// This is the whole pipeline without the remote NLP step: time extraction
/// and intent classification feed [`generate`].
pub fn respond(
    query: &str,
    current: Option<&WeatherSample>,
    forecast: &Forecast,
    now: &DateTime<FixedOffset>,
    language: Language,
) -> String {
    let resolved = resolve_locally(query, now);
    generate(resolved.intent, resolved.target_time.as_ref(), current, forecast, language)
}

pub(crate) fn resolve_locally(query: &str, now: &DateTime<FixedOffset>) -> ResolvedQuery {
    ResolvedQuery {
        intent: classify(query),
        target_time: extract_time(query, now),
    }
}

/// Render the answer for `intent`.
///
/// With a resolved time the hourly sample for that time is used (falling back
/// to the daily sample on that date). Without one, `current` is used, except
/// for `FutureWeather` which describes tomorrow's daily sample. `FutureWeather`
/// also falls back to tomorrow when the resolved time matches nothing.
pub fn generate(
    intent: Intent,
    resolved_time: Option<&DateTime<FixedOffset>>,
    current: Option<&WeatherSample>,
    forecast: &Forecast,
    language: Language,
) -> String {
    let selected = match (resolved_time, intent) {
        (Some(at), _) => forecast
            .sample_at(at)
            .map(|s| (s, Moment::At(*at)))
            .or_else(|| match intent {
                Intent::FutureWeather => forecast.tomorrow().map(|s| (s, Moment::Tomorrow)),
                _ => None,
            })
            .ok_or(Missing::ForecastAt),
        (None, Intent::FutureWeather) => forecast
            .tomorrow()
            .map(|s| (s, Moment::Tomorrow))
            .ok_or(Missing::Tomorrow),
        (None, _) => current
            .map(|s| (s, Moment::Now))
            .ok_or(Missing::Current(intent)),
    };

    match selected {
        Ok((sample, moment)) => render(intent, sample, moment, language),
        Err(missing) => no_data(missing, language).to_string(),
    }
}

fn render(intent: Intent, s: &WeatherSample, moment: Moment, lang: Language) -> String {
    match intent {
        Intent::Rain => rain(s, moment, lang),
        Intent::Temperature | Intent::General => temperature(s, moment, lang),
        Intent::Clothing => clothing(s, moment, lang),
        Intent::FutureWeather => outlook(s, moment, lang),
        Intent::Sunny => sunny(s, moment, lang),
        Intent::Wind => wind(s, moment, lang),
        Intent::Humidity => humidity(s, moment, lang),
    }
}

fn degrees(celsius: f64) -> i64 {
    celsius.round() as i64
}

fn rain(s: &WeatherSample, moment: Moment, lang: Language) -> String {
    let when = moment.phrase(lang);
    let pct = s.precipitation_percent();

    if !s.rain_expected() {
        return match (lang, pct) {
            (Language::En, Some(p)) => format!(
                "No rain is expected {when}, with only a {p}% chance. You can leave the umbrella at home!"
            ),
            (Language::En, None) => {
                format!("No rain is expected {when}. You can leave the umbrella at home!")
            }
            (Language::Sw, Some(p)) => format!(
                "Hakuna mvua inayotarajiwa {when}, uwezekano ni {p}% tu. Unaweza kuacha mwavuli nyumbani!"
            ),
            (Language::Sw, None) => {
                format!("Hakuna mvua inayotarajiwa {when}. Unaweza kuacha mwavuli nyumbani!")
            }
        };
    }

    match (lang, moment, pct) {
        (Language::En, Moment::Now, Some(p)) if s.condition == ConditionCode::Rain => format!(
            "Yes, it's currently raining ({p}% chance). You should definitely carry an umbrella!"
        ),
        (Language::En, Moment::Now, None) if s.condition == ConditionCode::Rain => {
            "Yes, it's currently raining. You should definitely carry an umbrella!".to_string()
        }
        (Language::Sw, Moment::Now, Some(p)) if s.condition == ConditionCode::Rain => {
            format!("Ndiyo, inanyesha sasa (uwezekano {p}%). Unapaswa kubeba mwavuli!")
        }
        (Language::Sw, Moment::Now, None) if s.condition == ConditionCode::Rain => {
            "Ndiyo, inanyesha sasa. Unapaswa kubeba mwavuli!".to_string()
        }
        (Language::En, _, Some(p)) => {
            format!("There is a {p}% chance of rain {when}. I recommend carrying an umbrella.")
        }
        (Language::En, _, None) => {
            format!("Rain is expected {when}. I recommend carrying an umbrella just in case.")
        }
        (Language::Sw, _, Some(p)) => {
            format!("Kuna uwezekano wa {p}% wa mvua {when}. Napendekeza kubeba mwavuli.")
        }
        (Language::Sw, _, None) => {
            format!("Mvua inatarajiwa {when}. Napendekeza kubeba mwavuli.")
        }
    }
}

fn temperature(s: &WeatherSample, moment: Moment, lang: Language) -> String {
    let t = degrees(s.temperature_c);
    let desc = s.summary();

    match (lang, moment) {
        (Language::En, Moment::Now) => {
            format!("The current temperature is {t} degrees Celsius with {desc}.")
        }
        (Language::En, _) => format!(
            "The temperature {} will be {t} degrees Celsius with {desc}.",
            moment.phrase(lang)
        ),
        (Language::Sw, Moment::Now) => format!("Joto la sasa ni {t} digrii za selsiasi na {desc}."),
        (Language::Sw, _) => format!(
            "Joto {} litakuwa {t} digrii za selsiasi na {desc}.",
            moment.phrase(lang)
        ),
    }
}

fn clothing(s: &WeatherSample, moment: Moment, lang: Language) -> String {
    let advice = match lang {
        Language::En if s.temperature_c > HOT_ABOVE_C => {
            "It's hot! Wear light, breathable clothing and don't forget sunscreen."
        }
        Language::En if s.temperature_c < COLD_BELOW_C => {
            "It's cold! Layer up with warm clothing like a jacket or sweater."
        }
        Language::En => "The weather is comfortable. Light clothing should be perfect.",
        Language::Sw if s.temperature_c > HOT_ABOVE_C => {
            "Ni joto! Vaa nguo nyepesi, za kupumua na usisahau dawa ya jua."
        }
        Language::Sw if s.temperature_c < COLD_BELOW_C => {
            "Ni baridi! Vaa nguo nyingi kama jaketi au sweta."
        }
        Language::Sw => "Hali ya anga ni nzuri. Nguo nyepesi zitakuwa kamili.",
    };

    let mut text = match moment {
        Moment::Now => advice.to_string(),
        Moment::At(_) | Moment::Tomorrow => {
            let t = degrees(s.temperature_c);
            let when = moment.phrase(lang);
            match lang {
                Language::En => format!("It will be {t} degrees Celsius {when}. {advice}"),
                Language::Sw => format!("Kutakuwa na digrii {t} za selsiasi {when}. {advice}"),
            }
        }
    };

    if s.rain_expected() {
        text.push(' ');
        text.push_str(match lang {
            Language::En => "Also, don't forget rain protection!",
            Language::Sw => "Pia, usisahau kinga ya mvua!",
        });
    }

    text
}

fn outlook(s: &WeatherSample, moment: Moment, lang: Language) -> String {
    let t = degrees(s.temperature_c);
    let desc = s.summary();

    match (lang, moment) {
        (Language::En, Moment::Tomorrow) => {
            format!("Tomorrow's weather will be {t} degrees Celsius with {desc}.")
        }
        (Language::En, Moment::At(_)) => format!(
            "The weather {} will be {t} degrees Celsius with {desc}.",
            moment.phrase(lang)
        ),
        (Language::En, Moment::Now) => {
            format!("Right now it is {t} degrees Celsius with {desc}.")
        }
        (Language::Sw, Moment::Tomorrow) => {
            format!("Hali ya anga ya kesho itakuwa {t} digrii za selsiasi na {desc}.")
        }
        (Language::Sw, Moment::At(_)) => format!(
            "Hali ya anga {} itakuwa {t} digrii za selsiasi na {desc}.",
            moment.phrase(lang)
        ),
        (Language::Sw, Moment::Now) => {
            format!("Hali ya anga sasa ni {t} digrii za selsiasi na {desc}.")
        }
    }
}

fn sunny(s: &WeatherSample, moment: Moment, lang: Language) -> String {
    let clear = s.condition == ConditionCode::Clear;
    let when = moment.phrase(lang);

    match (lang, moment, clear) {
        (Language::En, Moment::Now, true) => {
            "Yes, it's sunny today! Perfect weather to be outside.".to_string()
        }
        (Language::En, Moment::Now, false) => "It's not particularly sunny today.".to_string(),
        (Language::En, _, true) => {
            format!("Yes, it should be sunny {when}. Perfect weather to be outside.")
        }
        (Language::En, _, false) => format!("It won't be particularly sunny {when}."),
        (Language::Sw, Moment::Now, true) => "Ndiyo, ni jua leo! Hali nzuri ya kuwa nje.".to_string(),
        (Language::Sw, Moment::Now, false) => "Si jua sana leo.".to_string(),
        (Language::Sw, _, true) => {
            format!("Ndiyo, kutakuwa na jua {when}. Hali nzuri ya kuwa nje.")
        }
        (Language::Sw, _, false) => format!("Hakutakuwa na jua sana {when}."),
    }
}

fn wind(s: &WeatherSample, moment: Moment, lang: Language) -> String {
    let kmh = s.wind_speed_kmh().round() as i64;

    match (lang, moment) {
        (Language::En, Moment::Now) => format!("The wind is currently blowing at {kmh} km/h."),
        (Language::En, _) => format!("The wind {} will be blowing at {kmh} km/h.", moment.phrase(lang)),
        (Language::Sw, Moment::Now) => format!("Upepo sasa unavuma kwa kasi ya {kmh} km/h."),
        (Language::Sw, _) => format!("Upepo {} utavuma kwa kasi ya {kmh} km/h.", moment.phrase(lang)),
    }
}

fn humidity(s: &WeatherSample, moment: Moment, lang: Language) -> String {
    let h = s.humidity_pct;

    match (lang, moment) {
        (Language::En, Moment::Now) => format!("The humidity is currently {h}%."),
        (Language::En, _) => format!("The humidity {} will be {h}%.", moment.phrase(lang)),
        (Language::Sw, Moment::Now) => format!("Unyevu sasa ni {h}%."),
        (Language::Sw, _) => format!("Unyevu {} utakuwa {h}%.", moment.phrase(lang)),
    }
}

fn no_data(missing: Missing, lang: Language) -> &'static str {
    match (missing, lang) {
        (Missing::ForecastAt, Language::En) => "I don't have forecast data for that time.",
        (Missing::ForecastAt, Language::Sw) => "Sina utabiri wa wakati huo.",
        (Missing::Tomorrow, Language::En) => "I don't have tomorrow's forecast available.",
        (Missing::Tomorrow, Language::Sw) => "Sina utabiri wa kesho.",
        (Missing::Current(intent), Language::En) => match intent {
            Intent::Rain => "I don't have rain information available right now.",
            Intent::Clothing => "I don't have weather information to make clothing recommendations.",
            Intent::Sunny => "I don't have sunshine information available.",
            Intent::Wind => "I don't have wind information available right now.",
            Intent::Humidity => "I don't have humidity information available right now.",
            Intent::FutureWeather => "I don't have tomorrow's forecast available.",
            Intent::Temperature | Intent::General => "I don't have current weather data available.",
        },
        (Missing::Current(intent), Language::Sw) => match intent {
            Intent::Rain => "Sina taarifa za mvua kwa sasa.",
            Intent::Clothing => "Sina taarifa za hali ya anga kutoa mapendekezo ya nguo.",
            Intent::Sunny => "Sina taarifa za jua.",
            Intent::Wind => "Sina taarifa za upepo kwa sasa.",
            Intent::Humidity => "Sina taarifa za unyevu kwa sasa.",
            Intent::FutureWeather => "Sina utabiri wa kesho.",
            Intent::Temperature | Intent::General => "Sina taarifa za hali ya anga za sasa.",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{at, sample};
    use crate::model::ForecastSeries;

    fn rainy(at_time: DateTime<FixedOffset>, pop: f64) -> WeatherSample {
        WeatherSample {
            precipitation_probability: Some(pop),
            condition: ConditionCode::Rain,
            description: "light rain".to_string(),
            ..sample(at_time)
        }
    }

    fn hourly(samples: Vec<WeatherSample>) -> Forecast {
        Forecast::new(ForecastSeries::new(samples), ForecastSeries::default())
    }

    const ALL_INTENTS: [Intent; 8] = [
        Intent::Rain,
        Intent::Temperature,
        Intent::Clothing,
        Intent::FutureWeather,
        Intent::Sunny,
        Intent::Wind,
        Intent::Humidity,
        Intent::General,
    ];

    #[test]
    fn rain_at_three_pm_reports_chance_and_umbrella() {
        let now = at(2024, 5, 1, 12, 0);
        let mut at_three = sample(at(2024, 5, 1, 15, 0));
        at_three.precipitation_probability = Some(0.6);
        at_three.condition = ConditionCode::Clouds;
        let forecast = hourly(vec![sample(at(2024, 5, 1, 12, 0)), at_three]);
        let current = sample(now);

        let text = respond("Will it rain at 3 PM?", Some(&current), &forecast, &now, Language::En);

        assert!(text.contains("60% chance"), "{text}");
        assert!(text.contains("umbrella"), "{text}");
        assert!(text.contains("3:00 PM"), "{text}");
    }

    #[test]
    fn rainy_sample_mentions_umbrella() {
        let s = rainy(at(2024, 5, 1, 15, 0), 0.8);
        let forecast = hourly(vec![s.clone()]);

        let text = generate(
            Intent::Rain,
            Some(&at(2024, 5, 1, 15, 0)),
            None,
            &forecast,
            Language::En,
        );
        assert!(text.contains("rain") && text.contains("umbrella"), "{text}");
        assert!(text.contains("80%"), "{text}");
    }

    #[test]
    fn clear_sample_states_no_rain() {
        let s = sample(at(2024, 5, 1, 15, 0));
        let text = generate(Intent::Rain, None, Some(&s), &Forecast::default(), Language::En);
        assert!(text.starts_with("No rain is expected"), "{text}");
    }

    #[test]
    fn currently_raining() {
        let s = rainy(at(2024, 5, 1, 15, 0), 0.9);
        let text = generate(Intent::Rain, None, Some(&s), &Forecast::default(), Language::En);
        assert_eq!(
            text,
            "Yes, it's currently raining (90% chance). You should definitely carry an umbrella!"
        );

        let sw = generate(Intent::Rain, None, Some(&s), &Forecast::default(), Language::Sw);
        assert!(sw.contains("90%") && sw.contains("mwavuli"), "{sw}");

        let unknown_chance = WeatherSample { precipitation_probability: None, ..s };
        let text = generate(Intent::Rain, None, Some(&unknown_chance), &Forecast::default(), Language::En);
        assert_eq!(text, "Yes, it's currently raining. You should definitely carry an umbrella!");
    }

    #[test]
    fn rain_without_probability() {
        let mut s = rainy(at(2024, 5, 1, 15, 0), 0.0);
        s.precipitation_probability = None;
        let forecast = hourly(vec![s]);

        let text = generate(Intent::Rain, Some(&at(2024, 5, 1, 15, 0)), None, &forecast, Language::En);
        assert_eq!(
            text,
            "Rain is expected at 3:00 PM. I recommend carrying an umbrella just in case."
        );
    }

    #[test]
    fn temperature_rounds_and_describes() {
        let mut s = sample(at(2024, 5, 1, 12, 0));
        s.temperature_c = 23.6;
        s.description = "scattered clouds".into();

        let text = generate(Intent::Temperature, None, Some(&s), &Forecast::default(), Language::En);
        assert_eq!(text, "The current temperature is 24 degrees Celsius with scattered clouds.");

        let general = generate(Intent::General, None, Some(&s), &Forecast::default(), Language::En);
        assert_eq!(general, text);
    }

    #[test]
    fn clothing_thresholds() {
        let mut s = sample(at(2024, 5, 1, 12, 0));
        let f = Forecast::default();

        s.temperature_c = 31.0;
        assert!(generate(Intent::Clothing, None, Some(&s), &f, Language::En).starts_with("It's hot!"));

        s.temperature_c = 30.0;
        assert!(generate(Intent::Clothing, None, Some(&s), &f, Language::En).starts_with("The weather is comfortable"));

        s.temperature_c = 14.9;
        assert!(generate(Intent::Clothing, None, Some(&s), &f, Language::En).starts_with("It's cold!"));

        s.precipitation_probability = Some(0.5);
        let text = generate(Intent::Clothing, None, Some(&s), &f, Language::En);
        assert!(text.ends_with("Also, don't forget rain protection!"), "{text}");
    }

    #[test]
    fn clothing_for_a_forecast_time() {
        let now = at(2024, 5, 1, 12, 0);
        let mut evening = sample(at(2024, 5, 1, 18, 0));
        evening.temperature_c = 12.2;
        let forecast = hourly(vec![evening]);

        let text = respond("What should I wear at 6 PM?", None, &forecast, &now, Language::En);
        assert_eq!(
            text,
            "It will be 12 degrees Celsius at 6:00 PM. It's cold! Layer up with warm clothing like a jacket or sweater."
        );
    }

    #[test]
    fn wear_tomorrow_morning_falls_back_to_daily() {
        let now = at(2024, 5, 1, 12, 0);
        let mut tomorrow = sample(at(2024, 5, 2, 12, 0));
        tomorrow.temperature_c = 33.0;
        let forecast = Forecast::new(
            ForecastSeries::default(),
            ForecastSeries::new(vec![sample(at(2024, 5, 1, 12, 0)), tomorrow]),
        );

        let text = respond("What should I wear tomorrow morning?", None, &forecast, &now, Language::En);
        assert!(text.contains("It's hot!"), "{text}");
    }

    #[test]
    fn wear_tomorrow_morning_without_forecast() {
        let now = at(2024, 5, 1, 12, 0);
        let current = sample(now);
        let text = respond(
            "What should I wear tomorrow morning?",
            Some(&current),
            &Forecast::default(),
            &now,
            Language::En,
        );
        assert_eq!(text, "I don't have forecast data for that time.");
    }

    #[test]
    fn future_weather_uses_tomorrow_daily_sample() {
        let mut tomorrow = sample(at(2024, 5, 2, 12, 0));
        tomorrow.temperature_c = 19.4;
        tomorrow.description = "light rain".into();
        let forecast = Forecast::new(
            ForecastSeries::default(),
            ForecastSeries::new(vec![sample(at(2024, 5, 1, 12, 0)), tomorrow]),
        );

        let text = generate(Intent::FutureWeather, None, None, &forecast, Language::En);
        assert_eq!(text, "Tomorrow's weather will be 19 degrees Celsius with light rain.");

        let missing = generate(Intent::FutureWeather, None, None, &Forecast::default(), Language::En);
        assert_eq!(missing, "I don't have tomorrow's forecast available.");
    }

    #[test]
    fn future_weather_at_unmatched_time_uses_tomorrow() {
        let mut tomorrow = sample(at(2024, 5, 2, 12, 0));
        tomorrow.temperature_c = 21.0;
        let forecast = Forecast::new(
            ForecastSeries::default(),
            ForecastSeries::new(vec![sample(at(2024, 5, 1, 12, 0)), tomorrow]),
        );

        let text = generate(
            Intent::FutureWeather,
            Some(&at(2024, 5, 4, 9, 0)),
            None,
            &forecast,
            Language::En,
        );
        assert_eq!(text, "Tomorrow's weather will be 21 degrees Celsius with clear sky.");
    }

    #[test]
    fn sunny_wind_humidity() {
        let mut s = sample(at(2024, 5, 1, 12, 0));
        s.wind_speed_ms = 5.0;
        s.humidity_pct = 72;
        let f = Forecast::default();

        assert!(generate(Intent::Sunny, None, Some(&s), &f, Language::En).starts_with("Yes"));
        assert_eq!(
            generate(Intent::Wind, None, Some(&s), &f, Language::En),
            "The wind is currently blowing at 18 km/h."
        );
        assert_eq!(
            generate(Intent::Humidity, None, Some(&s), &f, Language::En),
            "The humidity is currently 72%."
        );

        s.condition = ConditionCode::Clouds;
        assert_eq!(
            generate(Intent::Sunny, None, Some(&s), &f, Language::En),
            "It's not particularly sunny today."
        );
    }

    #[test]
    fn gibberish_describes_current_conditions() {
        let now = at(2024, 5, 1, 12, 0);
        let current = sample(now);
        let text = respond("asdkjh", Some(&current), &Forecast::default(), &now, Language::En);
        assert_eq!(text, "The current temperature is 22 degrees Celsius with clear sky.");
    }

    #[test]
    fn never_empty_for_any_intent_or_language() {
        let now = at(2024, 5, 1, 12, 0);
        let current = sample(now);
        let full = hourly(vec![sample(at(2024, 5, 1, 15, 0))]);
        let empty = Forecast::default();

        for lang in Language::all() {
            for intent in ALL_INTENTS {
                for time in [None, Some(at(2024, 5, 1, 15, 0))] {
                    for cur in [None, Some(&current)] {
                        for forecast in [&full, &empty] {
                            let text = generate(intent, time.as_ref(), cur, forecast, *lang);
                            assert!(!text.trim().is_empty(), "{intent} {lang} {time:?}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn generate_is_idempotent() {
        let now = at(2024, 5, 1, 12, 0);
        let current = rainy(now, 0.7);
        let forecast = hourly(vec![sample(at(2024, 5, 1, 15, 0))]);

        for intent in ALL_INTENTS {
            let a = generate(intent, Some(&now), Some(&current), &forecast, Language::Sw);
            let b = generate(intent, Some(&now), Some(&current), &forecast, Language::Sw);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn no_data_sentences_per_intent() {
        let f = Forecast::default();
        assert_eq!(
            generate(Intent::Rain, None, None, &f, Language::En),
            "I don't have rain information available right now."
        );
        assert_eq!(
            generate(Intent::General, None, None, &f, Language::Sw),
            "Sina taarifa za hali ya anga za sasa."
        );
    }

    #[test]
    fn swahili_forecast_wording() {
        let mut s = sample(at(2024, 5, 1, 15, 0));
        s.precipitation_probability = Some(0.6);
        let forecast = hourly(vec![s]);

        let text = generate(Intent::Rain, Some(&at(2024, 5, 1, 15, 0)), None, &forecast, Language::Sw);
        assert_eq!(text, "Kuna uwezekano wa 60% wa mvua saa 15:00. Napendekeza kubeba mwavuli.");
    }
}
