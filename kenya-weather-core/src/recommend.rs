//! Clothing and comfort recommendations for a single sample.

use serde::Serialize;

use crate::{
    language::Language,
    model::{ConditionCode, WeatherSample},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (Priority::High, Language::En) => "high",
            (Priority::Medium, Language::En) => "medium",
            (Priority::Low, Language::En) => "low",
            (Priority::High, Language::Sw) => "juu",
            (Priority::Medium, Language::Sw) => "kati",
            (Priority::Low, Language::Sw) => "chini",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationKind {
    StayHydrated,
    LightClothing,
    SunProtection,
    WarmClothing,
    ComfortableWeather,
    RainProtection,
    WindyConditions,
    HighHumidity,
}

impl RecommendationKind {
    pub fn title(&self, language: Language) -> &'static str {
        use RecommendationKind::*;
        match language {
            Language::En => match self {
                StayHydrated => "Stay Hydrated",
                LightClothing => "Light Clothing",
                SunProtection => "Sun Protection",
                WarmClothing => "Warm Clothing",
                ComfortableWeather => "Comfortable Weather",
                RainProtection => "Rain Protection",
                WindyConditions => "Windy Conditions",
                HighHumidity => "High Humidity",
            },
            Language::Sw => match self {
                StayHydrated => "Kunywa Maji",
                LightClothing => "Nguo Nyepesi",
                SunProtection => "Kinga ya Jua",
                WarmClothing => "Nguo za Joto",
                ComfortableWeather => "Hali ya Anga Nzuri",
                RainProtection => "Kinga ya Mvua",
                WindyConditions => "Hali ya Upepo",
                HighHumidity => "Unyevu Mkubwa",
            },
        }
    }

    pub fn description(&self, language: Language) -> &'static str {
        use RecommendationKind::*;
        match language {
            Language::En => match self {
                StayHydrated => "It's hot! Carry plenty of water and drink regularly.",
                LightClothing => "Wear light-colored, breathable fabrics like cotton.",
                SunProtection => "Don't forget sunglasses and sunscreen!",
                WarmClothing => "Layer up! Wear a jacket or sweater to stay warm.",
                ComfortableWeather => "Perfect weather for light clothing and outdoor activities!",
                RainProtection => "Carry an umbrella or raincoat. It might get wet!",
                WindyConditions => "Secure loose items and be careful with umbrellas.",
                HighHumidity => "It will feel muggy. Stay in shaded areas when possible.",
            },
            Language::Sw => match self {
                StayHydrated => "Ni joto! Beba maji mengi na kunywa mara kwa mara.",
                LightClothing => "Vaa nguo za rangi nyepesi, za kupumua kama pamba.",
                SunProtection => "Usisahau miwani ya jua na dawa ya kujikinga na jua!",
                WarmClothing => "Vaa nguo nyingi! Vaa jaketi au sweta ili upate joto.",
                ComfortableWeather => "Hali ya anga nzuri kwa nguo nyepesi na shughuli za nje!",
                RainProtection => "Beba mwavuli au koti la mvua. Inaweza kunyesha!",
                WindyConditions => "Funga vitu vilivyolegea na uwe mwangalifu na miwavuli.",
                HighHumidity => "Itahisi kama mvuke. Kaa kwenye maeneo ya kivuli iwezekanavyo.",
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: Priority,
}

impl Recommendation {
    fn new(kind: RecommendationKind, priority: Priority) -> Self {
        Self { kind, priority }
    }

    pub fn title(&self, language: Language) -> &'static str {
        self.kind.title(language)
    }

    pub fn description(&self, language: Language) -> &'static str {
        self.kind.description(language)
    }
}

pub const HOT_ABOVE_C: f64 = 30.0;
pub const COLD_BELOW_C: f64 = 15.0;
const COMFORTABLE_MAX_C: f64 = 25.0;
const WINDY_ABOVE_KMH: f64 = 20.0;
const DAMP_HUMIDITY_PCT: u8 = 80;
const MUGGY_HUMIDITY_PCT: u8 = 70;

/// Recommendations in display order. Empty when nothing stands out
/// (e.g. a dry 27°C afternoon).
pub fn recommendations(sample: &WeatherSample) -> Vec<Recommendation> {
    use RecommendationKind::*;

    let temp = sample.temperature_c;
    let mut out = Vec::new();

    if temp > HOT_ABOVE_C {
        out.push(Recommendation::new(StayHydrated, Priority::High));
        out.push(Recommendation::new(LightClothing, Priority::Medium));
        out.push(Recommendation::new(SunProtection, Priority::Medium));
    } else if temp < COLD_BELOW_C {
        out.push(Recommendation::new(WarmClothing, Priority::High));
    } else if temp <= COMFORTABLE_MAX_C {
        out.push(Recommendation::new(ComfortableWeather, Priority::Low));
    }

    if sample.condition == ConditionCode::Rain || sample.humidity_pct > DAMP_HUMIDITY_PCT {
        out.push(Recommendation::new(RainProtection, Priority::High));
    }

    if sample.wind_speed_kmh() > WINDY_ABOVE_KMH {
        out.push(Recommendation::new(WindyConditions, Priority::Medium));
    }

    if sample.humidity_pct > MUGGY_HUMIDITY_PCT && temp > COMFORTABLE_MAX_C {
        out.push(Recommendation::new(HighHumidity, Priority::Medium));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::RecommendationKind::*;
    use super::*;
    use crate::model::fixtures::{at, sample};

    fn kinds(s: &WeatherSample) -> Vec<RecommendationKind> {
        recommendations(s).into_iter().map(|r| r.kind).collect()
    }

    #[test]
    fn hot_day() {
        let mut s = sample(at(2024, 5, 1, 13, 0));
        s.temperature_c = 32.0;

        let recs = recommendations(&s);
        assert_eq!(
            recs.iter().map(|r| r.kind).collect::<Vec<_>>(),
            vec![StayHydrated, LightClothing, SunProtection]
        );
        assert_eq!(recs[0].priority, Priority::High);
    }

    #[test]
    fn cold_and_rainy() {
        let mut s = sample(at(2024, 7, 1, 6, 0));
        s.temperature_c = 12.0;
        s.condition = ConditionCode::Rain;

        assert_eq!(kinds(&s), vec![WarmClothing, RainProtection]);
    }

    #[test]
    fn comfortable_band_is_inclusive() {
        let mut s = sample(at(2024, 5, 1, 10, 0));
        s.temperature_c = 15.0;
        assert_eq!(kinds(&s), vec![ComfortableWeather]);

        s.temperature_c = 25.0;
        assert_eq!(kinds(&s), vec![ComfortableWeather]);
    }

    #[test]
    fn warm_dry_still_day_has_none() {
        let mut s = sample(at(2024, 5, 1, 15, 0));
        s.temperature_c = 27.0;
        assert!(recommendations(&s).is_empty());
    }

    #[test]
    fn wind_and_muggy() {
        let mut s = sample(at(2024, 3, 1, 15, 0));
        s.temperature_c = 28.0;
        s.humidity_pct = 75;
        s.wind_speed_ms = 6.0; // 21.6 km/h

        assert_eq!(kinds(&s), vec![WindyConditions, HighHumidity]);
    }

    #[test]
    fn very_humid_counts_as_rain_protection() {
        let mut s = sample(at(2024, 4, 1, 9, 0));
        s.humidity_pct = 85;
        assert!(kinds(&s).contains(&RainProtection));
    }

    #[test]
    fn localized_text() {
        let rec = Recommendation::new(RainProtection, Priority::High);
        assert_eq!(rec.title(Language::Sw), "Kinga ya Mvua");
        assert_eq!(rec.priority.label(Language::Sw), "juu");
        assert!(rec.description(Language::En).contains("umbrella"));
    }
}
