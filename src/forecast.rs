//! Forecast risk scoring and prompt summaries.
//!
//! Turns forecast intervals into the plain-text summary sent through
//! `generate_from_text`.

use crate::assessment::Severity;
use std::fmt::Write as _;

/// One forecast interval (typically three hours).
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastItem {
    pub date_time: String,
    /// °C
    pub temperature: f64,
    /// %
    pub humidity: u8,
    /// m/s
    pub wind_speed: f64,
    /// m/s
    pub wind_gust: f64,
    /// mm over the interval
    pub rainfall: f64,
    /// %
    pub clouds: u8,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindLevel {
    Light,
    Moderate,
    Strong,
    Storm,
}

impl WindLevel {
    pub fn label(&self) -> &'static str {
        match self {
            WindLevel::Light => "LIGHT",
            WindLevel::Moderate => "MODERATE",
            WindLevel::Strong => "STRONG",
            WindLevel::Storm => "STORM",
        }
    }

    pub fn warning(&self) -> &'static str {
        match self {
            WindLevel::Light => "Light winds. Normal conditions.",
            WindLevel::Moderate => "Moderate winds. Be cautious outdoors.",
            WindLevel::Strong => "Strong winds expected. Secure loose objects.",
            WindLevel::Storm => "Dangerous winds! Stay indoors.",
        }
    }
}

impl ForecastItem {
    /// Flood risk in `0..=100` from rainfall, humidity, wind and cloud cover.
    pub fn risk_score(&self) -> u8 {
        let mut score: u32 = 0;

        score += match self.rainfall {
            r if r > 50.0 => 40,
            r if r > 30.0 => 30,
            r if r > 15.0 => 20,
            r if r > 5.0 => 10,
            _ => 0,
        };

        score += match self.humidity {
            h if h > 90 => 25,
            h if h > 80 => 15,
            h if h > 70 => 8,
            _ => 0,
        };

        // Strong wind on top of rain makes flash floods worse
        score += match self.wind_speed {
            w if w >= 14.0 => 20,
            w if w >= 8.0 => 10,
            _ => 0,
        };

        if self.clouds > 90 && self.rainfall > 0.0 {
            score += 15;
        } else if self.clouds > 70 {
            score += 8;
        }

        score.min(100) as u8
    }

    pub fn risk_level(&self) -> Severity {
        match self.risk_score() {
            s if s >= 60 => Severity::High,
            s if s >= 30 => Severity::Medium,
            _ => Severity::Low,
        }
    }

    pub fn wind_level(&self) -> WindLevel {
        match self.wind_speed {
            w if w >= 20.0 => WindLevel::Storm,
            w if w >= 14.0 => WindLevel::Strong,
            w if w >= 8.0 => WindLevel::Moderate,
            _ => WindLevel::Light,
        }
    }

    /// Single summary line for prompts.
    pub fn summary(&self) -> String {
        format!(
            "{}: {}, Temp={}°C, Rain={}mm, Humidity={}%, Wind={}m/s (gust {}m/s), Clouds={}%",
            self.date_time,
            self.description,
            decimal(self.temperature),
            decimal(self.rainfall),
            self.humidity,
            decimal(self.wind_speed),
            decimal(self.wind_gust),
            self.clouds
        )
    }
}

/// Full-precision decimal that always shows a fractional digit (`26.0`,
/// `26.53`).
fn decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// Prompt text describing a city's forecast, one line per interval.
pub fn build_forecast_summary(city: &str, items: &[ForecastItem]) -> String {
    let mut out = format!("Weather forecast for {}, Malaysia:\n\n", city);
    for item in items {
        let _ = writeln!(out, "{}", item.summary());
    }
    out
}

/// Eight three-hour intervals of worsening weather, for running without a
/// weather feed.
pub fn demo_forecast() -> Vec<ForecastItem> {
    const TIMES: [&str; 8] = [
        "Today 12:00",
        "Today 15:00",
        "Today 18:00",
        "Today 21:00",
        "Tomorrow 00:00",
        "Tomorrow 03:00",
        "Tomorrow 06:00",
        "Tomorrow 09:00",
    ];
    const TEMPS: [f64; 8] = [31.0, 29.0, 27.0, 26.0, 25.0, 25.0, 26.0, 28.0];
    const HUMIDITY: [u8; 8] = [75, 82, 88, 92, 95, 93, 90, 85];
    const WINDS: [f64; 8] = [3.0, 5.0, 8.0, 12.0, 15.0, 18.0, 14.0, 8.0];
    const GUSTS: [f64; 8] = [5.0, 8.0, 12.0, 18.0, 22.0, 25.0, 20.0, 12.0];
    const RAIN: [f64; 8] = [0.0, 2.0, 8.0, 20.0, 35.0, 45.0, 30.0, 10.0];
    const CLOUDS: [u8; 8] = [40, 60, 80, 95, 100, 100, 90, 70];
    const DESCRIPTIONS: [&str; 8] = [
        "scattered clouds",
        "light rain",
        "moderate rain",
        "heavy rain",
        "heavy rain",
        "thunderstorm",
        "heavy rain",
        "moderate rain",
    ];

    (0..TIMES.len())
        .map(|i| ForecastItem {
            date_time: TIMES[i].to_string(),
            temperature: TEMPS[i],
            humidity: HUMIDITY[i],
            wind_speed: WINDS[i],
            wind_gust: GUSTS[i],
            rainfall: RAIN[i],
            clouds: CLOUDS[i],
            description: DESCRIPTIONS[i].to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(rainfall: f64, humidity: u8, wind_speed: f64, clouds: u8) -> ForecastItem {
        ForecastItem {
            date_time: "Today 12:00".to_string(),
            temperature: 28.0,
            humidity,
            wind_speed,
            wind_gust: wind_speed,
            rainfall,
            clouds,
            description: "rain".to_string(),
        }
    }

    #[test]
    fn test_calm_day_is_low_risk() {
        let calm = item(0.0, 60, 2.0, 20);
        assert_eq!(calm.risk_score(), 0);
        assert_eq!(calm.risk_level(), Severity::Low);
        assert_eq!(calm.wind_level(), WindLevel::Light);
    }

    #[test]
    fn test_storm_is_capped_at_100() {
        let storm = item(60.0, 95, 22.0, 100);
        assert_eq!(storm.risk_score(), 100);
        assert_eq!(storm.risk_level(), Severity::High);
        assert_eq!(storm.wind_level(), WindLevel::Storm);
    }

    #[test]
    fn test_threshold_boundaries() {
        // rain >30 (30) + humidity >80 (15) = 45
        let medium = item(31.0, 81, 0.0, 0);
        assert_eq!(medium.risk_score(), 45);
        assert_eq!(medium.risk_level(), Severity::Medium);

        // Exactly at thresholds does not count for rain/humidity
        let edge = item(5.0, 70, 8.0, 70);
        assert_eq!(edge.risk_score(), 10);
    }

    #[test]
    fn test_overcast_without_rain_scores_partial_cloud_points() {
        let overcast = item(0.0, 0, 0.0, 95);
        assert_eq!(overcast.risk_score(), 8);
    }

    #[test]
    fn test_summary_format() {
        let line = demo_forecast()[3].summary();
        assert_eq!(
            line,
            "Today 21:00: heavy rain, Temp=26.0°C, Rain=20.0mm, Humidity=92%, Wind=12.0m/s (gust 18.0m/s), Clouds=95%"
        );
    }

    #[test]
    fn test_summary_keeps_full_precision() {
        let mut reading = item(12.25, 88, 7.3, 64);
        reading.temperature = 26.53;
        reading.wind_gust = 11.0;

        assert_eq!(
            reading.summary(),
            "Today 12:00: rain, Temp=26.53°C, Rain=12.25mm, Humidity=88%, Wind=7.3m/s (gust 11.0m/s), Clouds=64%"
        );
    }

    #[test]
    fn test_build_forecast_summary() {
        let items = demo_forecast();
        let summary = build_forecast_summary("Kuala Lumpur", &items);

        assert!(summary.starts_with("Weather forecast for Kuala Lumpur, Malaysia:\n\n"));
        assert_eq!(summary.lines().count(), 2 + items.len());
        assert!(summary.ends_with('\n'));
    }

    #[test]
    fn test_demo_forecast_worsens_overnight() {
        let items = demo_forecast();
        assert_eq!(items.len(), 8);
        assert_eq!(items[0].risk_level(), Severity::Low);
        assert_eq!(items[5].risk_level(), Severity::High);
    }
}
