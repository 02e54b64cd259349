//! Rental Dataset Schema
//! Column names, coded categories and their label tables.

use serde::Serialize;
use std::fmt;

pub const DATE_COL: &str = "dteday";
pub const SEASON_COL: &str = "season";
pub const WEATHER_COL: &str = "weathersit";
pub const WORKINGDAY_COL: &str = "workingday";
pub const HOLIDAY_COL: &str = "holiday";
pub const COUNT_COL: &str = "cnt";
pub const HOUR_COL: &str = "hr";

/// Columns treated as categorical whenever a table carries them.
pub const CATEGORICAL_COLUMNS: [&str; 4] = [SEASON_COL, WEATHER_COL, WORKINGDAY_COL, HOLIDAY_COL];

/// Season of the year, coded 1..=4 in the source files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    /// Map a source code to a season. Codes outside 1..=4 have no season.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Season::Spring),
            2 => Some(Season::Summer),
            3 => Some(Season::Fall),
            4 => Some(Season::Winter),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Season::Spring => 1,
            Season::Summer => 2,
            Season::Fall => 3,
            Season::Winter => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Weather situation, coded 1..=4 in the source files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Weather {
    Clear,
    Mist,
    LightSnowRain,
    HeavyRainSnow,
}

impl Weather {
    pub const ALL: [Weather; 4] = [
        Weather::Clear,
        Weather::Mist,
        Weather::LightSnowRain,
        Weather::HeavyRainSnow,
    ];

    /// Map a source code to a weather situation. Codes outside 1..=4 have none.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Weather::Clear),
            2 => Some(Weather::Mist),
            3 => Some(Weather::LightSnowRain),
            4 => Some(Weather::HeavyRainSnow),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Weather::Clear => 1,
            Weather::Mist => 2,
            Weather::LightSnowRain => 3,
            Weather::HeavyRainSnow => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Weather::Clear => "Clear",
            Weather::Mist => "Mist",
            Weather::LightSnowRain => "Light Snow/Rain",
            Weather::HeavyRainSnow => "Heavy Rain/Snow",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.label() == label)
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a column's value space is treated downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Date,
    Categorical,
    Numeric,
}

/// Which of the two source tables a frame came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Daily,
    Hourly,
}

impl TableKind {
    /// Columns that must be present for the table to be usable.
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            TableKind::Daily => &[DATE_COL, COUNT_COL],
            TableKind::Hourly => &[DATE_COL, COUNT_COL, HOUR_COL],
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Daily => f.write_str("daily"),
            TableKind::Hourly => f.write_str("hourly"),
        }
    }
}

/// Classify a column of a cleaned table by name.
pub fn column_kind(name: &str) -> ColumnKind {
    if name == DATE_COL {
        ColumnKind::Date
    } else if CATEGORICAL_COLUMNS.contains(&name) {
        ColumnKind::Categorical
    } else {
        ColumnKind::Numeric
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_codes_round_trip() {
        for code in 1..=4 {
            let season = Season::from_code(code).unwrap();
            assert_eq!(season.code(), code);
            assert_eq!(Season::from_label(season.label()), Some(season));
        }
    }

    #[test]
    fn test_weather_codes_round_trip() {
        for code in 1..=4 {
            let weather = Weather::from_code(code).unwrap();
            assert_eq!(weather.code(), code);
            assert_eq!(Weather::from_label(weather.label()), Some(weather));
        }
    }

    #[test]
    fn test_out_of_range_codes_have_no_label() {
        for code in [-1, 0, 5, 42, i64::MAX] {
            assert_eq!(Season::from_code(code), None);
            assert_eq!(Weather::from_code(code), None);
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(Season::from_code(3).map(Season::label), Some("Fall"));
        assert_eq!(Weather::from_code(3).map(Weather::label), Some("Light Snow/Rain"));
        assert_eq!(Weather::from_code(4).map(Weather::label), Some("Heavy Rain/Snow"));
    }

    #[test]
    fn test_column_kind() {
        assert_eq!(column_kind("dteday"), ColumnKind::Date);
        assert_eq!(column_kind("holiday"), ColumnKind::Categorical);
        assert_eq!(column_kind("temp"), ColumnKind::Numeric);
    }
}
