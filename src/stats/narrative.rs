//! Conclusion text for the dashboard, computed from the full loaded tables.

use crate::data::loader::RentalTables;
use crate::data::processor::{DataProcessor, ProcessorError};
use crate::stats::calculator::{CategoryMean, HourlyAverage, StatsCalculator};
use serde::Serialize;

/// Daily and hourly mean rentals for one category label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRates {
    pub label: String,
    pub per_day: Option<f64>,
    pub per_hour: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeSection {
    pub title: String,
    pub bullets: Vec<String>,
}

/// Findings behind the conclusion, ranked busiest first.
#[derive(Debug, Clone, Serialize)]
pub struct Narrative {
    pub seasons: Vec<CategoryRates>,
    pub weather: Vec<CategoryRates>,
    pub peak_hours: Vec<HourlyAverage>,
}

impl Narrative {
    pub fn from_tables(tables: &RentalTables, top_n: usize) -> Result<Self, ProcessorError> {
        let seasons = merge_rates(
            &StatsCalculator::season_means(tables.daily())?,
            &StatsCalculator::season_means(tables.hourly())?,
        );
        let weather = merge_rates(
            &StatsCalculator::weather_means(tables.daily())?,
            &StatsCalculator::weather_means(tables.hourly())?,
        );
        let hourly = StatsCalculator::hourly_averages(&DataProcessor::hour_counts(tables.hourly())?);

        Ok(Self {
            seasons,
            weather,
            peak_hours: StatsCalculator::peak_hours(&hourly, top_n),
        })
    }

    pub fn sections(&self) -> Vec<NarrativeSection> {
        let mut sections = vec![
            NarrativeSection {
                title: "By season".to_string(),
                bullets: self.seasons.iter().enumerate().map(|(i, r)| rate_line(i, r)).collect(),
            },
            NarrativeSection {
                title: "By weather".to_string(),
                bullets: self.weather.iter().enumerate().map(|(i, r)| rate_line(i, r)).collect(),
            },
            NarrativeSection {
                title: "Peak hours".to_string(),
                bullets: self
                    .peak_hours
                    .iter()
                    .map(|h| {
                        format!("{:02}:00 averages {:.0} rentals per hour.", h.hour, h.mean)
                    })
                    .collect(),
            },
        ];

        if let Some(summary) = self.summary() {
            sections.push(NarrativeSection {
                title: "Conclusion".to_string(),
                bullets: vec![summary],
            });
        }
        sections
    }

    /// One-paragraph takeaway, or `None` when the tables were empty.
    pub fn summary(&self) -> Option<String> {
        let best_season = self.seasons.first()?;
        let worst_season = self.seasons.last()?;
        let best_weather = self.weather.first()?;
        let worst_weather = self.weather.last()?;

        let mut text = format!(
            "{} and {} weather are the best conditions for cycling, while {} and {} weather hurt rentals the most.",
            best_season.label, best_weather.label, worst_season.label, worst_weather.label
        );
        if !self.peak_hours.is_empty() {
            let hours: Vec<String> = self
                .peak_hours
                .iter()
                .map(|h| format!("{:02}:00", h.hour))
                .collect();
            text.push_str(&format!(" Demand peaks at {}.", hours.join(", ")));
        }
        Some(text)
    }

    /// Plain-text rendering for the terminal.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for section in self.sections() {
            out.push_str(&section.title);
            out.push('\n');
            for bullet in &section.bullets {
                out.push_str("  - ");
                out.push_str(bullet);
                out.push('\n');
            }
        }
        out
    }
}

/// Join daily and hourly means by label, ranked by daily mean (hourly when a
/// label never shows up in the daily table).
fn merge_rates(daily: &[CategoryMean], hourly: &[CategoryMean]) -> Vec<CategoryRates> {
    let mut labels: Vec<&str> = daily.iter().map(|m| m.label.as_str()).collect();
    for m in hourly {
        if !labels.contains(&m.label.as_str()) {
            labels.push(&m.label);
        }
    }

    let lookup = |means: &[CategoryMean], label: &str| {
        means.iter().find(|m| m.label == label).map(|m| m.mean)
    };
    let mut rates: Vec<CategoryRates> = labels
        .into_iter()
        .map(|label| CategoryRates {
            label: label.to_string(),
            per_day: lookup(daily, label),
            per_hour: lookup(hourly, label),
        })
        .collect();

    rates.sort_by(|a, b| {
        let key = |r: &CategoryRates| (r.per_day.is_some(), r.per_day.or(r.per_hour).unwrap_or(f64::NAN));
        let (a_daily, a_val) = key(a);
        let (b_daily, b_val) = key(b);
        b_daily.cmp(&a_daily).then(b_val.total_cmp(&a_val))
    });
    rates
}

fn rate_line(rank: usize, rates: &CategoryRates) -> String {
    let lead = if rank == 0 {
        format!("{} has the most rentals", rates.label)
    } else {
        format!("{} ranks #{}", rates.label, rank + 1)
    };
    match (rates.per_day, rates.per_hour) {
        (Some(day), Some(hour)) => format!(
            "{lead}, averaging {} per day and {:.0} per hour.",
            StatsCalculator::format_count(day.round() as i64),
            hour
        ),
        (Some(day), None) => format!(
            "{lead}, averaging {} per day.",
            StatsCalculator::format_count(day.round() as i64)
        ),
        (None, Some(hour)) => format!("{lead}, averaging only {hour:.0} per hour."),
        (None, None) => lead,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean(label: &str, mean: f64) -> CategoryMean {
        CategoryMean {
            label: label.to_string(),
            mean,
            count: 1,
        }
    }

    #[test]
    fn test_rates_ranked_by_daily_mean() {
        let daily = vec![mean("Spring", 2604.0), mean("Fall", 5644.0), mean("Summer", 4992.0)];
        let hourly = vec![mean("Spring", 111.0), mean("Fall", 236.0), mean("Summer", 208.0)];
        let rates = merge_rates(&daily, &hourly);

        let labels: Vec<&str> = rates.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Fall", "Summer", "Spring"]);
        assert_eq!(rates[0].per_hour, Some(236.0));
    }

    #[test]
    fn test_hourly_only_label_ranks_last() {
        let daily = vec![mean("Clear", 4876.0), mean("Mist", 4035.0)];
        let hourly = vec![mean("Clear", 204.0), mean("Heavy Rain/Snow", 74.0)];
        let rates = merge_rates(&daily, &hourly);

        assert_eq!(rates.last().unwrap().label, "Heavy Rain/Snow");
        assert_eq!(rates.last().unwrap().per_day, None);
        assert_eq!(
            rate_line(2, rates.last().unwrap()),
            "Heavy Rain/Snow ranks #3, averaging only 74 per hour."
        );
    }

    #[test]
    fn test_rate_line_formats_counts() {
        let rates = CategoryRates {
            label: "Fall".to_string(),
            per_day: Some(5644.3),
            per_hour: Some(236.1),
        };
        assert_eq!(
            rate_line(0, &rates),
            "Fall has the most rentals, averaging 5,644 per day and 236 per hour."
        );
    }

    #[test]
    fn test_empty_narrative_has_no_summary() {
        let narrative = Narrative {
            seasons: Vec::new(),
            weather: Vec::new(),
            peak_hours: Vec::new(),
        };
        assert!(narrative.summary().is_none());
        assert_eq!(narrative.sections().len(), 3);
    }
}
