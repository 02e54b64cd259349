//! Stats module - rental metrics and narrative

mod calculator;
mod narrative;

pub use calculator::{
    CategoryMean, DashboardStats, HourlyAverage, Histogram, RentalSummary, StatsCalculator,
    DEFAULT_BINS, DEFAULT_PEAK_HOURS,
};
pub use narrative::{CategoryRates, Narrative, NarrativeSection};
