//! Data Processor Module
//! Date-range filtering and column extraction over the loaded tables.
//! Every operation returns new frames; the loaded tables are never touched.

use crate::data::loader::RentalTables;
use crate::data::schema::{COUNT_COL, DATE_COL, HOUR_COL};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Inclusive date range. `start > end` is allowed and selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A range covering one day.
    pub fn single(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Both tables restricted to one date range. `range` is `None` when no range
/// could be resolved, in which case both frames are empty.
#[derive(Debug, Clone)]
pub struct FilteredView {
    pub range: Option<DateRange>,
    pub daily: DataFrame,
    pub hourly: DataFrame,
}

/// Handles filtering and column extraction.
pub struct DataProcessor;

impl DataProcessor {
    /// Keep the rows whose date lies inside the range.
    pub fn filter_by_date_range(
        df: &DataFrame,
        range: &DateRange,
    ) -> Result<DataFrame, ProcessorError> {
        let filtered = df
            .clone()
            .lazy()
            .filter(
                col(DATE_COL)
                    .gt_eq(lit(range.start))
                    .and(col(DATE_COL).lt_eq(lit(range.end))),
            )
            .collect()?;
        Ok(filtered)
    }

    /// Filter both tables to the same range.
    pub fn filter_tables(
        tables: &RentalTables,
        range: DateRange,
    ) -> Result<FilteredView, ProcessorError> {
        let daily = Self::filter_by_date_range(tables.daily(), &range)?;
        let hourly = Self::filter_by_date_range(tables.hourly(), &range)?;
        debug!(
            range = %range,
            daily_rows = daily.height(),
            hourly_rows = hourly.height(),
            "Tables filtered"
        );
        Ok(FilteredView {
            range: Some(range),
            daily,
            hourly,
        })
    }

    /// Filter to `start..=end`, taking a missing endpoint from the daily span.
    /// With no span to fall back on the view is empty.
    pub fn select(
        tables: &RentalTables,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<FilteredView, ProcessorError> {
        match Self::resolve_range(tables, start, end)? {
            Some(range) => Self::filter_tables(tables, range),
            None => {
                debug!("No date range to select, daily table has no dates");
                Ok(FilteredView {
                    range: None,
                    daily: tables.daily().head(Some(0)),
                    hourly: tables.hourly().head(Some(0)),
                })
            }
        }
    }

    /// Fill in the endpoints not given from the daily span.
    pub fn resolve_range(
        tables: &RentalTables,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Option<DateRange>, ProcessorError> {
        if let (Some(start), Some(end)) = (start, end) {
            return Ok(Some(DateRange::new(start, end)));
        }
        let span = Self::default_range(tables)?;
        let start = start.or(span.map(|s| s.start));
        let end = end.or(span.map(|s| s.end));
        Ok(start.zip(end).map(|(start, end)| DateRange::new(start, end)))
    }

    /// Earliest and latest date of a table, or `None` when it has no dates.
    pub fn date_bounds(df: &DataFrame) -> Result<Option<DateRange>, ProcessorError> {
        let dates = Self::dates(df)?;
        let min = dates.iter().flatten().min().copied();
        let max = dates.iter().flatten().max().copied();
        Ok(min.zip(max).map(|(start, end)| DateRange::new(start, end)))
    }

    /// The default selection: the full span of the daily table.
    pub fn default_range(tables: &RentalTables) -> Result<Option<DateRange>, ProcessorError> {
        Self::date_bounds(tables.daily())
    }

    /// Date column as calendar dates.
    pub fn dates(df: &DataFrame) -> Result<Vec<Option<NaiveDate>>, ProcessorError> {
        let dates = df
            .column(DATE_COL)?
            .as_materialized_series()
            .date()?
            .as_date_iter()
            .collect();
        Ok(dates)
    }

    /// Rental counts, skipping nulls.
    pub fn counts(df: &DataFrame) -> Result<Vec<i64>, ProcessorError> {
        Self::int_values(df, COUNT_COL).map(|values| values.into_iter().flatten().collect())
    }

    /// (hour, count) pairs of the hourly table, skipping rows missing either.
    pub fn hour_counts(df: &DataFrame) -> Result<Vec<(u32, i64)>, ProcessorError> {
        let hours = Self::int_values(df, HOUR_COL)?;
        let counts = Self::int_values(df, COUNT_COL)?;
        let pairs = hours
            .into_iter()
            .zip(counts)
            .filter_map(|(h, c)| Some((u32::try_from(h?).ok()?, c?)))
            .collect();
        Ok(pairs)
    }

    /// (label, count) pairs for a categorical column; null labels are kept as `None`.
    pub fn labelled_counts(
        df: &DataFrame,
        column: &str,
    ) -> Result<Vec<(Option<String>, Option<i64>)>, ProcessorError> {
        let labels = df.column(column)?.cast(&DataType::String)?;
        let counts = Self::int_values(df, COUNT_COL)?;
        let pairs = labels
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|label| label.map(str::to_string))
            .zip(counts)
            .collect();
        Ok(pairs)
    }

    fn int_values(df: &DataFrame, column: &str) -> Result<Vec<Option<i64>>, ProcessorError> {
        let values = df.column(column)?.cast(&DataType::Int64)?;
        let values = values.as_materialized_series().i64()?.into_iter().collect();
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::DataLoader;
    use crate::data::schema::TableKind;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily() -> DataFrame {
        let raw = df!(
            "dteday" => ["2011-01-01", "2011-01-02", "2011-01-03", "2011-01-04"],
            "season" => [1i64, 1, 1, 1],
            "weathersit" => [1i64, 2, 1, 3],
            "cnt" => [985i64, 801, 1349, 1562],
        )
        .unwrap();
        DataLoader::default().normalize(raw, TableKind::Daily).unwrap()
    }

    #[test]
    fn test_full_range_keeps_every_row() {
        let df = daily();
        let range = DataProcessor::date_bounds(&df).unwrap().unwrap();
        assert_eq!(range, DateRange::new(ymd(2011, 1, 1), ymd(2011, 1, 4)));

        let filtered = DataProcessor::filter_by_date_range(&df, &range).unwrap();
        assert!(filtered.equals_missing(&df));
    }

    #[test]
    fn test_single_day_range() {
        let df = daily();
        let day = ymd(2011, 1, 3);
        let filtered = DataProcessor::filter_by_date_range(&df, &DateRange::single(day)).unwrap();

        assert_eq!(filtered.height(), 1);
        assert_eq!(DataProcessor::dates(&filtered).unwrap(), vec![Some(day)]);
        assert_eq!(DataProcessor::counts(&filtered).unwrap(), vec![1349]);
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let df = daily();
        let range = DateRange::new(ymd(2011, 1, 4), ymd(2011, 1, 1));
        assert!(range.is_empty());

        let filtered = DataProcessor::filter_by_date_range(&df, &range).unwrap();
        assert_eq!(filtered.height(), 0);
        assert!(DataProcessor::date_bounds(&filtered).unwrap().is_none());
    }

    #[test]
    fn test_filter_leaves_source_untouched() {
        let df = daily();
        let before = df.clone();
        let _ = DataProcessor::filter_by_date_range(&df, &DateRange::single(ymd(2011, 1, 2)))
            .unwrap();
        assert!(df.equals_missing(&before));
        assert_eq!(df.height(), 4);
    }

    #[test]
    fn test_dates_decode_to_calendar_days() {
        let dates = DataProcessor::dates(&daily()).unwrap();
        assert_eq!(dates.first(), Some(&Some(ymd(2011, 1, 1))));
        assert_eq!(dates.last(), Some(&Some(ymd(2011, 1, 4))));
    }

    #[test]
    fn test_labelled_counts() {
        let df = daily();
        let pairs = DataProcessor::labelled_counts(&df, "weathersit").unwrap();
        assert_eq!(pairs[1], (Some("Mist".to_string()), Some(801)));
        assert_eq!(pairs[3], (Some("Light Snow/Rain".to_string()), Some(1562)));
    }
}
