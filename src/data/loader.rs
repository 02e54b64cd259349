//! Rental CSV Loader Module
//! Reads the daily and hourly rental tables with Polars and normalizes them:
//! dates parsed, season/weather codes replaced by their labels.

use crate::data::schema::{
    self, ColumnKind, Season, TableKind, Weather, DATE_COL, SEASON_COL, WEATHER_COL,
};
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Data source not found: {}", path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid date {value:?} in {table} table at row {row} (expected {format})")]
    DateParse {
        table: TableKind,
        row: usize,
        value: String,
        format: String,
    },
    #[error("The {table} table has no '{column}' column")]
    MissingColumn { table: TableKind, column: String },
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
}

/// Locations of the two source files.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataSources {
    pub daily: PathBuf,
    pub hourly: PathBuf,
}

impl DataSources {
    pub fn new(daily: impl Into<PathBuf>, hourly: impl Into<PathBuf>) -> Self {
        Self {
            daily: daily.into(),
            hourly: hourly.into(),
        }
    }
}

/// The cleaned daily and hourly tables. Read-only once built.
#[derive(Debug, Clone)]
pub struct RentalTables {
    daily: DataFrame,
    hourly: DataFrame,
}

impl RentalTables {
    pub fn daily(&self) -> &DataFrame {
        &self.daily
    }

    pub fn hourly(&self) -> &DataFrame {
        &self.hourly
    }

    pub fn table(&self, kind: TableKind) -> &DataFrame {
        match kind {
            TableKind::Daily => &self.daily,
            TableKind::Hourly => &self.hourly,
        }
    }

    /// Column names of a table together with how each is treated.
    pub fn column_kinds(&self, kind: TableKind) -> Vec<(String, ColumnKind)> {
        self.table(kind)
            .get_column_names()
            .iter()
            .map(|name| (name.to_string(), schema::column_kind(name)))
            .collect()
    }
}

impl PartialEq for RentalTables {
    fn eq(&self, other: &Self) -> bool {
        self.daily.equals_missing(&other.daily) && self.hourly.equals_missing(&other.hourly)
    }
}

/// Loads and normalizes the rental CSV files.
#[derive(Debug, Clone)]
pub struct DataLoader {
    date_format: String,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT)
    }
}

impl DataLoader {
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
        }
    }

    /// Load both tables. Fails on the first missing source or bad date.
    pub fn load_tables(&self, sources: &DataSources) -> Result<RentalTables, LoaderError> {
        let daily = self.load_table(&sources.daily, TableKind::Daily)?;
        let hourly = self.load_table(&sources.hourly, TableKind::Hourly)?;
        Ok(RentalTables { daily, hourly })
    }

    /// Load a single CSV file and normalize it as the given table.
    pub fn load_table(&self, path: &Path, kind: TableKind) -> Result<DataFrame, LoaderError> {
        std::fs::metadata(path).map_err(|source| LoaderError::SourceNotFound {
            path: path.to_path_buf(),
            source,
        })?;

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;
        debug!(table = %kind, path = %path.display(), rows = df.height(), "CSV read");

        let df = self.normalize(df, kind)?;
        info!(
            table = %kind,
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "Rental table loaded"
        );
        Ok(df)
    }

    /// Normalize a raw frame: parse the date column and label season/weather.
    pub fn normalize(&self, mut df: DataFrame, kind: TableKind) -> Result<DataFrame, LoaderError> {
        for column in kind.required_columns() {
            if df.column(column).is_err() {
                return Err(LoaderError::MissingColumn {
                    table: kind,
                    column: column.to_string(),
                });
            }
        }

        let dates = self.parse_dates(&df, kind)?;
        df.with_column(dates)?;

        if df.column(SEASON_COL).is_ok() {
            let seasons = map_codes(&df, SEASON_COL, |c| Season::from_code(c).map(Season::label))?;
            df.with_column(seasons)?;
        }
        if df.column(WEATHER_COL).is_ok() {
            let weather =
                map_codes(&df, WEATHER_COL, |c| Weather::from_code(c).map(Weather::label))?;
            df.with_column(weather)?;
        }

        Ok(df)
    }

    fn parse_dates(&self, df: &DataFrame, kind: TableKind) -> Result<Column, LoaderError> {
        let raw = df.column(DATE_COL)?;
        if raw.dtype() == &DataType::Date {
            return Ok(raw.clone());
        }

        let text = raw.cast(&DataType::String)?;
        let values = text.as_materialized_series().str()?;

        let mut dates: Vec<NaiveDate> = Vec::with_capacity(values.len());
        for (row, value) in values.into_iter().enumerate() {
            let parsed =
                value.and_then(|v| NaiveDate::parse_from_str(v.trim(), &self.date_format).ok());
            match parsed {
                Some(date) => dates.push(date),
                None => {
                    return Err(LoaderError::DateParse {
                        table: kind,
                        row,
                        value: value.unwrap_or_default().to_string(),
                        format: self.date_format.clone(),
                    })
                }
            }
        }

        Ok(Column::new(DATE_COL.into(), dates))
    }
}

/// Replace integer codes with labels. Unknown, fractional or missing codes become null.
fn map_codes<F>(df: &DataFrame, name: &str, label_for: F) -> Result<Column, LoaderError>
where
    F: Fn(i64) -> Option<&'static str>,
{
    let raw = df.column(name)?;
    let labels: Vec<Option<&str>> = if raw.dtype().is_integer() {
        let codes = raw.cast(&DataType::Int64)?;
        codes
            .as_materialized_series()
            .i64()?
            .into_iter()
            .map(|code| code.and_then(&label_for))
            .collect()
    } else {
        let codes = raw.cast(&DataType::Float64)?;
        codes
            .as_materialized_series()
            .f64()?
            .into_iter()
            .map(|code| code.and_then(integral_code).and_then(&label_for))
            .collect()
    };

    Ok(Column::new(name.into(), labels))
}

fn integral_code(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
}
