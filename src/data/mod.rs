//! Data module - rental CSV loading, caching and filtering

pub mod cache;
pub mod loader;
pub mod processor;
pub mod schema;

pub use cache::DatasetCache;
pub use loader::{DataLoader, DataSources, LoaderError, RentalTables};
pub use processor::{DataProcessor, DateRange, FilteredView, ProcessorError};
pub use schema::{ColumnKind, Season, TableKind, Weather};
