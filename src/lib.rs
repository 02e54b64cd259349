//! Bike Rental Dashboard
//!
//! Loads the daily and hourly bike-rental tables, filters them by date range
//! and computes the dashboard figures. The GUI and the chart export sit on top.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod stats;
