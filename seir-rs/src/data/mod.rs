//! Observed epidemic data to compare against simulated curves.
//!
//! The simulator never reads from here. Data sources only give callers a
//! uniform way to overlay reported cases and deaths on a simulation.
mod csv_source;
pub use csv_source::*;

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Reported totals for a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// ISO 8601 date (YYYY-MM-DD).
    pub date: String,
    pub confirmed: u64,
    pub deaths: u64,
    pub recovered: Option<u64>,
    pub active: Option<u64>,
}

/// Observed series for one region, ordered by date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSeries {
    pub name: String,
    pub population: u64,
    pub series: Vec<DailyRecord>,
}

/// A provider of historical data.
pub trait RegionSource {
    /// Names of all known regions in sorted order.
    fn list_regions(&self) -> Vec<String>;

    /// Time series of the given region.
    fn region_series(&self, name: &str) -> Result<RegionSeries>;
}
