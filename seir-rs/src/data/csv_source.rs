use super::{DailyRecord, RegionSeries, RegionSource};
use crate::error::{Error, Result};
use log::*;
use serde::Deserialize;
use std::{collections::BTreeMap, io, path::Path};

#[derive(Debug, Deserialize)]
struct RegionRow {
    name: String,
    population: u64,
}

#[derive(Debug, Deserialize)]
struct SeriesRow {
    name: String,
    date: String,
    confirmed: u64,
    deaths: u64,
    recovered: Option<u64>,
    active: Option<u64>,
}

/// Flat file data source.
///
/// Reads two CSV tables: `name,population` with one row per region and
/// `name,date,confirmed,deaths,recovered,active` with the reported numbers.
/// Several rows for the same region and date (e.g. provinces of a country)
/// are added together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvRegionSource {
    populations: BTreeMap<String, u64>,
    records: BTreeMap<String, BTreeMap<String, DailyRecord>>,
}

impl CsvRegionSource {
    /// Load tables from files.
    pub fn from_paths(regions: impl AsRef<Path>, series: impl AsRef<Path>) -> Result<Self> {
        let regions = csv::Reader::from_path(regions)?;
        let series = csv::Reader::from_path(series)?;
        Self::from_csv(regions, series)
    }

    /// Load tables from arbitrary readers.
    pub fn from_readers(regions: impl io::Read, series: impl io::Read) -> Result<Self> {
        Self::from_csv(csv::Reader::from_reader(regions), csv::Reader::from_reader(series))
    }

    fn from_csv<R: io::Read, S: io::Read>(
        mut regions: csv::Reader<R>,
        mut series: csv::Reader<S>,
    ) -> Result<Self> {
        let mut source = CsvRegionSource::default();
        for res in regions.deserialize() {
            let row: RegionRow = res?;
            source.records.entry(row.name.clone()).or_default();
            source.populations.insert(row.name, row.population);
        }

        let mut skipped = 0usize;
        for res in series.deserialize() {
            let row: SeriesRow = res?;
            match source.records.get_mut(&row.name) {
                Some(days) => accumulate(days, row),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(target: "data", "skipped {} rows of regions without population", skipped);
        }
        debug!(target: "data", "loaded {} regions", source.populations.len());
        Ok(source)
    }
}

fn accumulate(days: &mut BTreeMap<String, DailyRecord>, row: SeriesRow) {
    let SeriesRow {
        date,
        confirmed,
        deaths,
        recovered,
        active,
        ..
    } = row;
    let record = days.entry(date.clone()).or_insert_with(|| DailyRecord {
        date,
        confirmed: 0,
        deaths: 0,
        recovered: None,
        active: None,
    });
    record.confirmed += confirmed;
    record.deaths += deaths;
    record.recovered = add_optional(record.recovered, recovered);
    record.active = add_optional(record.active, active);
}

fn add_optional(acc: Option<u64>, value: Option<u64>) -> Option<u64> {
    match (acc, value) {
        (Some(a), Some(b)) => Some(a + b),
        (a, b) => a.or(b),
    }
}

impl RegionSource for CsvRegionSource {
    fn list_regions(&self) -> Vec<String> {
        self.populations.keys().cloned().collect()
    }

    fn region_series(&self, name: &str) -> Result<RegionSeries> {
        let population = *self
            .populations
            .get(name)
            .ok_or_else(|| Error::UnknownRegion(name.to_string()))?;
        let series = self
            .records
            .get(name)
            .map(|days| days.values().cloned().collect())
            .unwrap_or_default();
        Ok(RegionSeries {
            name: name.to_string(),
            population,
            series,
        })
    }
}
