//! County-year economic measures
//!
//! The tabular side of the join: one row per (county, year) with population,
//! establishment, employment and payroll figures. Rows are keyed explicitly by
//! [`CountyId`] and year; a repeated key keeps its first row.

use crate::county::CountyId;
use crate::error::{FoodNetError, FoodNetResult};
use crate::weighting::Measure;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Measures of one county in one year; `None` marks a missing value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountyYear {
    pub county: CountyId,
    pub year: i32,
    /// Total population (`TOT_POP`)
    pub population: Option<f64>,
    /// Grocery establishments (`ESTAB`)
    pub establishments: Option<f64>,
    /// Employees (`EMP`)
    pub employment: Option<f64>,
    /// Annual payroll in $1,000 (`PAYANN`)
    pub payroll: Option<f64>,
    /// Land area in square kilometres (`ALAND`)
    pub land_area_km2: Option<f64>,
}

impl CountyYear {
    /// Value of `measure`, using `fallback_area` when the row has no land area.
    ///
    /// Returns `None` when an input is missing or non-finite, or when a
    /// density or per-capita denominator is not positive.
    pub fn value(&self, measure: Measure, fallback_area: Option<f64>) -> Option<f64> {
        let area = || {
            self.land_area_km2
                .or(fallback_area)
                .filter(|a| *a > 0.0 && a.is_finite())
        };
        let value = match measure {
            Measure::Population => self.population?,
            Measure::Establishments => self.establishments?,
            Measure::Employment => self.employment?,
            Measure::Payroll => self.payroll?,
            Measure::EstablishmentDensity => self.establishments? / area()?,
            Measure::EmploymentDensity => self.employment? / area()?,
            Measure::PayrollDensity => self.payroll? / area()?,
            Measure::EstablishmentsPerCapita => {
                let population = self.population.filter(|p| *p > 0.0)?;
                self.establishments? / population
            }
        };
        value.is_finite().then_some(value)
    }
}

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "STATE")]
    state: String,
    #[serde(rename = "COUNTY")]
    county: String,
    #[serde(rename = "YEAR")]
    year: String,
    #[serde(rename = "TOT_POP")]
    population: Option<f64>,
    #[serde(rename = "ESTAB")]
    establishments: Option<f64>,
    #[serde(rename = "EMP")]
    employment: Option<f64>,
    #[serde(rename = "PAYANN")]
    payroll: Option<f64>,
    #[serde(rename = "ALAND", default)]
    land_area_km2: Option<f64>,
}

/// All county-year rows of a run
#[derive(Debug, Clone, Default)]
pub struct MeasureTable {
    rows: FxHashMap<(CountyId, i32), CountyYear>,
    conflicts: Vec<(CountyId, i32)>,
}

impl MeasureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a CSV file with `STATE,COUNTY,YEAR,TOT_POP,ESTAB,EMP,PAYANN[,ALAND]` headers.
    pub fn from_csv_path(path: impl AsRef<Path>) -> FoodNetResult<Self> {
        let path = path.as_ref();
        let reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
        let table = Self::from_csv(reader, &path.display().to_string())?;
        info!(rows = table.len(), path = %path.display(), "Loaded county-year measures");
        Ok(table)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> FoodNetResult<Self> {
        let reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        Self::from_csv(reader, "measure table")
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>, source_name: &str) -> FoodNetResult<Self> {
        let mut table = Self::new();
        for (position, row) in reader.deserialize::<RawRow>().enumerate() {
            let row = row?;
            let county = CountyId::from_parts(&row.state, &row.county)
                .map_err(|e| FoodNetError::integrity(source_name, position, e))?;
            let year: i32 = row.year.parse().map_err(|_| {
                FoodNetError::integrity(source_name, position, format!("invalid YEAR {:?}", row.year))
            })?;

            table.insert(CountyYear {
                county,
                year,
                population: row.population,
                establishments: row.establishments,
                employment: row.employment,
                payroll: row.payroll,
                land_area_km2: row.land_area_km2,
            });
        }
        Ok(table)
    }

    /// Add a row; returns `false` and keeps the existing row when the key is taken.
    pub fn insert(&mut self, row: CountyYear) -> bool {
        let key = (row.county, row.year);
        if self.rows.contains_key(&key) {
            warn!(county = %row.county, year = row.year, "Duplicate county-year row, keeping first occurrence");
            self.conflicts.push(key);
            return false;
        }
        self.rows.insert(key, row);
        true
    }

    pub fn get(&self, county: CountyId, year: i32) -> Option<&CountyYear> {
        self.rows.get(&(county, year))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Years with at least one row, ascending
    pub fn years(&self) -> Vec<i32> {
        self.rows
            .keys()
            .map(|&(_, year)| year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Keys that were rejected as duplicates
    pub fn conflicts(&self) -> &[(CountyId, i32)] {
        &self.conflicts
    }
}
