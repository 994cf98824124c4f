//! Multi-country yearly records.

use crate::core::Panel;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// One (country, year) observation. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub country: String,
    pub year: i32,
    pub values: Vec<Option<f64>>,
}

/// Table of records sharing a set of named numeric columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    /// An empty table with the given columns.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    /// Append a record.
    pub fn push(
        &mut self,
        country: impl Into<String>,
        year: i32,
        values: Vec<Option<f64>>,
    ) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.columns.len(),
                got: values.len(),
            });
        }
        self.records.push(Record {
            country: country.into(),
            year,
            values,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ForecastError::MissingColumn(name.to_string()))
    }

    /// Keep only the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Dataset> {
        let indices = names
            .iter()
            .map(|name| self.column_index(name))
            .collect::<Result<Vec<_>>>()?;

        Ok(Dataset {
            columns: names.iter().map(|s| s.to_string()).collect(),
            records: self
                .records
                .iter()
                .map(|r| Record {
                    country: r.country.clone(),
                    year: r.year,
                    values: indices.iter().map(|&i| r.values[i]).collect(),
                })
                .collect(),
        })
    }

    /// Append `target` = `(x_t - x_{t-1}) / x_{t-1}` of `source`, per country.
    ///
    /// The previous value is the country's preceding record in table order.
    /// A country's first record, and any record whose previous value is
    /// missing or zero, gets a missing growth rate. A zero base therefore
    /// yields a row that [`Dataset::drop_missing`] removes, rather than an
    /// infinite rate.
    pub fn with_growth_rate(&self, source: &str, target: &str) -> Result<Dataset> {
        let index = self.column_index(source)?;
        if self.columns.iter().any(|c| c == target) {
            return Err(ForecastError::InvalidParameter(format!(
                "column '{}' already exists",
                target
            )));
        }

        let mut previous: Vec<(&str, Option<f64>)> = Vec::new();
        let mut records = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let current = record.values[index];
            let growth = match previous.iter().position(|(c, _)| *c == record.country) {
                Some(i) => {
                    let last = previous[i].1;
                    previous[i].1 = current;
                    match (last, current) {
                        (Some(prev), Some(cur)) if prev != 0.0 => Some((cur - prev) / prev),
                        _ => None,
                    }
                }
                None => {
                    previous.push((record.country.as_str(), current));
                    None
                }
            };

            let mut values = record.values.clone();
            values.push(growth);
            records.push(Record {
                country: record.country.clone(),
                year: record.year,
                values,
            });
        }

        let mut columns = self.columns.clone();
        columns.push(target.to_string());
        Ok(Dataset { columns, records })
    }

    /// Remove records with any missing value.
    pub fn drop_missing(&self) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            records: self
                .records
                .iter()
                .filter(|r| r.values.iter().all(|v| v.is_some_and(f64::is_finite)))
                .cloned()
                .collect(),
        }
    }

    /// Distinct country codes in order of first appearance.
    pub fn country_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = Vec::new();
        for record in &self.records {
            if !codes.contains(&record.country) {
                codes.push(record.country.clone());
            }
        }
        codes
    }

    /// Keep only records of the listed countries.
    pub fn filter_countries(&self, codes: &[String]) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            records: self
                .records
                .iter()
                .filter(|r| codes.contains(&r.country))
                .cloned()
                .collect(),
        }
    }

    /// One country's rows as a panel ordered by year.
    ///
    /// Fails with `EmptyData` for an unknown country, `TimestampError` on a
    /// duplicated year, and `InvalidParameter` if a value is missing.
    pub fn country_panel(&self, code: &str) -> Result<Panel> {
        let mut rows: Vec<&Record> = self.records.iter().filter(|r| r.country == code).collect();
        if rows.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        rows.sort_by_key(|r| r.year);

        let periods = rows.iter().map(|r| r.year).collect();
        let values = rows
            .iter()
            .map(|r| {
                r.values
                    .iter()
                    .map(|v| {
                        v.ok_or_else(|| {
                            ForecastError::InvalidParameter(format!(
                                "missing value for {} in {}",
                                code, r.year
                            ))
                        })
                    })
                    .collect::<Result<Vec<f64>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Panel::from_rows(periods, self.columns.clone(), values)
    }
}
