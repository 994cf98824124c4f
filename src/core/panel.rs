//! Single-country multivariate panel indexed by period.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// An ordered multivariate time series for one country.
///
/// Rows are periods (years for Penn World Table data), columns are named
/// variables. Periods are strictly increasing but need not be contiguous:
/// a k-fold training panel is the complement of a test block and may skip
/// a run of years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    periods: Vec<i32>,
    labels: Vec<String>,
    /// Values stored in column-major format: values[column][row]
    values: Vec<Vec<f64>>,
}

impl Panel {
    /// Create a panel from column-major values.
    pub fn new(periods: Vec<i32>, labels: Vec<String>, values: Vec<Vec<f64>>) -> Result<Self> {
        for i in 1..periods.len() {
            if periods[i] <= periods[i - 1] {
                return Err(ForecastError::TimestampError(format!(
                    "periods must be strictly increasing ({} follows {})",
                    periods[i],
                    periods[i - 1]
                )));
            }
        }

        if labels.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: values.len(),
                got: labels.len(),
            });
        }

        for column in &values {
            if column.len() != periods.len() {
                return Err(ForecastError::DimensionMismatch {
                    expected: periods.len(),
                    got: column.len(),
                });
            }
        }

        Ok(Self {
            periods,
            labels,
            values,
        })
    }

    /// Create a panel from row-major observations.
    pub fn from_rows(periods: Vec<i32>, labels: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if rows.len() != periods.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: periods.len(),
                got: rows.len(),
            });
        }

        let dims = labels.len();
        for row in &rows {
            if row.len() != dims {
                return Err(ForecastError::DimensionMismatch {
                    expected: dims,
                    got: row.len(),
                });
            }
        }

        let values = (0..dims)
            .map(|d| rows.iter().map(|row| row[d]).collect())
            .collect();

        Self::new(periods, labels, values)
    }

    /// Number of rows (periods).
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Check if the panel has no rows.
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Number of columns.
    pub fn dimensions(&self) -> usize {
        self.values.len()
    }

    /// Period of each row.
    pub fn periods(&self) -> &[i32] {
        &self.periods
    }

    /// Column names.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Position of a named column.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.labels
            .iter()
            .position(|label| label == name)
            .ok_or_else(|| ForecastError::MissingColumn(name.to_string()))
    }

    /// Values of a named column.
    pub fn column(&self, name: &str) -> Result<&[f64]> {
        let index = self.column_index(name)?;
        Ok(&self.values[index])
    }

    /// Values of a column by position.
    pub fn values(&self, dimension: usize) -> Result<&[f64]> {
        self.values
            .get(dimension)
            .map(|v| v.as_slice())
            .ok_or(ForecastError::IndexOutOfBounds {
                index: dimension,
                size: self.values.len(),
            })
    }

    /// All values organized by column.
    pub fn values_by_dimension(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// A row (observation at index across all columns).
    pub fn row(&self, index: usize) -> Result<Vec<f64>> {
        if index >= self.len() {
            return Err(ForecastError::IndexOutOfBounds {
                index,
                size: self.len(),
            });
        }
        Ok(self.values.iter().map(|column| column[index]).collect())
    }

    /// All rows in period order.
    pub fn rows(&self) -> Vec<Vec<f64>> {
        (0..self.len())
            .map(|i| self.values.iter().map(|column| column[i]).collect())
            .collect()
    }

    /// Rows at the given positions, which must be ascending.
    pub fn take(&self, indices: &[usize]) -> Result<Panel> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.len()) {
            return Err(ForecastError::IndexOutOfBounds {
                index: bad,
                size: self.len(),
            });
        }

        let periods = indices.iter().map(|&i| self.periods[i]).collect();
        let values = self
            .values
            .iter()
            .map(|column| indices.iter().map(|&i| column[i]).collect())
            .collect();

        Panel::new(periods, self.labels.clone(), values)
    }

    /// Extract rows `start..end`.
    pub fn slice(&self, start: usize, end: usize) -> Result<Panel> {
        if start > end {
            return Err(ForecastError::InvalidParameter(
                "start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(ForecastError::IndexOutOfBounds {
                index: end,
                size: self.len(),
            });
        }

        Ok(Panel {
            periods: self.periods[start..end].to_vec(),
            labels: self.labels.clone(),
            values: self
                .values
                .iter()
                .map(|column| column[start..end].to_vec())
                .collect(),
        })
    }

    /// The last `k` rows.
    pub fn tail(&self, k: usize) -> Result<Panel> {
        if k > self.len() {
            return Err(ForecastError::InsufficientData {
                needed: k,
                got: self.len(),
            });
        }
        self.slice(self.len() - k, self.len())
    }

    /// First-order difference of every column.
    ///
    /// Row `i` of the result is `row[i + 1] - row[i]` and carries the period of
    /// `row[i + 1]`; the undefined leading row is dropped.
    pub fn difference(&self) -> Panel {
        if self.is_empty() {
            return self.clone();
        }

        Panel {
            periods: self.periods[1..].to_vec(),
            labels: self.labels.clone(),
            values: self
                .values
                .iter()
                .map(|column| column.windows(2).map(|w| w[1] - w[0]).collect())
                .collect(),
        }
    }

    /// Panel without the named column.
    pub fn drop_column(&self, name: &str) -> Result<Panel> {
        let index = self.column_index(name)?;
        let mut labels = self.labels.clone();
        let mut values = self.values.clone();
        labels.remove(index);
        values.remove(index);
        Ok(Panel {
            periods: self.periods.clone(),
            labels,
            values,
        })
    }

    /// Panel restricted to the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Panel> {
        let mut values = Vec::with_capacity(names.len());
        for name in names {
            values.push(self.column(name)?.to_vec());
        }
        Ok(Panel {
            periods: self.periods.clone(),
            labels: names.iter().map(|n| n.to_string()).collect(),
            values,
        })
    }

    /// Check if any value is NaN or infinite.
    pub fn has_missing_values(&self) -> bool {
        self.values
            .iter()
            .any(|column| column.iter().any(|v| !v.is_finite()))
    }
}
