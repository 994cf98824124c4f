//! Development-status classification and cohort construction.

use crate::data::dataset::Dataset;
use crate::error::Result;
use crate::tuning::{Cohort, CountryPanel};
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEVELOPED: &str = "Developed region";
const UNDEVELOPED: &str = "Undeveloped region";

/// How finely development-status labels are kept apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DevStatusLevel {
    /// Labels as given.
    All,
    /// "Developed region" versus everything else as "Undeveloped region".
    OnlyDevelopedAndUndeveloped,
    /// Regional suffixes removed, e.g. "Developing region: Africa" becomes "Developing region".
    MergedSubset,
    /// Only labels starting with "Developed region"; others are dropped.
    OnlyDeveloped,
}

impl DevStatusLevel {
    /// Map a raw label to its cohort label, or `None` if the country is excluded.
    pub fn normalize(self, label: &str) -> Option<String> {
        match self {
            DevStatusLevel::All => Some(label.to_string()),
            DevStatusLevel::MergedSubset => Some(strip_region_suffix(label).to_string()),
            DevStatusLevel::OnlyDevelopedAndUndeveloped => {
                let stripped = strip_region_suffix(label);
                if stripped.starts_with(DEVELOPED) {
                    Some(stripped.to_string())
                } else {
                    Some(UNDEVELOPED.to_string())
                }
            }
            DevStatusLevel::OnlyDeveloped => {
                label.starts_with(DEVELOPED).then(|| label.to_string())
            }
        }
    }
}

/// Drop a trailing region qualifier: when the second-to-last word ends in
/// a colon, the last word and the colon go.
pub fn strip_region_suffix(label: &str) -> &str {
    let words: Vec<&str> = label.split_whitespace().collect();
    if words.len() >= 2 && words[words.len() - 2].ends_with(':') {
        if let Some((head, _)) = label.trim_end().rsplit_once(' ') {
            return head.trim_end().trim_end_matches(':');
        }
    }
    label
}

/// Country code to development-status label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DevStatusTable {
    entries: Vec<(String, String)>,
}

impl DevStatusTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a country. A code already present keeps its first label.
    pub fn insert(&mut self, code: impl Into<String>, label: impl Into<String>) {
        let code = code.into();
        if self.get(&code).is_none() {
            self.entries.push((code, label.into()));
        }
    }

    /// Label of a country.
    pub fn get(&self, code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, label)| label.as_str())
    }

    /// Normalized (code, label) pairs in insertion order; excluded countries are skipped.
    pub fn normalized(&self, level: DevStatusLevel) -> Vec<(&str, String)> {
        self.entries
            .iter()
            .filter_map(|(code, label)| level.normalize(label).map(|l| (code.as_str(), l)))
            .collect()
    }
}

impl<C: Into<String>, L: Into<String>> FromIterator<(C, L)> for DevStatusTable {
    fn from_iter<I: IntoIterator<Item = (C, L)>>(iter: I) -> Self {
        let mut table = DevStatusTable::new();
        for (code, label) in iter {
            table.insert(code, label);
        }
        table
    }
}

/// Inner-join a dataset with the classification and group countries into cohorts.
///
/// Cohorts follow the first appearance of their label in `table`; countries
/// within a cohort follow their first appearance in `dataset`. Countries
/// missing from either side are left out, and labels with no remaining
/// country produce no cohort.
pub fn cohorts(
    dataset: &Dataset,
    table: &DevStatusTable,
    level: DevStatusLevel,
) -> Result<Vec<Cohort>> {
    let normalized = table.normalized(level);

    let mut labels: Vec<&str> = Vec::new();
    for (_, label) in &normalized {
        if !labels.contains(&label.as_str()) {
            labels.push(label);
        }
    }

    let codes = dataset.country_codes();
    let mut cohorts = Vec::with_capacity(labels.len());
    for label in labels {
        let countries = codes
            .iter()
            .filter(|code| {
                normalized
                    .iter()
                    .any(|(c, l)| *c == code.as_str() && l == label)
            })
            .map(|code| {
                Ok(CountryPanel {
                    code: code.clone(),
                    panel: dataset.country_panel(code)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if countries.is_empty() {
            debug!(status = label, "no countries with data");
            continue;
        }
        cohorts.push(Cohort {
            development_status: label.to_string(),
            countries,
        });
    }

    Ok(cohorts)
}
