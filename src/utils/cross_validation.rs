//! K-fold train/test partitioning of a country panel.
//!
//! The partition is the classic unshuffled k-fold: the row range is cut into
//! `folds` contiguous test blocks of near-equal size (the first `n % folds`
//! blocks get one extra row) and each fold trains on the complement of its
//! block.
//!
//! This is not a forward-chaining split. Every fold except the last trains
//! on rows that come after its test block, so forecasts are scored against
//! periods that precede the end of the training data. Downstream statistics
//! are defined against this partition; switching to a chronological scheme
//! changes every reported number.

use crate::core::Panel;
use crate::error::{ForecastError, Result};

/// One fold of a k-fold partition.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    /// Zero-based fold index.
    pub fold: usize,
    /// Rows outside the test block, in period order.
    pub train: Panel,
    /// Contiguous test block.
    pub test: Panel,
}

/// Row indices `(train, test)` for each fold of an unshuffled k-fold split.
pub fn kfold_indices(n: usize, folds: usize) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
    if folds < 2 {
        return Err(ForecastError::InvalidParameter(format!(
            "k-fold needs at least 2 folds, got {}",
            folds
        )));
    }
    if n < folds {
        return Err(ForecastError::InsufficientData {
            needed: folds,
            got: n,
        });
    }

    let base = n / folds;
    let extra = n % folds;

    let mut splits = Vec::with_capacity(folds);
    let mut start = 0;
    for fold in 0..folds {
        let size = base + usize::from(fold < extra);
        let end = start + size;
        let test: Vec<usize> = (start..end).collect();
        let train: Vec<usize> = (0..start).chain(end..n).collect();
        splits.push((train, test));
        start = end;
    }

    Ok(splits)
}

/// Partition a panel into `folds` train/test splits, ordered by fold index.
pub fn split(panel: &Panel, folds: usize) -> Result<Vec<TrainTestSplit>> {
    kfold_indices(panel.len(), folds)?
        .into_iter()
        .enumerate()
        .map(|(fold, (train_idx, test_idx))| {
            Ok(TrainTestSplit {
                fold,
                train: panel.take(&train_idx)?,
                test: panel.take(&test_idx)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_panel(n: usize) -> Panel {
        Panel::new(
            (0..n as i32).map(|i| 1960 + i).collect(),
            vec!["gdp".to_string()],
            vec![(0..n).map(|i| i as f64).collect()],
        )
        .unwrap()
    }

    #[test]
    fn fold_sizes_follow_kfold_convention() {
        let splits = kfold_indices(10, 4).unwrap();
        let sizes: Vec<usize> = splits.iter().map(|(_, test)| test.len()).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);
        assert_eq!(splits[0].1, vec![0, 1, 2]);
        assert_eq!(splits[3].1, vec![8, 9]);
    }

    #[test]
    fn train_is_complement_of_test() {
        for (train, test) in kfold_indices(11, 3).unwrap() {
            assert_eq!(train.len() + test.len(), 11);
            assert!(train.iter().all(|i| !test.contains(i)));
        }
    }

    #[test]
    fn early_folds_train_on_later_rows() {
        let splits = split(&make_panel(8), 4).unwrap();
        assert_eq!(splits[0].test.periods(), &[1960, 1961]);
        assert_eq!(splits[0].train.periods()[0], 1962);
        assert_eq!(splits[1].train.periods(), &[1960, 1961, 1964, 1965, 1966, 1967]);
    }

    #[test]
    fn split_orders_folds() {
        let splits = split(&make_panel(40), 4).unwrap();
        let folds: Vec<usize> = splits.iter().map(|s| s.fold).collect();
        assert_eq!(folds, vec![0, 1, 2, 3]);
        assert!(splits.iter().all(|s| s.test.len() == 10 && s.train.len() == 30));
    }

    #[test]
    fn rejects_single_fold() {
        assert!(matches!(
            kfold_indices(10, 1),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn rejects_more_folds_than_rows() {
        assert_eq!(
            kfold_indices(3, 4).unwrap_err(),
            ForecastError::InsufficientData { needed: 4, got: 3 }
        );
    }
}
