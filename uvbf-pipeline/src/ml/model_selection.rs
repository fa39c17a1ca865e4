//! Train/test splitting, cross-validation and grid search

use super::classifier::{ClassifierSpec, Model};
use ndarray::{ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;
use tracing::debug;
use uvbf_common::{Error, Result};

use super::metrics::mean_std;

/// Row indices of one split, each list ascending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Seeded stratified hold-out split
///
/// Each class contributes `round(count * test_ratio)` members to the test
/// side, drawn after shuffling that class with a generator seeded by `seed`.
/// The same labels and seed always give the same split.
pub fn stratified_split(labels: &[usize], test_ratio: f64, seed: u64) -> Result<SplitIndices> {
    if !(0.0..1.0).contains(&test_ratio) {
        return Err(Error::InvalidInput(format!(
            "test ratio must be in [0, 1), got {}",
            test_ratio
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();
    for (_, mut members) in group_by_class(labels) {
        members.shuffle(&mut rng);
        let n_test = ((members.len() as f64) * test_ratio).round() as usize;
        let n_test = n_test.min(members.len());
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    if train.is_empty() || test.is_empty() {
        return Err(Error::InsufficientData(format!(
            "{} labeled samples cannot be split into train and test sets at ratio {}",
            labels.len(),
            test_ratio
        )));
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(SplitIndices { train, test })
}

/// Stratified k-fold assignment
///
/// Members of each class (in index order) are dealt round-robin across the
/// folds, continuing the rotation from one class to the next so fold sizes
/// differ by at most one.
pub fn stratified_k_fold(labels: &[usize], k: usize) -> Result<Vec<SplitIndices>> {
    if k < 2 {
        return Err(Error::InvalidInput(format!(
            "cross-validation needs at least 2 folds, got {}",
            k
        )));
    }
    if labels.len() < k {
        return Err(Error::InsufficientData(format!(
            "{} samples cannot fill {} cross-validation folds",
            labels.len(),
            k
        )));
    }

    let mut fold_of = vec![0usize; labels.len()];
    let mut counter = 0usize;
    for (_, members) in group_by_class(labels) {
        for idx in members {
            fold_of[idx] = counter % k;
            counter += 1;
        }
    }

    Ok((0..k)
        .map(|fold| {
            let (test, train): (Vec<usize>, Vec<usize>) =
                (0..labels.len()).partition(|&idx| fold_of[idx] == fold);
            SplitIndices { train, test }
        })
        .collect())
}

/// Accuracy of `spec` on each stratified fold of `(x, y)`
pub fn cross_val_score(
    spec: &ClassifierSpec,
    x: ArrayView2<'_, f64>,
    y: &[usize],
    n_classes: usize,
    k: usize,
) -> Result<Vec<f64>> {
    stratified_k_fold(y, k)?
        .into_iter()
        .map(|fold| {
            let x_train = x.select(Axis(0), &fold.train);
            let x_test = x.select(Axis(0), &fold.test);
            let y_train = pick(y, &fold.train);
            let y_test = pick(y, &fold.test);

            let mut model = spec.build();
            model.fit(x_train.view(), &y_train, n_classes)?;
            Ok(model.score(x_test.view(), &y_test))
        })
        .collect()
}

/// Outcome of [`grid_search`]
#[derive(Debug, Clone)]
pub struct GridSearchResult {
    pub best: ClassifierSpec,
    pub best_score: f64,
    pub best_std: f64,
    /// Mean CV accuracy of every candidate, in candidate order
    pub scores: Vec<(ClassifierSpec, f64)>,
}

/// Pick the candidate with the best mean CV accuracy (earliest wins ties)
pub fn grid_search(
    candidates: &[ClassifierSpec],
    x: ArrayView2<'_, f64>,
    y: &[usize],
    n_classes: usize,
    k: usize,
) -> Result<GridSearchResult> {
    let mut best: Option<(ClassifierSpec, f64, f64)> = None;
    let mut scores = Vec::with_capacity(candidates.len());

    for spec in candidates {
        let folds = cross_val_score(spec, x, y, n_classes, k)?;
        let (mean, std) = mean_std(&folds);
        debug!(candidate = %spec, cv_mean = mean, cv_std = std, "Grid search candidate");
        scores.push((*spec, mean));
        if best.map_or(true, |(_, best_mean, _)| mean > best_mean) {
            best = Some((*spec, mean, std));
        }
    }

    let (best, best_score, best_std) = best.ok_or_else(|| {
        Error::InvalidInput("grid search needs at least one candidate".to_string())
    })?;
    Ok(GridSearchResult {
        best,
        best_score,
        best_std,
        scores,
    })
}

/// Labels at `indices`
pub fn pick(labels: &[usize], indices: &[usize]) -> Vec<usize> {
    indices.iter().map(|&idx| labels[idx]).collect()
}

fn group_by_class(labels: &[usize]) -> BTreeMap<usize, Vec<usize>> {
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, &label) in labels.iter().enumerate() {
        groups.entry(label).or_default().push(idx);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::fixtures::three_clusters;

    fn labels_80_15_5() -> Vec<usize> {
        let mut labels = vec![0; 80];
        labels.extend(vec![1; 15]);
        labels.extend(vec![2; 5]);
        labels
    }

    #[test]
    fn test_stratified_split_preserves_class_proportions() {
        // Given: 100 labels distributed {80, 15, 5}
        let labels = labels_80_15_5();

        // When: split 80/20 with seed 42
        let split = stratified_split(&labels, 0.2, 42).unwrap();

        // Then: test side holds {16, 3, 1}
        let test_labels = pick(&labels, &split.test);
        assert_eq!(test_labels.iter().filter(|&&l| l == 0).count(), 16);
        assert_eq!(test_labels.iter().filter(|&&l| l == 1).count(), 3);
        assert_eq!(test_labels.iter().filter(|&&l| l == 2).count(), 1);
        assert_eq!(split.train.len() + split.test.len(), 100);
    }

    #[test]
    fn test_stratified_split_is_reproducible() {
        let labels = labels_80_15_5();
        let first = stratified_split(&labels, 0.2, 42).unwrap();
        let second = stratified_split(&labels, 0.2, 42).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_split_sides_are_disjoint() {
        let labels = labels_80_15_5();
        let split = stratified_split(&labels, 0.2, 7).unwrap();
        assert!(split.test.iter().all(|idx| !split.train.contains(idx)));
    }

    #[test]
    fn test_split_too_small_is_insufficient_data() {
        assert!(matches!(
            stratified_split(&[0, 1], 0.2, 42),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn test_k_fold_requires_enough_samples() {
        assert!(matches!(
            stratified_k_fold(&[0, 1, 0], 5),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn test_k_fold_covers_every_sample_once() {
        let labels = labels_80_15_5();
        let folds = stratified_k_fold(&labels, 5).unwrap();
        let mut seen: Vec<usize> = folds.iter().flat_map(|f| f.test.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
        for fold in &folds {
            assert_eq!(fold.test.len(), 20);
            let minority = fold.test.iter().filter(|&&i| labels[i] == 2).count();
            assert_eq!(minority, 1);
        }
    }

    #[test]
    fn test_grid_search_picks_a_candidate_and_scores_all() {
        let (x, y) = three_clusters();
        let candidates = [
            ClassifierSpec::LogisticRegression { c: 0.1 },
            ClassifierSpec::LogisticRegression { c: 10.0 },
        ];
        let result = grid_search(&candidates, x.view(), &y, 3, 4).unwrap();
        assert_eq!(result.scores.len(), 2);
        assert!(candidates.contains(&result.best));
        assert!(result.scores.iter().all(|(_, s)| *s <= result.best_score));
    }

    #[test]
    fn test_cross_val_score_one_value_per_fold() {
        let (x, y) = three_clusters();
        let scores =
            cross_val_score(&ClassifierSpec::NearestNeighbors { k: 1 }, x.view(), &y, 3, 4)
                .unwrap();
        assert_eq!(scores.len(), 4);
        assert!(scores.iter().all(|&s| s == 1.0));
    }
}
