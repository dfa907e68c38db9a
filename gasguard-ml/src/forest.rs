//! Random forest of decision trees
//!
//! Each tree is fitted on a bootstrap sample of the training rows and
//! considers `sqrt(n_features)` randomly chosen features at every split.
//! The forest predicts by majority vote; probabilities are the mean of the
//! trees' leaf distributions.

use serde::{Deserialize, Serialize};

use crate::tree::{check_training_data, DecisionTree, TreeConfig};
use crate::{argmax, Classifier, MlError, MlResult, Rng};

/// Ensemble size and per-tree limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    /// `None` grows every tree until its leaves are pure
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Tree `i` is seeded with `seed + i + 1`
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

impl ForestConfig {
    pub fn with_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Bagged ensemble of CART trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    n_classes: usize,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_classes: 0,
        }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn is_trained(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Per-tree votes for one row
    fn votes(&self, row: &[f64]) -> MlResult<Vec<usize>> {
        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            votes[tree.predict(row)?] += 1;
        }
        Ok(votes)
    }
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, features: &[Vec<f64>], targets: &[usize], n_classes: usize) -> MlResult<()> {
        if self.config.n_trees == 0 {
            return Err(MlError::InvalidConfig("forest needs at least one tree"));
        }
        check_training_data(features, targets, n_classes)?;

        let n_rows = features.len();
        let n_features = features[0].len();
        let max_features = ((n_features as f64).sqrt() as usize).max(1);

        self.trees.clear();
        self.n_classes = n_classes;

        let mut rng = Rng::new(self.config.seed);
        for i in 0..self.config.n_trees {
            let bootstrap: Vec<usize> = (0..n_rows).map(|_| rng.next_range(n_rows)).collect();

            let tree_config = TreeConfig {
                max_depth: self.config.max_depth,
                min_samples_split: self.config.min_samples_split,
                max_features: Some(max_features),
                seed: self.config.seed.wrapping_add(i as u64 + 1),
            };

            let mut tree = DecisionTree::new(tree_config);
            tree.fit_indices(features, targets, n_classes, bootstrap)?;
            self.trees.push(tree);
        }

        log::info!(
            "forest fitted: {} trees, {} features per split, {} rows",
            self.trees.len(),
            max_features,
            n_rows
        );
        Ok(())
    }

    fn predict_proba(&self, row: &[f64]) -> MlResult<Vec<f64>> {
        if !self.is_trained() {
            return Err(MlError::NotTrained);
        }

        let mut sum = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in sum.iter_mut().zip(tree.predict_proba(row)?) {
                *acc += p;
            }
        }

        let n = self.trees.len() as f64;
        Ok(sum.into_iter().map(|s| s / n).collect())
    }

    fn predict(&self, row: &[f64]) -> MlResult<usize> {
        if !self.is_trained() {
            return Err(MlError::NotTrained);
        }

        let votes = self.votes(row)?;
        let votes: Vec<f64> = votes.into_iter().map(|v| v as f64).collect();
        Ok(argmax(&votes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two well separated clusters in three dimensions
    fn clusters() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut rng = Rng::new(9);
        let mut features = Vec::new();
        let mut targets = Vec::new();
        for i in 0..60 {
            let class = i % 2;
            let center = if class == 0 { 0.0 } else { 10.0 };
            features.push(vec![
                center + rng.next_f64(),
                center + rng.next_f64(),
                rng.next_f64() * 10.0,
            ]);
            targets.push(class);
        }
        (features, targets)
    }

    #[test]
    fn separates_clusters() {
        let (features, targets) = clusters();
        let mut forest = RandomForest::new(ForestConfig::default().with_trees(15));
        forest.fit(&features, &targets, 2).unwrap();

        assert_eq!(forest.trees().len(), 15);
        assert_eq!(forest.predict(&[0.5, 0.5, 5.0]).unwrap(), 0);
        assert_eq!(forest.predict(&[10.5, 10.5, 5.0]).unwrap(), 1);

        let proba = forest.predict_proba(&[10.5, 10.5, 5.0]).unwrap();
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(proba[1] > 0.5);
    }

    #[test]
    fn same_seed_same_forest() {
        let (features, targets) = clusters();
        let mut a = RandomForest::new(ForestConfig::default().with_trees(5).with_seed(7));
        let mut b = RandomForest::new(ForestConfig::default().with_trees(5).with_seed(7));
        a.fit(&features, &targets, 2).unwrap();
        b.fit(&features, &targets, 2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn trees_subsample_features() {
        let (features, targets) = clusters();
        let mut forest = RandomForest::new(ForestConfig::default().with_trees(3));
        forest.fit(&features, &targets, 2).unwrap();
        for tree in forest.trees() {
            assert_eq!(tree.config().max_features, Some(1));
        }
    }

    #[test]
    fn untrained_and_empty_config() {
        let forest = RandomForest::default();
        assert!(matches!(forest.predict(&[0.0]), Err(MlError::NotTrained)));

        let mut forest = RandomForest::new(ForestConfig::default().with_trees(0));
        assert!(forest.fit(&[vec![0.0]], &[0], 1).is_err());
    }
}
