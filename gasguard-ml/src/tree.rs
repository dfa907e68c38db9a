//! CART decision tree
//!
//! Trees are grown greedily: at every node the split with the lowest
//! weighted Gini impurity among the candidate features is chosen, until a
//! node is pure, too small to split, or at `max_depth`.
//!
//! Thresholds sit halfway between adjacent distinct feature values, and
//! rows with `value <= threshold` go left.

use serde::{Deserialize, Serialize};

use crate::node::{gini, Node};
use crate::{argmax, Classifier, MlError, MlResult, Rng};

/// Configuration for a decision tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth; `None` grows until leaves are pure
    pub max_depth: Option<usize>,
    /// Nodes with fewer rows become leaves
    pub min_samples_split: usize,
    /// Features considered per split; `None` considers all
    pub max_features: Option<usize>,
    /// Seed for feature subsampling
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
            seed: 42,
        }
    }
}

impl TreeConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> MlResult<()> {
        if self.min_samples_split < 2 {
            return Err(MlError::InvalidConfig("min_samples_split must be at least 2"));
        }
        if self.max_features == Some(0) {
            return Err(MlError::InvalidConfig("max_features must be positive"));
        }
        Ok(())
    }
}

/// Best split found for a node
struct Split {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// Classification tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    config: TreeConfig,
    nodes: Vec<Node>,
    n_features: usize,
    n_classes: usize,
}

impl DecisionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            n_features: 0,
            n_classes: 0,
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_trained(&self) -> bool {
        !self.nodes.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Longest root-to-leaf path, counted in edges
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match &nodes[index] {
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
                Node::Leaf { .. } => 0,
            }
        }

        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Fit on a subset of rows (used for bootstrap samples)
    pub(crate) fn fit_indices(
        &mut self,
        features: &[Vec<f64>],
        targets: &[usize],
        n_classes: usize,
        indices: Vec<usize>,
    ) -> MlResult<()> {
        self.config.validate()?;
        check_training_data(features, targets, n_classes)?;
        if indices.is_empty() {
            return Err(MlError::InsufficientData("no rows to fit"));
        }

        self.n_features = features[0].len();
        self.n_classes = n_classes;
        self.nodes.clear();

        let mut rng = Rng::new(self.config.seed);
        self.build(features, targets, indices, 0, &mut rng);

        log::debug!(
            "tree fitted: {} nodes, {} leaves, depth {}",
            self.nodes.len(),
            self.n_leaves(),
            self.depth()
        );
        Ok(())
    }

    /// Check a node table that did not come from `fit`
    ///
    /// Every child must come after its parent and inside the table, so a walk
    /// from the root always ends at a leaf. Split features must exist and leaves
    /// must carry one probability per class.
    pub fn validate(&self) -> MlResult<()> {
        let corrupt = |index: usize, what: &str| {
            Err(MlError::CorruptModel(format!("node {}: {}", index, what)))
        };

        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= self.n_features {
                        return corrupt(index, "split on a feature the tree does not have");
                    }
                    for &child in [left, right] {
                        if child <= index || child >= self.nodes.len() {
                            return corrupt(index, "child index out of order or out of range");
                        }
                    }
                }
                Node::Leaf { probabilities } => {
                    if probabilities.len() != self.n_classes {
                        return corrupt(index, "leaf class count differs from the tree's");
                    }
                }
            }
        }
        Ok(())
    }

    fn build(
        &mut self,
        features: &[Vec<f64>],
        targets: &[usize],
        indices: Vec<usize>,
        depth: usize,
        rng: &mut Rng,
    ) -> usize {
        let node_index = self.nodes.len();
        let counts = self.class_counts(targets, &indices);

        let at_max_depth = self.config.max_depth.map_or(false, |max| depth >= max);
        if at_max_depth || indices.len() < self.config.min_samples_split || gini(&counts) == 0.0 {
            self.nodes.push(Node::leaf(&counts));
            return node_index;
        }

        let split = match self.best_split(features, targets, &indices, rng) {
            Some(split) => split,
            None => {
                self.nodes.push(Node::leaf(&counts));
                return node_index;
            }
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| features[i][split.feature] <= split.threshold);

        // Reserve this slot; children are appended after it
        self.nodes.push(Node::leaf(&counts));

        let left = self.build(features, targets, left_rows, depth + 1, rng);
        let right = self.build(features, targets, right_rows, depth + 1, rng);

        self.nodes[node_index] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_index
    }

    fn class_counts(&self, targets: &[usize], indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &i in indices {
            counts[targets[i]] += 1;
        }
        counts
    }

    fn candidate_features(&self, rng: &mut Rng) -> Vec<usize> {
        let mut all: Vec<usize> = (0..self.n_features).collect();
        match self.config.max_features {
            Some(k) if k < self.n_features => {
                rng.shuffle(&mut all);
                all.truncate(k);
                all
            }
            _ => all,
        }
    }

    fn best_split(
        &self,
        features: &[Vec<f64>],
        targets: &[usize],
        indices: &[usize],
        rng: &mut Rng,
    ) -> Option<Split> {
        let n = indices.len() as f64;
        let mut best: Option<Split> = None;

        for feature in self.candidate_features(rng) {
            let mut column: Vec<(f64, usize)> = indices
                .iter()
                .map(|&i| (features[i][feature], targets[i]))
                .collect();
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left = vec![0usize; self.n_classes];
            let mut right = vec![0usize; self.n_classes];
            for &(_, class) in &column {
                right[class] += 1;
            }

            for pos in 1..column.len() {
                let (prev_value, prev_class) = column[pos - 1];
                left[prev_class] += 1;
                right[prev_class] -= 1;

                let value = column[pos].0;
                if prev_value >= value {
                    continue;
                }

                let n_left = pos as f64;
                let impurity = (n_left * gini(&left) + (n - n_left) * gini(&right)) / n;

                if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                    let mut threshold = prev_value + (value - prev_value) / 2.0;
                    if threshold >= value {
                        threshold = prev_value;
                    }
                    best = Some(Split {
                        feature,
                        threshold,
                        impurity,
                    });
                }
            }
        }

        best
    }

    fn leaf_for(&self, row: &[f64]) -> MlResult<&[f64]> {
        if !self.is_trained() {
            return Err(MlError::NotTrained);
        }
        if row.len() != self.n_features {
            return Err(MlError::FeatureMismatch {
                expected: self.n_features,
                actual: row.len(),
            });
        }

        let mut index = 0;
        loop {
            let node = self
                .nodes
                .get(index)
                .ok_or_else(|| MlError::CorruptModel(format!("node {} does not exist", index)))?;
            match node.next(row) {
                Some(child) => index = child,
                None => match node {
                    Node::Leaf { probabilities } => return Ok(probabilities.as_slice()),
                    Node::Split { .. } => return Err(MlError::NotTrained),
                },
            }
        }
    }
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new(TreeConfig::default())
    }
}

impl Classifier for DecisionTree {
    fn fit(&mut self, features: &[Vec<f64>], targets: &[usize], n_classes: usize) -> MlResult<()> {
        let indices = (0..features.len()).collect();
        self.fit_indices(features, targets, n_classes, indices)
    }

    fn predict_proba(&self, row: &[f64]) -> MlResult<Vec<f64>> {
        self.leaf_for(row).map(<[f64]>::to_vec)
    }

    fn predict(&self, row: &[f64]) -> MlResult<usize> {
        self.leaf_for(row).map(argmax)
    }
}

/// Shape checks shared by the tree and the forest
pub(crate) fn check_training_data(
    features: &[Vec<f64>],
    targets: &[usize],
    n_classes: usize,
) -> MlResult<()> {
    if features.is_empty() {
        return Err(MlError::InsufficientData("empty training set"));
    }
    if features.len() != targets.len() {
        return Err(MlError::InvalidConfig("features and targets differ in length"));
    }

    let n_features = features[0].len();
    if n_features == 0 {
        return Err(MlError::InsufficientData("rows have no features"));
    }
    if let Some(row) = features.iter().find(|r| r.len() != n_features) {
        return Err(MlError::FeatureMismatch {
            expected: n_features,
            actual: row.len(),
        });
    }
    if targets.iter().any(|&t| t >= n_classes) {
        return Err(MlError::InvalidConfig("target index out of range"));
    }
    Ok(())
}
