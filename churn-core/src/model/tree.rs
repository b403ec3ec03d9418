//! CART regression trees shared by the forest and boosting variants.
//!
//! Splits minimise squared error of a per-sample target. What a leaf stores
//! is decided by the caller: the forest stores the churn rate of the leaf,
//! boosting stores a Newton step.

use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Relative improvement a split must bring to be kept.
const MIN_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Number of features considered per split. `None` means all of them.
    pub max_features: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        /// Rows with `value <= threshold` go left.
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        value: f64,
        samples: usize,
    },
}

impl TreeNode {
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.leaves() + right.leaves(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    root: TreeNode,
}

impl RegressionTree {
    /// Grow a tree over the rows of `x` listed in `rows` (duplicates allowed,
    /// which is how bootstrap samples are passed in).
    pub fn fit<F>(
        x: ArrayView2<f64>,
        target: &[f64],
        rows: &[usize],
        config: TreeConfig,
        rng: &mut StdRng,
        leaf_value: &F,
    ) -> Self
    where
        F: Fn(&[usize]) -> f64,
    {
        let mut builder = Builder { x: x.view(), target, config, rng, leaf_value };
        let root = builder.grow(rows, 0);
        Self { root }
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split { feature, threshold, left, right } => {
                    node = if row[*feature] <= *threshold { &**left } else { &**right };
                }
            }
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Largest feature index referenced by any split.
    pub fn max_feature(&self) -> Option<usize> {
        fn walk(node: &TreeNode) -> Option<usize> {
            match node {
                TreeNode::Leaf { .. } => None,
                TreeNode::Split { feature, left, right, .. } => {
                    [Some(*feature), walk(left), walk(right)].into_iter().flatten().max()
                }
            }
        }
        walk(&self.root)
    }
}

struct Builder<'a, F> {
    x: ArrayView2<'a, f64>,
    target: &'a [f64],
    config: TreeConfig,
    rng: &'a mut StdRng,
    leaf_value: &'a F,
}

struct SplitChoice {
    feature: usize,
    threshold: f64,
    score: f64,
}

impl<F> Builder<'_, F>
where
    F: Fn(&[usize]) -> f64,
{
    fn leaf(&self, rows: &[usize]) -> TreeNode {
        TreeNode::Leaf {
            value: (self.leaf_value)(rows),
            samples: rows.len(),
        }
    }

    fn grow(&mut self, rows: &[usize], depth: usize) -> TreeNode {
        if depth >= self.config.max_depth
            || rows.len() < self.config.min_samples_split.max(2)
            || self.is_pure(rows)
        {
            return self.leaf(rows);
        }

        let Some(choice) = self.best_split(rows) else {
            return self.leaf(rows);
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .partition(|&&r| self.x[[r, choice.feature]] <= choice.threshold);

        if left_rows.is_empty() || right_rows.is_empty() {
            return self.leaf(rows);
        }

        let left = self.grow(&left_rows, depth + 1);
        let right = self.grow(&right_rows, depth + 1);

        TreeNode::Split {
            feature: choice.feature,
            threshold: choice.threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn is_pure(&self, rows: &[usize]) -> bool {
        let first = self.target[rows[0]];
        rows.iter().all(|&r| self.target[r] == first)
    }

    fn candidate_features(&mut self) -> Vec<usize> {
        let n_features = self.x.ncols();
        match self.config.max_features {
            Some(k) if k < n_features => {
                let mut chosen = rand::seq::index::sample(&mut *self.rng, n_features, k.max(1)).into_vec();
                chosen.sort_unstable();
                chosen
            }
            _ => (0..n_features).collect(),
        }
    }

    /// Best (feature, threshold) by squared-error reduction.
    fn best_split(&mut self, rows: &[usize]) -> Option<SplitChoice> {
        let n = rows.len() as f64;
        let total: f64 = rows.iter().map(|&r| self.target[r]).sum();
        let parent_score = total * total / n;

        let mut best: Option<SplitChoice> = None;
        let mut sorted = rows.to_vec();

        for feature in self.candidate_features() {
            sorted.sort_by(|&a, &b| self.x[[a, feature]].total_cmp(&self.x[[b, feature]]));

            let mut left_sum = 0.0;
            for i in 0..sorted.len() - 1 {
                left_sum += self.target[sorted[i]];

                let here = self.x[[sorted[i], feature]];
                let next = self.x[[sorted[i + 1], feature]];
                if here == next {
                    continue;
                }

                let left_n = (i + 1) as f64;
                let right_n = n - left_n;
                let right_sum = total - left_sum;
                let score = left_sum * left_sum / left_n + right_sum * right_sum / right_n;

                if best.as_ref().map_or(true, |b| score > b.score) {
                    best = Some(SplitChoice {
                        feature,
                        threshold: here + (next - here) / 2.0,
                        score,
                    });
                }
            }
        }

        best.filter(|b| b.score - parent_score > MIN_GAIN * parent_score.abs().max(1.0))
    }
}
