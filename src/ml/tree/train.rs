use rand::rngs::StdRng;
use rand::{SeedableRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use super::{DecisionTreeModel, TreeNode};

/// Growth limits for tree training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeOptions {
    /// Maximum depth in edges; `None` grows until leaves are pure.
    pub max_depth: Option<usize>,
    /// Minimum rows a node needs before it may split.
    pub min_samples_split: usize,
    /// Minimum rows each child of a split must keep.
    pub min_samples_leaf: usize,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            max_depth: Some(12),
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

/// Grow a Gini-impurity CART tree on binary labels.
///
/// Candidate features are visited in an order shuffled by `seed` at every
/// node and the first strictly-best split wins, so the seed only decides
/// between equally good splits.
pub fn train_decision_tree(
    x: &[Vec<f64>],
    y: &[bool],
    options: &TreeOptions,
    seed: u64,
) -> Result<DecisionTreeModel, String> {
    if x.len() != y.len() {
        return Err("Mismatched X/Y lengths".to_string());
    }
    if x.is_empty() {
        return Err("Empty training set".to_string());
    }
    let feature_len = x[0].len();
    if feature_len == 0 {
        return Err("Training rows have no features".to_string());
    }
    if x.iter().any(|row| row.len() != feature_len) {
        return Err("Inconsistent feature row length".to_string());
    }
    if x.iter().flatten().any(|v| !v.is_finite()) {
        return Err("Training features must be finite".to_string());
    }

    let mut grower = Grower {
        x,
        y,
        options,
        rng: StdRng::seed_from_u64(seed),
        feature_len,
        nodes: Vec::new(),
    };
    grower.grow((0..x.len()).collect());
    Ok(DecisionTreeModel {
        feature_len,
        nodes: grower.nodes,
    })
}

struct Grower<'a> {
    x: &'a [Vec<f64>],
    y: &'a [bool],
    options: &'a TreeOptions,
    rng: StdRng,
    feature_len: usize,
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    score: f64,
    feature_index: usize,
    threshold: f64,
}

/// Pending node: its rows, its depth, and the split slot that points at it.
struct Task {
    rows: Vec<usize>,
    depth: usize,
    parent: Option<(usize, Side)>,
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Left,
    Right,
}

impl Grower<'_> {
    /// Grow depth-first from an explicit stack; nodes land in preorder.
    fn grow(&mut self, rows: Vec<usize>) {
        let mut stack = vec![Task {
            rows,
            depth: 0,
            parent: None,
        }];
        while let Some(Task {
            rows,
            depth,
            parent,
        }) = stack.pop()
        {
            let idx = self.nodes.len();
            let n = rows.len();
            let positives = rows.iter().filter(|&&r| self.y[r]).count();
            self.nodes.push(TreeNode::Leaf {
                positive_fraction: positives as f64 / n as f64,
                samples: n,
            });
            if let Some((parent, side)) = parent {
                self.attach(parent, side, idx);
            }

            let depth_reached = self.options.max_depth.is_some_and(|max| depth >= max);
            let too_small = n < self.options.min_samples_split.max(2);
            let pure = positives == 0 || positives == n;
            if depth_reached || too_small || pure {
                continue;
            }
            let Some(split) = self.best_split(&rows) else {
                continue;
            };

            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                .into_iter()
                .partition(|&r| self.x[r][split.feature_index] <= split.threshold);
            // Child slots are filled in by `attach` when the children are popped.
            self.nodes[idx] = TreeNode::Split {
                feature_index: split.feature_index,
                threshold: split.threshold,
                left: idx,
                right: idx,
            };
            stack.push(Task {
                rows: right_rows,
                depth: depth + 1,
                parent: Some((idx, Side::Right)),
            });
            stack.push(Task {
                rows: left_rows,
                depth: depth + 1,
                parent: Some((idx, Side::Left)),
            });
        }
    }

    fn attach(&mut self, parent: usize, side: Side, child: usize) {
        if let Some(TreeNode::Split { left, right, .. }) = self.nodes.get_mut(parent) {
            match side {
                Side::Left => *left = child,
                Side::Right => *right = child,
            }
        }
    }

    fn best_split(&mut self, rows: &[usize]) -> Option<Candidate> {
        let mut order: Vec<usize> = (0..self.feature_len).collect();
        order.shuffle(&mut self.rng);

        let n = rows.len();
        let min_leaf = self.options.min_samples_leaf.max(1);
        let mut best: Option<Candidate> = None;
        let mut sorted = rows.to_vec();
        for feature_index in order {
            let x = self.x;
            sorted.sort_by(|&a, &b| x[a][feature_index].total_cmp(&x[b][feature_index]));

            let total_pos = sorted.iter().filter(|&&r| self.y[r]).count();
            let mut left_n = 0usize;
            let mut left_pos = 0usize;
            for k in 1..n {
                let prev = sorted[k - 1];
                left_n += 1;
                if self.y[prev] {
                    left_pos += 1;
                }
                let lo = x[prev][feature_index];
                let hi = x[sorted[k]][feature_index];
                if lo >= hi {
                    continue;
                }
                let right_n = n - left_n;
                if left_n < min_leaf || right_n < min_leaf {
                    continue;
                }
                let score = (left_n as f64 * gini(left_pos, left_n)
                    + right_n as f64 * gini(total_pos - left_pos, right_n))
                    / n as f64;
                if best.is_none_or(|b| score < b.score) {
                    best = Some(Candidate {
                        score,
                        feature_index,
                        threshold: midpoint(lo, hi),
                    });
                }
            }
        }
        best
    }
}

fn gini(positives: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = positives as f64 / n as f64;
    2.0 * p * (1.0 - p)
}

fn midpoint(lo: f64, hi: f64) -> f64 {
    let mid = lo + (hi - lo) / 2.0;
    if mid >= hi || !mid.is_finite() {
        lo
    } else {
        mid
    }
}
