use crate::tree::TreeNode;
use std::collections::HashMap;

/// Unit costs for the three edit operations, all configurable but equal
/// by default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditCosts {
    pub insert: f64,
    pub delete: f64,
    pub rename: f64,
}

impl Default for EditCosts {
    fn default() -> Self {
        Self {
            insert: 1.0,
            delete: 1.0,
            rename: 1.0,
        }
    }
}

/// Computes the Zhang-Shasha tree edit distance between two [`TreeNode`]
/// trees.
///
/// Mirrors the recursive formulation: at each pair of subtrees, the
/// minimum of (delete root of t1, insert root of t2, match/rename roots)
/// is taken, with forest alignment done via a boundary-accumulating DP
/// table. Each recursive call consumes at least one node from one of the
/// two forests, so the recursion terminates. Memoized by node identity
/// (pointer address) to cap the algorithm's working memory at
/// `O(n1 * n2)`.
pub struct ZhangShasha {
    costs: EditCosts,
    memo: HashMap<(usize, usize), f64>,
}

impl ZhangShasha {
    pub fn new(costs: EditCosts) -> Self {
        Self {
            costs,
            memo: HashMap::new(),
        }
    }

    pub fn distance(&mut self, t1: &TreeNode, t2: &TreeNode) -> f64 {
        self.memo.clear();
        self.tree_distance(t1, t2)
    }

    fn tree_cost(&self, tree: &TreeNode) -> f64 {
        tree.size() as f64
    }

    fn tree_distance(&mut self, t1: &TreeNode, t2: &TreeNode) -> f64 {
        let key = (t1 as *const TreeNode as usize, t2 as *const TreeNode as usize);
        if let Some(&d) = self.memo.get(&key) {
            return d;
        }

        // Case 1: delete t1's root, match its children as a forest against {t2}.
        let cost1 = self.costs.delete + self.forest_distance(&t1.children, std::slice::from_ref(t2));
        // Case 2: insert t2's root, match {t1} against t2's children.
        let cost2 = self.costs.insert + self.forest_distance(std::slice::from_ref(t1), &t2.children);
        // Case 3: match/rename the roots, recurse on children forests.
        let rename = if TreeNode::nodes_equal(t1, t2) {
            0.0
        } else {
            self.costs.rename
        };
        let cost3 = rename + self.forest_distance(&t1.children, &t2.children);

        let result = cost1.min(cost2).min(cost3);
        self.memo.insert(key, result);
        result
    }

    /// Standard forest-alignment DP: `dp[i][j]` is the edit distance
    /// between the first `i` trees of `forest1` and the first `j` trees
    /// of `forest2`. Boundary rows/columns accumulate pure
    /// insertion/deletion cost of whole subtrees.
    fn forest_distance(&mut self, forest1: &[TreeNode], forest2: &[TreeNode]) -> f64 {
        if forest1.is_empty() && forest2.is_empty() {
            return 0.0;
        }
        if forest1.is_empty() {
            return forest2.iter().map(|t| self.tree_cost(t)).sum::<f64>() * self.costs.insert;
        }
        if forest2.is_empty() {
            return forest1.iter().map(|t| self.tree_cost(t)).sum::<f64>() * self.costs.delete;
        }

        let m = forest1.len();
        let n = forest2.len();
        let mut dp = vec![vec![0.0f64; n + 1]; m + 1];

        for i in 1..=m {
            dp[i][0] = dp[i - 1][0] + self.tree_cost(&forest1[i - 1]) * self.costs.delete;
        }
        for j in 1..=n {
            dp[0][j] = dp[0][j - 1] + self.tree_cost(&forest2[j - 1]) * self.costs.insert;
        }

        for i in 1..=m {
            for j in 1..=n {
                let delete = dp[i - 1][j] + self.tree_cost(&forest1[i - 1]) * self.costs.delete;
                let insert = dp[i][j - 1] + self.tree_cost(&forest2[j - 1]) * self.costs.insert;
                let matched = dp[i - 1][j - 1] + self.tree_distance(&forest1[i - 1], &forest2[j - 1]);
                dp[i][j] = delete.min(insert).min(matched);
            }
        }

        dp[m][n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_trees_have_zero_distance() {
        let t = TreeNode::branch(
            "module",
            vec![TreeNode::leaf("stmt", "x"), TreeNode::leaf("stmt", "y")],
        );
        let mut zs = ZhangShasha::new(EditCosts::default());
        assert_eq!(zs.distance(&t, &t), 0.0);
    }

    #[test]
    fn single_leaf_rename_costs_one() {
        let t1 = TreeNode::leaf("identifier", "a");
        let t2 = TreeNode::leaf("identifier", "b");
        let mut zs = ZhangShasha::new(EditCosts::default());
        assert_eq!(zs.distance(&t1, &t2), 1.0);
    }

    #[test]
    fn appending_a_child_costs_its_subtree_size() {
        let t1 = TreeNode::branch("module", vec![TreeNode::leaf("stmt", "a")]);
        let t2 = TreeNode::branch(
            "module",
            vec![TreeNode::leaf("stmt", "a"), TreeNode::leaf("stmt", "b")],
        );
        let mut zs = ZhangShasha::new(EditCosts::default());
        assert_eq!(zs.distance(&t1, &t2), 1.0);
    }

    #[test]
    fn distance_is_symmetric_for_equal_insert_delete_cost() {
        let t1 = TreeNode::branch(
            "module",
            vec![TreeNode::leaf("stmt", "a"), TreeNode::leaf("stmt", "b")],
        );
        let t2 = TreeNode::branch("module", vec![TreeNode::leaf("stmt", "a")]);
        let mut zs1 = ZhangShasha::new(EditCosts::default());
        let mut zs2 = ZhangShasha::new(EditCosts::default());
        assert_eq!(zs1.distance(&t1, &t2), zs2.distance(&t2, &t1));
    }

    #[test]
    fn empty_vs_nonempty_tree_costs_full_size() {
        let empty = TreeNode::branch("module", vec![]);
        let full = TreeNode::branch(
            "module",
            vec![TreeNode::leaf("stmt", "a"), TreeNode::leaf("stmt", "b")],
        );
        let mut zs = ZhangShasha::new(EditCosts::default());
        // root match (free, same type+no value) + forest distance inserting 2 leaves.
        assert_eq!(zs.distance(&empty, &full), 2.0);
    }
}
