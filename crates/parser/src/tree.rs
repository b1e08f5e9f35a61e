use serde::{Deserialize, Serialize};

/// Simplified AST node used as input to the Zhang-Shasha distance
/// computation. `value` is present only on leaves; internal nodes carry
/// only a `node_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub node_type: String,
    pub value: Option<String>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(node_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    pub fn branch(node_type: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            node_type: node_type.into(),
            value: None,
            children,
        }
    }

    /// `size(n) = 1 + Σ size(c)`.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }

    /// `depth(n) = 1 + max depth(c)`; a childless node has depth 1.
    pub fn depth(&self) -> usize {
        match self.children.iter().map(TreeNode::depth).max() {
            Some(d) => 1 + d,
            None => 1,
        }
    }

    /// Node equality: same `type`; for leaves, also same `value`. Non-leaf
    /// nodes compare equal on type alone.
    pub fn nodes_equal(a: &TreeNode, b: &TreeNode) -> bool {
        if a.node_type != b.node_type {
            return false;
        }
        if a.children.is_empty() && b.children.is_empty() {
            return a.value == b.value;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_counts_all_nodes() {
        let tree = TreeNode::branch(
            "module",
            vec![
                TreeNode::leaf("stmt", "a"),
                TreeNode::branch("block", vec![TreeNode::leaf("stmt", "b")]),
            ],
        );
        assert_eq!(tree.size(), 4);
    }

    #[test]
    fn depth_of_leaf_is_one() {
        assert_eq!(TreeNode::leaf("stmt", "a").depth(), 1);
    }

    #[test]
    fn depth_counts_longest_path() {
        let tree = TreeNode::branch(
            "module",
            vec![TreeNode::branch(
                "block",
                vec![TreeNode::leaf("stmt", "a")],
            )],
        );
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn nodes_equal_compares_value_only_on_leaves() {
        let l1 = TreeNode::leaf("identifier", "x");
        let l2 = TreeNode::leaf("identifier", "y");
        assert!(!TreeNode::nodes_equal(&l1, &l2));

        let b1 = TreeNode::branch("block", vec![TreeNode::leaf("stmt", "a")]);
        let b2 = TreeNode::branch("block", vec![TreeNode::leaf("stmt", "b")]);
        assert!(TreeNode::nodes_equal(&b1, &b2));
    }
}
