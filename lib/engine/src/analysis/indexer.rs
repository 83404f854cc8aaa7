use rdf_prepare_algebra::GraphPattern;

/// The result of enumerating the pattern tree.
///
/// `subtree[i]` is the inclusive post-order index range covered by the
/// subtree of the pattern with `gp_index = i`; because the enumeration is
/// post-order, every subtree occupies a contiguous range ending at its own
/// index. This is what gives "is the variable bound under this pattern?"
/// without parent pointers.
#[derive(Debug, Clone, Default)]
pub struct PatternIndex {
    subtree: Vec<(usize, usize)>,
}

impl PatternIndex {
    pub fn pattern_count(&self) -> usize {
        self.subtree.len()
    }

    pub fn subtree_range(&self, gp_index: usize) -> Option<(usize, usize)> {
        self.subtree.get(gp_index).copied()
    }
}

/// Assigns `gp_index = 0, 1, ...` in post-order to every pattern of the
/// tree.
///
/// Rerun-safe: every call renumbers from scratch, so the index array never
/// carries stale entries from an earlier shape of the tree. Patterns inside
/// `EXISTS` expressions are not part of the tree and stay unindexed.
pub(crate) fn enumerate_graph_patterns(root: Option<&mut GraphPattern>) -> PatternIndex {
    let mut index = PatternIndex::default();
    if let Some(root) = root {
        let mut next = 0;
        assign(root, &mut next, &mut index.subtree);
    }
    index
}

fn assign(node: &mut GraphPattern, next: &mut usize, subtree: &mut Vec<(usize, usize)>) {
    let start = *next;
    for child in &mut node.children {
        assign(child, next, subtree);
    }
    node.gp_index = Some(*next);
    subtree.push((start, *next));
    *next += 1;
}
