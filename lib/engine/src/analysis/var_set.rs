use rdf_prepare_algebra::VariableId;

/// The scope bitset carried through the binding walk: one bit per variable
/// offset, set iff the variable has been bound on the current path.
///
/// Isolated branches of the walk (union arms, MINUS and SERVICE bodies)
/// clone the set and drop the clone on the way out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VarSet {
    words: Vec<u64>,
}

impl VarSet {
    pub fn new(width: usize) -> Self {
        Self {
            words: vec![0; width.div_ceil(64)],
        }
    }

    pub fn contains(&self, id: VariableId) -> bool {
        let index = id.index();
        self.words
            .get(index / 64)
            .is_some_and(|word| word & (1 << (index % 64)) != 0)
    }

    pub fn insert(&mut self, id: VariableId) {
        let index = id.index();
        if let Some(word) = self.words.get_mut(index / 64) {
            *word |= 1 << (index % 64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_beyond_first_word() {
        let mut set = VarSet::new(130);
        set.insert(VariableId(0));
        set.insert(VariableId(129));
        assert!(set.contains(VariableId(0)));
        assert!(!set.contains(VariableId(64)));
        assert!(set.contains(VariableId(129)));
    }
}
