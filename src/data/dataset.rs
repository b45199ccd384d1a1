use crate::domain::sentence_pair::IndexedPair;

/// In-memory store of indexed sentence pairs.
/// Sequences keep their natural lengths here; bracketing and
/// padding happen per batch in the collator.
pub struct TranslationDataset {
    pairs: Vec<IndexedPair>,
}

impl TranslationDataset {
    pub fn new(pairs: Vec<IndexedPair>) -> Self {
        Self { pairs }
    }

    pub fn get(&self, index: usize) -> Option<IndexedPair> {
        self.pairs.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[IndexedPair] {
        &self.pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_pairs_by_index() {
        let ds = TranslationDataset::new(vec![
            IndexedPair::new(vec![4, 5], vec![6]),
            IndexedPair::new(vec![7], vec![8, 9]),
        ]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(1).unwrap().target_ids, vec![8, 9]);
        assert!(ds.get(2).is_none());
    }
}
