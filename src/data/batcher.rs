// ============================================================
// Layer 4 — Translation Batcher
// ============================================================
// Converts a slice of IndexedPairs into model-ready tensors.
//
// What batching does here:
//   1. Bracket every sequence: <bos> tokens... <eos>
//      (an empty sentence becomes just [<bos>, <eos>])
//   2. Right-pad with <pad> to the longest bracketed sequence
//      of THIS batch (padding is local, batches are independent)
//   3. Stack into one Int tensor per language side
//
// Tensor layout is time-major: [time, batch]. Row t holds the
// t-th token of every sequence, which is the layout the
// encoder/decoder loops over. Source and target lengths are
// independent; only sequences within one side of one batch
// share a length.
//
// Reference: Rust Book §8 (Vectors)

use burn::tensor::{backend::Backend, Int, Tensor};

use crate::data::vocab::Vocabulary;
use crate::domain::sentence_pair::IndexedPair;

// ─── TranslationBatch ─────────────────────────────────────────────────────────
/// A batch of sentence pairs ready for the model forward pass.
///
/// B is the Burn Backend (e.g. NdArray, Wgpu) —
/// generic so the same batcher works on any device.
#[derive(Debug, Clone)]
pub struct TranslationBatch<B: Backend> {
    /// Source token indices — shape: [src_time, batch]
    /// Every column is one bracketed, padded source sentence
    pub source: Tensor<B, 2, Int>,

    /// Target token indices — shape: [tgt_time, batch]
    /// Every column is one bracketed, padded target sentence
    pub target: Tensor<B, 2, Int>,
}

// ─── TranslationBatcher ───────────────────────────────────────────────────────
/// The batcher struct — holds the target device and the special
/// indices it brackets and pads with, so no global state is
/// consulted during collation.
#[derive(Clone, Debug)]
pub struct TranslationBatcher<B: Backend> {
    /// The device to create tensors on
    pub device: B::Device,

    /// Filler index for positions past a sequence's end
    pub pad_index: usize,

    /// Start marker prepended to every sequence
    pub bos_index: usize,

    /// End marker appended to every sequence
    pub eos_index: usize,
}

impl<B: Backend> TranslationBatcher<B> {
    /// Create a batcher using the vocabulary's reserved indices.
    pub fn new(device: B::Device) -> Self {
        Self {
            device,
            pad_index: Vocabulary::PAD_INDEX,
            bos_index: Vocabulary::BOS_INDEX,
            eos_index: Vocabulary::EOS_INDEX,
        }
    }

    /// Convert a slice of IndexedPairs into a TranslationBatch.
    ///
    /// Every output sequence has length (longest raw sequence
    /// in the batch) + 2, from the start and end markers.
    pub fn batch(&self, items: &[IndexedPair]) -> TranslationBatch<B> {
        let src_len = items.iter().map(|p| p.source_len()).max().unwrap_or(0) + 2;
        let tgt_len = items.iter().map(|p| p.target_len()).max().unwrap_or(0) + 2;

        let src_rows: Vec<&[usize]> = items.iter().map(|p| p.source_ids.as_slice()).collect();
        let tgt_rows: Vec<&[usize]> = items.iter().map(|p| p.target_ids.as_slice()).collect();

        TranslationBatch {
            source: self.stack_rows(&src_rows, src_len),
            target: self.stack_rows(&tgt_rows, tgt_len),
        }
    }

    /// Bracket + pad each row to `padded_len`, flatten to one Vec<i32>,
    /// then build the [time, batch] tensor.
    ///
    /// Tensor::from_ints creates a 1D tensor from the flat slice,
    /// .reshape() restores [batch, time], and .swap_dims() flips it
    /// into the time-major layout the model consumes.
    fn stack_rows(&self, rows: &[&[usize]], padded_len: usize) -> Tensor<B, 2, Int> {
        let batch_size = rows.len();

        let mut flat: Vec<i32> = Vec::with_capacity(batch_size * padded_len);
        for ids in rows {
            let row_start = flat.len();
            flat.push(self.bos_index as i32);
            flat.extend(ids.iter().map(|&x| x as i32));
            flat.push(self.eos_index as i32);
            flat.resize(row_start + padded_len, self.pad_index as i32);
        }

        Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([batch_size, padded_len])
            .swap_dims(0, 1)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    fn batcher() -> TranslationBatcher<TestBackend> {
        TranslationBatcher::new(Default::default())
    }

    fn values(t: Tensor<TestBackend, 2, Int>) -> Vec<i64> {
        t.into_data().convert::<i64>().value
    }

    #[test]
    fn test_collated_length_is_batch_max_plus_two() {
        let items = vec![
            IndexedPair::new(vec![4, 5, 6], vec![4]),
            IndexedPair::new(vec![7], vec![5, 6, 7, 8]),
        ];
        let batch = batcher().batch(&items);

        // longest source is 3 tokens, longest target is 4 tokens
        assert_eq!(batch.source.dims(), [5, 2]);
        assert_eq!(batch.target.dims(), [6, 2]);
    }

    #[test]
    fn test_time_major_layout_and_pad_value() {
        let items = vec![
            IndexedPair::new(vec![4, 5, 6], vec![4]),
            IndexedPair::new(vec![7], vec![4]),
        ];
        let batch = batcher().batch(&items);

        // Bracketed rows: [2,4,5,6,3] and [2,7,3,1,1];
        // time-major flattening interleaves them column-wise.
        assert_eq!(
            values(batch.source),
            vec![2, 2, 4, 7, 5, 3, 6, 1, 3, 1]
        );
    }

    #[test]
    fn test_empty_sequence_becomes_bos_eos() {
        let items = vec![IndexedPair::new(vec![], vec![])];
        let batch = batcher().batch(&items);

        assert_eq!(batch.source.dims(), [2, 1]);
        assert_eq!(
            values(batch.source),
            vec![
                Vocabulary::BOS_INDEX as i64,
                Vocabulary::EOS_INDEX as i64
            ]
        );
    }

    #[test]
    fn test_padding_is_local_to_each_batch() {
        let b = batcher();
        let long = b.batch(&[IndexedPair::new(vec![4; 10], vec![4; 10])]);
        let short = b.batch(&[IndexedPair::new(vec![4], vec![4])]);

        assert_eq!(long.source.dims(), [12, 1]);
        assert_eq!(short.source.dims(), [3, 1]);
    }
}
