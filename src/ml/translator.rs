// ============================================================
// Layer 5 — Greedy Translator
// ============================================================
// Wraps a trained model with both vocabularies and decodes one
// sentence at a time: encode the bracketed source, then feed the
// decoder its own argmax prediction until it emits the end marker
// or hits the length cap.

use anyhow::Result;
use burn::prelude::*;

use crate::data::vocab::Vocabulary;
use crate::domain::traits::Translator;
use crate::ml::model::Seq2SeqModel;

pub struct GreedyTranslator<B: Backend> {
    model:     Seq2SeqModel<B>,
    src_vocab: Vocabulary,
    tgt_vocab: Vocabulary,
    max_len:   usize,
    device:    B::Device,
}

impl<B: Backend> GreedyTranslator<B> {
    pub fn new(
        model: Seq2SeqModel<B>,
        src_vocab: Vocabulary,
        tgt_vocab: Vocabulary,
        max_len: usize,
        device: B::Device,
    ) -> Self {
        Self { model, src_vocab, tgt_vocab, max_len, device }
    }
}

impl<B: Backend> Translator for GreedyTranslator<B> {
    fn translate(&self, source_tokens: &[String]) -> Result<Vec<String>> {
        // ── Encode the source ──
        let mut flat: Vec<i32> = Vec::with_capacity(source_tokens.len() + 2);
        flat.push(Vocabulary::BOS_INDEX as i32);
        flat.extend(self.src_vocab.encode(source_tokens).iter().map(|&i| i as i32));
        flat.push(Vocabulary::EOS_INDEX as i32);
        let src_len = flat.len();

        let source = Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([src_len, 1]);
        let (enc_outputs, mut state) = self.model.encoder.forward(source);

        // ── Decode greedily ──
        let mut output_ids: Vec<usize> = Vec::new();
        let mut input =
            Tensor::<B, 1, Int>::from_ints([Vocabulary::BOS_INDEX as i32], &self.device);

        for _ in 0..self.max_len {
            let (logits, next_state) =
                self.model.decoder.forward(input, state, enc_outputs.clone());
            state = next_state;

            let next_id = logits.argmax(1).into_scalar().elem::<i64>() as usize;
            if next_id == Vocabulary::EOS_INDEX {
                break;
            }
            output_ids.push(next_id);
            input = Tensor::<B, 1, Int>::from_ints([next_id as i32], &self.device);
        }

        tracing::debug!(
            "Decoded {} tokens from a {}-token source",
            output_ids.len(),
            source_tokens.len(),
        );

        Ok(output_ids
            .iter()
            .map(|&i| self.tgt_vocab.token_at(i).to_string())
            .collect())
    }
}
