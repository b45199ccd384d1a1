use burn::{
    nn::{
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Initializer,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation,
};

use crate::ml::gru::{GruCell, GruCellConfig};
use crate::ml::policy::TeacherForcing;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct Seq2SeqConfig {
    pub src_vocab_size: usize,
    pub tgt_vocab_size: usize,
    pub embed_dim:      usize,
    pub enc_hidden:     usize,
    pub dec_hidden:     usize,
    pub attn_dim:       usize,
    pub dropout:        f64,
}

impl Seq2SeqConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Seq2SeqModel<B> {
        Seq2SeqModel {
            encoder: self.build_encoder(device),
            decoder: self.build_decoder(device),
        }
    }

    /// Every learned layer starts from small normal values so the
    /// recurrent gates begin near their linear regime.
    fn initializer(&self) -> Initializer {
        Initializer::Normal { mean: 0.0, std: 0.01 }
    }

    fn build_encoder<B: Backend>(&self, device: &B::Device) -> Encoder<B> {
        let embedding = EmbeddingConfig::new(self.src_vocab_size, self.embed_dim)
            .with_initializer(self.initializer())
            .init(device);
        let dropout       = DropoutConfig::new(self.dropout).init();
        let forward_cell  = GruCellConfig::new(self.embed_dim, self.enc_hidden).init(device);
        let backward_cell = GruCellConfig::new(self.embed_dim, self.enc_hidden).init(device);
        // Maps the concatenated final states of both directions
        // into the decoder's (differently sized) state space
        let state_bridge = LinearConfig::new(2 * self.enc_hidden, self.dec_hidden)
            .with_initializer(self.initializer())
            .init(device);
        Encoder {
            embedding, dropout, forward_cell, backward_cell, state_bridge,
            enc_hidden: self.enc_hidden,
        }
    }

    fn build_decoder<B: Backend>(&self, device: &B::Device) -> Decoder<B> {
        let embedding = EmbeddingConfig::new(self.tgt_vocab_size, self.embed_dim)
            .with_initializer(self.initializer())
            .init(device);
        let dropout   = DropoutConfig::new(self.dropout).init();
        let attention = self.build_attention(device);
        // Recurrent input is [token embedding ++ attention-weighted context]
        let cell = GruCellConfig::new(self.embed_dim + 2 * self.enc_hidden, self.dec_hidden)
            .init(device);
        // Logit projection sees recurrent output, context and embedding
        let out = LinearConfig::new(
            self.dec_hidden + 2 * self.enc_hidden + self.embed_dim,
            self.tgt_vocab_size,
        )
        .with_initializer(self.initializer())
        .init(device);
        Decoder {
            embedding, dropout, attention, cell, out,
            tgt_vocab_size: self.tgt_vocab_size,
        }
    }

    fn build_attention<B: Backend>(&self, device: &B::Device) -> Attention<B> {
        let energy = LinearConfig::new(2 * self.enc_hidden + self.dec_hidden, self.attn_dim)
            .with_initializer(self.initializer())
            .init(device);
        Attention { energy }
    }
}

// ─── Encoder ──────────────────────────────────────────────────────────────────
/// Bidirectional GRU encoder.
/// Reads the source sequence in both directions and bridges the two
/// final states into the decoder's initial state.
#[derive(Module, Debug)]
pub struct Encoder<B: Backend> {
    pub embedding:     Embedding<B>,
    pub dropout:       Dropout,
    pub forward_cell:  GruCell<B>,
    pub backward_cell: GruCell<B>,
    pub state_bridge:  Linear<B>,
    pub enc_hidden:    usize,
}

impl<B: Backend> Encoder<B> {
    /// src: [src_time, batch] →
    ///   outputs [src_time, batch, 2 * enc_hidden] (for attention),
    ///   state   [batch, dec_hidden]               (initial decoder state)
    pub fn forward(&self, src: Tensor<B, 2, Int>) -> (Tensor<B, 3>, Tensor<B, 2>) {
        let [src_len, batch_size] = src.dims();

        // Embedding wants [batch, time]; dropout covers the whole
        // sequence in one call
        let embedded = self
            .dropout
            .forward(self.embedding.forward(src.swap_dims(0, 1))); // [batch, time, E]
        let [_, _, emb_dim] = embedded.dims();
        let device = embedded.device();

        let step = |t: usize| {
            embedded
                .clone()
                .slice([0..batch_size, t..t + 1, 0..emb_dim])
                .reshape([batch_size, emb_dim])
        };

        // ── Forward direction ─────────────────────────────────────────────────
        let mut fwd_states: Vec<Tensor<B, 2>> = Vec::with_capacity(src_len);
        let mut state = Tensor::zeros([batch_size, self.enc_hidden], &device);
        for t in 0..src_len {
            state = self.forward_cell.forward(step(t), state);
            fwd_states.push(state.clone());
        }
        let fwd_final = state;

        // ── Backward direction ────────────────────────────────────────────────
        // Scans right to left; reversed afterwards so index t lines up
        // with timestep t again
        let mut bwd_states: Vec<Tensor<B, 2>> = Vec::with_capacity(src_len);
        let mut state = Tensor::zeros([batch_size, self.enc_hidden], &device);
        for t in (0..src_len).rev() {
            state = self.backward_cell.forward(step(t), state);
            bwd_states.push(state.clone());
        }
        bwd_states.reverse();
        // The backward pass finishes at timestep 0
        let bwd_final = bwd_states[0].clone();

        // ── Stack per-timestep outputs ────────────────────────────────────────
        let steps: Vec<Tensor<B, 3>> = fwd_states
            .into_iter()
            .zip(bwd_states)
            .map(|(f, b)| Tensor::cat(vec![f, b], 1).unsqueeze::<3>())
            .collect();
        let outputs = Tensor::cat(steps, 0); // [src_time, batch, 2H]

        let state = self
            .state_bridge
            .forward(Tensor::cat(vec![fwd_final, bwd_final], 1))
            .tanh();

        (outputs, state)
    }
}

// ─── Attention ────────────────────────────────────────────────────────────────
/// Additive attention: scores every source position against the
/// current decoder state.
#[derive(Module, Debug)]
pub struct Attention<B: Backend> {
    /// Projects [decoder state ++ encoder output] to the energy space
    pub energy: Linear<B>,
}

impl<B: Backend> Attention<B> {
    /// state: [batch, dec_hidden], enc_outputs: [src_time, batch, 2H]
    /// → weights [batch, src_time], each row summing to 1
    pub fn forward(&self, state: Tensor<B, 2>, enc_outputs: Tensor<B, 3>) -> Tensor<B, 2> {
        let [src_len, batch_size, _] = enc_outputs.dims();

        let enc = enc_outputs.swap_dims(0, 1); // [batch, src_time, 2H]

        // Broadcast the decoder state over every source position
        let repeated = state.unsqueeze_dim::<3>(1).repeat(1, src_len); // [batch, src_time, H]

        let energy = self
            .energy
            .forward(Tensor::cat(vec![repeated, enc], 2))
            .tanh(); // [batch, src_time, attn_dim]

        // One scalar per source position, then normalize across
        // positions. Padding positions are not masked: they compete
        // for attention mass like any other position (a known
        // limitation of this model family, kept as-is).
        let scores = energy.sum_dim(2).reshape([batch_size, src_len]);
        activation::softmax(scores, 1)
    }
}

// ─── Decoder ──────────────────────────────────────────────────────────────────
/// Single-step attentional GRU decoder.
/// Invoked once per target timestep by the driver, never loops
/// internally.
#[derive(Module, Debug)]
pub struct Decoder<B: Backend> {
    pub embedding:      Embedding<B>,
    pub dropout:        Dropout,
    pub attention:      Attention<B>,
    pub cell:           GruCell<B>,
    pub out:            Linear<B>,
    pub tgt_vocab_size: usize,
}

impl<B: Backend> Decoder<B> {
    /// input: [batch] previous token, state: [batch, dec_hidden],
    /// enc_outputs: [src_time, batch, 2H]
    /// → (logits [batch, tgt_vocab], next state)
    pub fn forward(
        &self,
        input:       Tensor<B, 1, Int>,
        state:       Tensor<B, 2>,
        enc_outputs: Tensor<B, 3>,
    ) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let [_, batch_size, _] = enc_outputs.dims();

        // Embed the previous token: [batch] → [batch, 1] → [batch, E]
        let embedded = self
            .dropout
            .forward(self.embedding.forward(input.unsqueeze_dim::<2>(1)));
        let [_, _, emb_dim] = embedded.dims();
        let embedded = embedded.reshape([batch_size, emb_dim]);

        // Attention-weighted encoder context:
        // [batch, 1, src_time] x [batch, src_time, 2H] → [batch, 2H]
        let weights = self.attention.forward(state.clone(), enc_outputs.clone());
        let weighted = weights
            .unsqueeze_dim::<3>(1)
            .matmul(enc_outputs.swap_dims(0, 1));
        let [_, _, ctx_width] = weighted.dims();
        let weighted = weighted.reshape([batch_size, ctx_width]);

        // One recurrent step on [embedding ++ context]
        let rnn_input = Tensor::cat(vec![embedded.clone(), weighted.clone()], 1);
        let state = self.cell.forward(rnn_input, state);

        // Vocabulary logits from [recurrent output ++ context ++ embedding]
        let logits = self
            .out
            .forward(Tensor::cat(vec![state.clone(), weighted, embedded], 1));

        (logits, state)
    }
}

// ─── Seq2Seq driver ───────────────────────────────────────────────────────────
/// The full encoder-decoder model with its decoding loop.
#[derive(Module, Debug)]
pub struct Seq2SeqModel<B: Backend> {
    pub encoder: Encoder<B>,
    pub decoder: Decoder<B>,
}

impl<B: Backend> Seq2SeqModel<B> {
    /// Run the teacher-forced decoding loop over a whole batch.
    ///
    /// src: [src_time, batch], trg: [tgt_time, batch]
    /// → logits [tgt_time, batch, tgt_vocab]
    ///
    /// The row at timestep 0 stays all-zero: that position holds the
    /// start marker, which is fed to the decoder but never predicted.
    /// The loss path skips it for the same reason.
    pub fn forward(
        &self,
        src:    Tensor<B, 2, Int>,
        trg:    Tensor<B, 2, Int>,
        policy: &mut TeacherForcing,
    ) -> Tensor<B, 3> {
        let [trg_len, batch_size] = trg.dims();
        let vocab_size = self.decoder.tgt_vocab_size;
        let device = src.device();

        let (enc_outputs, mut state) = self.encoder.forward(src);

        let mut steps: Vec<Tensor<B, 3>> = Vec::with_capacity(trg_len);
        steps.push(Tensor::zeros([1, batch_size, vocab_size], &device));

        // First decoder input is the start-marker row of the target
        let mut input = trg
            .clone()
            .slice([0..1, 0..batch_size])
            .reshape([batch_size]);

        for t in 1..trg_len {
            let (logits, next_state) = self.decoder.forward(input, state, enc_outputs.clone());
            state = next_state;
            steps.push(logits.clone().unsqueeze::<3>());

            // Next input: ground truth with probability `ratio`,
            // otherwise the model's own greedy prediction. One draw
            // covers the whole batch at this timestep.
            let ground_truth = trg
                .clone()
                .slice([t..t + 1, 0..batch_size])
                .reshape([batch_size]);
            let prediction = logits.argmax(1).reshape([batch_size]);
            input = policy.choose(t, ground_truth, prediction);
        }

        Tensor::cat(steps, 0)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::policy::TeacherForcing;

    type TestBackend = burn::backend::NdArray;

    fn tiny_config() -> Seq2SeqConfig {
        // vocab sizes 12/10, embed 4, hidden 6/6, attention 3, no dropout
        Seq2SeqConfig::new(12, 10, 4, 6, 6, 3, 0.0)
    }

    #[test]
    fn test_encoder_output_shapes() {
        let device = Default::default();
        let model = tiny_config().init::<TestBackend>(&device);

        let src = Tensor::<TestBackend, 2, Int>::from_ints([[2, 2], [4, 5], [3, 3]], &device);
        let (outputs, state) = model.encoder.forward(src);

        assert_eq!(outputs.dims(), [3, 2, 12]); // 2 * enc_hidden
        assert_eq!(state.dims(), [2, 6]);
    }

    #[test]
    fn test_attention_rows_sum_to_one() {
        let device = Default::default();
        let model = tiny_config().init::<TestBackend>(&device);

        let src = Tensor::<TestBackend, 2, Int>::from_ints([[2], [4], [5], [3]], &device);
        let (outputs, state) = model.encoder.forward(src);

        let weights = model.decoder.attention.forward(state, outputs);
        assert_eq!(weights.dims(), [1, 4]);

        let total: f32 = weights.sum().into_scalar().elem();
        assert!((total - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_decoder_single_step_shapes() {
        let device = Default::default();
        let model = tiny_config().init::<TestBackend>(&device);

        let src = Tensor::<TestBackend, 2, Int>::from_ints([[2], [4], [3]], &device);
        let (outputs, state) = model.encoder.forward(src);

        let input = Tensor::<TestBackend, 1, Int>::from_ints([2], &device);
        let (logits, next) = model.decoder.forward(input, state, outputs);

        assert_eq!(logits.dims(), [1, 10]); // tgt vocab
        assert_eq!(next.dims(), [1, 6]);
    }

    #[test]
    fn test_driver_scores_every_step_except_the_first() {
        let device = Default::default();
        let model = tiny_config().init::<TestBackend>(&device);

        // one example: source time 3, target time 5
        let src = Tensor::<TestBackend, 2, Int>::from_ints([[2], [4], [3]], &device);
        let trg =
            Tensor::<TestBackend, 2, Int>::from_ints([[2], [5], [6], [7], [3]], &device);

        let mut policy = TeacherForcing::greedy();
        let logits = model.forward(src, trg, &mut policy);
        assert_eq!(logits.dims(), [5, 1, 10]);

        let step_mass: Vec<f32> = (0..5)
            .map(|t| {
                logits
                    .clone()
                    .slice([t..t + 1, 0..1, 0..10])
                    .abs()
                    .sum()
                    .into_scalar()
                    .elem()
            })
            .collect();

        // timestep 0 is the unscored start marker
        assert_eq!(step_mass[0], 0.0);
        for &mass in &step_mass[1..] {
            assert!(mass > 0.0);
        }
    }
}
