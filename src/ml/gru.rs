// ============================================================
// Layer 5 — GRU Cell
// ============================================================
// One step of a gated recurrent unit, built from two Linear
// projections. Burn ships a whole-sequence Gru module, but the
// decoder must advance a single timestep per call (its input at
// step t depends on what it produced at step t-1), so the cell
// is assembled here from primitives.
//
// Gate equations, per step:
//   r = σ(Wᵢʳ·x + Wₕʳ·h)          (reset)
//   z = σ(Wᵢᶻ·x + Wₕᶻ·h)          (update)
//   n = tanh(Wᵢⁿ·x + r ⊙ Wₕⁿ·h)   (candidate)
//   h' = (1 − z) ⊙ n + z ⊙ h
//
// Both projections emit all three gates at once ([batch, 3H]),
// which is one matmul per side instead of three.
//
// Reference: Cho et al. (2014) Learning Phrase Representations
//            Burn Book §3 (Building Blocks)

use burn::{
    nn::{Initializer, Linear, LinearConfig},
    prelude::*,
    tensor::activation,
};

#[derive(Config, Debug)]
pub struct GruCellConfig {
    /// Size of the input vectors fed to the cell
    pub d_input: usize,

    /// Size of the hidden state
    pub d_hidden: usize,

    /// Parameter initializer; small normal values keep the gates
    /// near their linear regime at the start of training
    #[config(default = "Initializer::Normal{mean: 0.0, std: 0.01}")]
    pub initializer: Initializer,
}

impl GruCellConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> GruCell<B> {
        let input_gates = LinearConfig::new(self.d_input, 3 * self.d_hidden)
            .with_initializer(self.initializer.clone())
            .init(device);
        let hidden_gates = LinearConfig::new(self.d_hidden, 3 * self.d_hidden)
            .with_initializer(self.initializer.clone())
            .init(device);
        GruCell {
            input_gates,
            hidden_gates,
            d_hidden: self.d_hidden,
        }
    }
}

/// Single-step GRU cell: [batch, d_input] × [batch, H] → [batch, H]
#[derive(Module, Debug)]
pub struct GruCell<B: Backend> {
    /// Input projection for all three gates — [d_input → 3H]
    pub input_gates: Linear<B>,

    /// Hidden-state projection for all three gates — [H → 3H]
    pub hidden_gates: Linear<B>,

    pub d_hidden: usize,
}

impl<B: Backend> GruCell<B> {
    /// Advance the recurrent state by one timestep.
    pub fn forward(&self, input: Tensor<B, 2>, state: Tensor<B, 2>) -> Tensor<B, 2> {
        let [batch_size, _] = input.dims();
        let h = self.d_hidden;

        // Project once, then slice out the three gate blocks
        let gi = self.input_gates.forward(input);          // [batch, 3H]
        let gh = self.hidden_gates.forward(state.clone()); // [batch, 3H]

        let i_r = gi.clone().slice([0..batch_size, 0..h]);
        let i_z = gi.clone().slice([0..batch_size, h..2 * h]);
        let i_n = gi.slice([0..batch_size, 2 * h..3 * h]);

        let h_r = gh.clone().slice([0..batch_size, 0..h]);
        let h_z = gh.clone().slice([0..batch_size, h..2 * h]);
        let h_n = gh.slice([0..batch_size, 2 * h..3 * h]);

        let reset     = activation::sigmoid(i_r + h_r);
        let update    = activation::sigmoid(i_z + h_z);
        let candidate = (i_n + reset * h_n).tanh();

        // h' = (1 - z) * n + z * h
        (update.ones_like() - update.clone()) * candidate + update * state
    }
}
