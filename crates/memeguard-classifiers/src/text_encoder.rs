//! Embedding + stacked bidirectional LSTM text branch

use candle_core::{Module, Result, Tensor, D};
use candle_nn::{embedding, ops::sigmoid, Embedding, Init, VarBuilder};

/// One direction of one LSTM layer, PyTorch parameter layout (gates i, f, g, o).
struct LstmDirection {
    w_ih_t: Tensor,
    w_hh_t: Tensor,
    bias: Tensor,
    hidden_size: usize,
    reverse: bool,
}

impl LstmDirection {
    fn new(
        in_dim: usize,
        hidden_size: usize,
        layer: usize,
        reverse: bool,
        vb: &VarBuilder,
    ) -> Result<Self> {
        let suffix = if reverse { "_reverse" } else { "" };
        let bound = 1.0 / (hidden_size as f64).sqrt();
        let init = Init::Uniform {
            lo: -bound,
            up: bound,
        };

        let w_ih = vb.get_with_hints(
            (4 * hidden_size, in_dim),
            &format!("weight_ih_l{layer}{suffix}"),
            init,
        )?;
        let w_hh = vb.get_with_hints(
            (4 * hidden_size, hidden_size),
            &format!("weight_hh_l{layer}{suffix}"),
            init,
        )?;
        let b_ih = vb.get_with_hints(4 * hidden_size, &format!("bias_ih_l{layer}{suffix}"), init)?;
        let b_hh = vb.get_with_hints(4 * hidden_size, &format!("bias_hh_l{layer}{suffix}"), init)?;

        Ok(Self {
            w_ih_t: w_ih.t()?.contiguous()?,
            w_hh_t: w_hh.t()?.contiguous()?,
            bias: (b_ih + b_hh)?,
            hidden_size,
            reverse,
        })
    }

    /// Run over `[batch, seq, in]`, returning per-step outputs `[batch, seq, hidden]`
    /// (in sequence order) and the final hidden state `[batch, hidden]`.
    fn run(&self, xs: &Tensor) -> Result<(Tensor, Tensor)> {
        let (batch, seq_len, in_dim) = xs.dims3()?;

        // Input projections for every step at once.
        let projected = xs
            .reshape((batch * seq_len, in_dim))?
            .matmul(&self.w_ih_t)?
            .broadcast_add(&self.bias)?
            .reshape((batch, seq_len, 4 * self.hidden_size))?;

        let mut h = Tensor::zeros((batch, self.hidden_size), xs.dtype(), xs.device())?;
        let mut c = h.clone();
        let mut outputs = vec![h.clone(); seq_len];

        let steps: Box<dyn Iterator<Item = usize>> = if self.reverse {
            Box::new((0..seq_len).rev())
        } else {
            Box::new(0..seq_len)
        };

        for t in steps {
            let gates = (projected.narrow(1, t, 1)?.squeeze(1)? + h.matmul(&self.w_hh_t)?)?;
            let gates = gates.chunk(4, D::Minus1)?;
            let input_gate = sigmoid(&gates[0])?;
            let forget_gate = sigmoid(&gates[1])?;
            let cell_gate = gates[2].tanh()?;
            let output_gate = sigmoid(&gates[3])?;

            c = ((forget_gate * &c)? + (input_gate * cell_gate)?)?;
            h = (output_gate * c.tanh()?)?;
            outputs[t] = h.clone();
        }

        Ok((Tensor::stack(&outputs, 1)?, h))
    }
}

struct LstmLayer {
    forward: LstmDirection,
    backward: LstmDirection,
}

/// Text branch: token ids `[batch, seq]` -> `[batch, 2 * hidden]`.
///
/// The feature is the last layer's forward and backward final hidden states,
/// i.e. `cat(h_n[-2], h_n[-1])` in PyTorch terms.
pub struct TextEncoder {
    embedding: Embedding,
    layers: Vec<LstmLayer>,
}

impl TextEncoder {
    pub fn new(
        vocab_size: usize,
        embedding_dim: usize,
        hidden_size: usize,
        num_layers: usize,
        vb: VarBuilder,
    ) -> Result<Self> {
        let embedding = embedding(vocab_size, embedding_dim, vb.pp("embedding"))?;

        let lstm_vb = vb.pp("lstm");
        let mut layers = Vec::with_capacity(num_layers);
        for layer in 0..num_layers {
            let in_dim = if layer == 0 {
                embedding_dim
            } else {
                2 * hidden_size
            };
            layers.push(LstmLayer {
                forward: LstmDirection::new(in_dim, hidden_size, layer, false, &lstm_vb)?,
                backward: LstmDirection::new(in_dim, hidden_size, layer, true, &lstm_vb)?,
            });
        }

        Ok(Self { embedding, layers })
    }
}

impl Module for TextEncoder {
    fn forward(&self, input_ids: &Tensor) -> Result<Tensor> {
        let mut xs = self.embedding.forward(input_ids)?;
        let mut last = None;

        for layer in &self.layers {
            let (fw_out, fw_h) = layer.forward.run(&xs)?;
            let (bw_out, bw_h) = layer.backward.run(&xs)?;
            xs = Tensor::cat(&[fw_out, bw_out], D::Minus1)?;
            last = Some((fw_h, bw_h));
        }

        match last {
            Some((fw_h, bw_h)) => Tensor::cat(&[fw_h, bw_h], D::Minus1),
            None => candle_core::bail!("text encoder has no LSTM layers"),
        }
    }
}
