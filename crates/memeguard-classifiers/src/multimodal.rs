//! Text branch + image branch joined by a small classifier head

use candle_core::{Module, Result, Tensor, D};
use candle_nn::{linear, ops::sigmoid, Linear, VarBuilder};

use crate::image_encoder::ImageEncoder;
use crate::model_config::ArchitectureConfig;
use crate::text_encoder::TextEncoder;

/// The multimodal offensive-content network.
///
/// Parameter prefixes follow the trained state dict: `text_branch.*`,
/// `image_branch.*` and `fc.{0,2}.*` (`fc.1` is the ReLU, `fc.3` the sigmoid).
pub struct MultimodalModel {
    text_branch: TextEncoder,
    image_branch: ImageEncoder,
    fc_hidden: Linear,
    fc_out: Linear,
}

impl MultimodalModel {
    pub fn new(arch: &ArchitectureConfig, vb: VarBuilder) -> Result<Self> {
        let text_branch = TextEncoder::new(
            arch.vocab_size,
            arch.embedding_dim,
            arch.lstm_hidden_size,
            arch.lstm_layers,
            vb.pp("text_branch"),
        )?;
        let image_branch = ImageEncoder::new(vb.pp("image_branch"))?;

        let fc = vb.pp("fc");
        let fc_hidden = linear(arch.fusion_input_dim(), arch.fusion_hidden_size, fc.pp("0"))?;
        let fc_out = linear(arch.fusion_hidden_size, 1, fc.pp("2"))?;

        Ok(Self {
            text_branch,
            image_branch,
            fc_hidden,
            fc_out,
        })
    }

    /// Probabilities `[batch]` for token ids `[batch, seq]` and images `[batch, 3, S, S]`.
    pub fn forward(&self, input_ids: &Tensor, images: &Tensor) -> Result<Tensor> {
        let text_features = self.text_branch.forward(input_ids)?;
        let image_features = self.image_branch.forward(images)?;

        let combined = Tensor::cat(&[text_features, image_features], D::Minus1)?;
        let hidden = self.fc_hidden.forward(&combined)?.relu()?;
        let logits = self.fc_out.forward(&hidden)?;

        sigmoid(&logits)?.squeeze(D::Minus1)
    }
}
