//! Model configuration structures

use memeguard_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Weights file of the trained multimodal checkpoint
pub const DEFAULT_WEIGHTS_PATH: &str = "Stack_LSTM_VGG_mul_model.pth";

/// Tokenizer the checkpoint was trained with
pub const DEFAULT_TOKENIZER_REPO: &str = "bert-base-uncased";

/// Configuration for loading the multimodal model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name reported in classification results
    #[serde(default = "default_name")]
    pub name: String,

    /// Pretrained weights
    #[serde(default)]
    pub weights: WeightsConfig,

    /// Where the tokenizer comes from
    #[serde(default)]
    pub tokenizer: TokenizerSource,

    /// Device to run on (cpu, cuda, metal)
    #[serde(default = "default_device")]
    pub device: String,

    /// Layer dimensions the weights were trained with
    #[serde(default)]
    pub architecture: ArchitectureConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            weights: WeightsConfig::default(),
            tokenizer: TokenizerSource::default(),
            device: default_device(),
            architecture: ArchitectureConfig::default(),
        }
    }
}

impl ModelConfig {
    /// Create a configuration for a local weights file
    pub fn from_local(path: impl Into<PathBuf>) -> Self {
        Self {
            weights: WeightsConfig {
                path: path.into(),
                format: WeightFormat::Auto,
            },
            ..Default::default()
        }
    }

    /// Use a local tokenizer.json
    pub fn with_tokenizer_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.tokenizer = TokenizerSource::Local { path: path.into() };
        self
    }

    /// Set device
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    /// Set architecture
    pub fn with_architecture(mut self, architecture: ArchitectureConfig) -> Self {
        self.architecture = architecture;
        self
    }
}

fn default_name() -> String {
    "lstm-vgg16-multimodal".to_string()
}

fn default_device() -> String {
    "cpu".to_string()
}

/// Weights file location and format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_weights_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub format: WeightFormat,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            path: default_weights_path(),
            format: WeightFormat::Auto,
        }
    }
}

fn default_weights_path() -> PathBuf {
    PathBuf::from(DEFAULT_WEIGHTS_PATH)
}

/// Serialized weight format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightFormat {
    /// Infer from the file extension
    #[default]
    Auto,
    /// PyTorch pickle (`torch.save(model.state_dict())`)
    PyTorch,
    /// SafeTensors
    SafeTensors,
}

impl WeightFormat {
    /// Resolve `Auto` from the file extension
    pub fn resolve(self, path: &Path) -> Result<Self> {
        if self != Self::Auto {
            return Ok(self);
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("safetensors") => Ok(Self::SafeTensors),
            Some("pth") | Some("pt") | Some("bin") => Ok(Self::PyTorch),
            _ => Err(Error::config(format!(
                "Cannot infer weight format from {}; set weights.format explicitly",
                path.display()
            ))),
        }
    }
}

/// Tokenizer source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TokenizerSource {
    /// Load a tokenizer.json from the local filesystem
    Local { path: PathBuf },

    /// Download tokenizer.json from HuggingFace Hub
    HuggingFace {
        repo: String,
        #[serde(default = "default_revision")]
        revision: String,
    },
}

impl Default for TokenizerSource {
    fn default() -> Self {
        Self::HuggingFace {
            repo: DEFAULT_TOKENIZER_REPO.to_string(),
            revision: default_revision(),
        }
    }
}

fn default_revision() -> String {
    "main".to_string()
}

/// Layer dimensions of the text branch, image branch and fusion head
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureConfig {
    /// Rows of the embedding table; token ids are clamped below this
    #[serde(default = "default_vocab_size")]
    pub vocab_size: usize,

    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,

    #[serde(default = "default_lstm_hidden_size")]
    pub lstm_hidden_size: usize,

    #[serde(default = "default_lstm_layers")]
    pub lstm_layers: usize,

    /// Fixed token sequence length
    #[serde(default = "default_max_seq_len")]
    pub max_seq_len: usize,

    /// Square input resolution of the image branch
    #[serde(default = "default_image_size")]
    pub image_size: usize,

    #[serde(default = "default_fusion_hidden_size")]
    pub fusion_hidden_size: usize,
}

impl Default for ArchitectureConfig {
    fn default() -> Self {
        Self {
            vocab_size: default_vocab_size(),
            embedding_dim: default_embedding_dim(),
            lstm_hidden_size: default_lstm_hidden_size(),
            lstm_layers: default_lstm_layers(),
            max_seq_len: default_max_seq_len(),
            image_size: default_image_size(),
            fusion_hidden_size: default_fusion_hidden_size(),
        }
    }
}

impl ArchitectureConfig {
    /// Check the dimensions describe a buildable network
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("vocab_size", self.vocab_size),
            ("embedding_dim", self.embedding_dim),
            ("lstm_hidden_size", self.lstm_hidden_size),
            ("lstm_layers", self.lstm_layers),
            ("max_seq_len", self.max_seq_len),
            ("fusion_hidden_size", self.fusion_hidden_size),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(Error::config(format!("architecture.{} must be positive", field)));
            }
        }

        // Five 2x2 max-pools each halve the resolution.
        if self.image_size == 0 || self.image_size % 32 != 0 {
            return Err(Error::config(format!(
                "architecture.image_size must be a positive multiple of 32, got {}",
                self.image_size
            )));
        }

        Ok(())
    }

    /// Largest token id the embedding table can look up
    pub fn max_token_id(&self) -> u32 {
        (self.vocab_size.saturating_sub(1)).min(u32::MAX as usize) as u32
    }

    /// Width of the text feature (forward and backward final states)
    pub fn text_feature_dim(&self) -> usize {
        2 * self.lstm_hidden_size
    }

    /// Width of the flattened VGG16 feature map
    pub fn image_feature_dim(&self) -> usize {
        let side = self.image_size / 32;
        512 * side * side
    }

    /// Input width of the first fusion layer
    pub fn fusion_input_dim(&self) -> usize {
        self.text_feature_dim() + self.image_feature_dim()
    }
}

fn default_vocab_size() -> usize {
    4410
}

fn default_embedding_dim() -> usize {
    100
}

fn default_lstm_hidden_size() -> usize {
    128
}

fn default_lstm_layers() -> usize {
    2
}

fn default_max_seq_len() -> usize {
    100
}

fn default_image_size() -> usize {
    224
}

fn default_fusion_hidden_size() -> usize {
    64
}
