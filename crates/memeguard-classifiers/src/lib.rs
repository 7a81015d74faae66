//! memeguard Classifiers
//!
//! Multimodal classification of (image, text) pairs as offensive or not.
//!
//! The pipeline has four stages:
//! - Model loading: build the LSTM + VGG16 network and load pretrained weights once
//! - Input normalization: base64 image -> normalized tensor, text -> clamped token ids
//! - Inference: a single forward pass producing a sigmoid probability
//! - Decision: threshold the probability at 0.5 into a label
//!
//! Everything runs through Candle on CPU by default.

pub mod classifier;
pub mod image_encoder;
pub mod model_config;
pub mod model_loader;
pub mod multimodal;
pub mod preprocessing;
pub mod text_encoder;

pub use classifier::{ClassificationResult, Classifier, OffensiveClassifier};
pub use model_config::{ArchitectureConfig, ModelConfig, TokenizerSource, WeightFormat, WeightsConfig};
pub use model_loader::{DeviceType, LoadedModel, ModelMetadata};
pub use multimodal::MultimodalModel;
pub use preprocessing::{ImagePreprocessor, TextPreprocessor};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{ClassificationResult, Classifier, OffensiveClassifier};
    pub use crate::model_config::{ArchitectureConfig, ModelConfig};
    pub use crate::model_loader::LoadedModel;
}
