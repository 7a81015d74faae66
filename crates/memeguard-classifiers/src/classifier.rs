//! Classifier trait and the multimodal offensive-content classifier

use candle_core::Device;
use memeguard_core::{Error, Label, Result};
use std::time::Instant;

use crate::model_config::ModelConfig;
use crate::model_loader::LoadedModel;
use crate::multimodal::MultimodalModel;
use crate::preprocessing::{ImagePreprocessor, TextPreprocessor};

/// Trait for all (image, text) classifiers.
///
/// Classification is synchronous and CPU-bound; async callers should run it
/// on a blocking thread.
pub trait Classifier: Send + Sync {
    /// Classify a base64 image payload together with its text
    fn classify(&self, image: &str, text: &str) -> Result<ClassificationResult>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Result of classification
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    /// Thresholded label
    pub label: Label,

    /// Sigmoid probability (0.0-1.0)
    pub score: f32,

    /// Model name
    pub model: Option<String>,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl ClassificationResult {
    /// Create a result whose label is derived from `score`
    pub fn from_score(score: f32) -> Self {
        Self {
            label: Label::from_score(score),
            score,
            model: None,
            latency_us: 0,
        }
    }
}

/// Decode, normalize, run the frozen network, threshold.
pub struct OffensiveClassifier {
    name: String,
    model: MultimodalModel,
    images: ImagePreprocessor,
    texts: TextPreprocessor,
    device: Device,
}

impl OffensiveClassifier {
    /// Assemble a classifier from an already-built network
    pub fn new(
        name: impl Into<String>,
        model: MultimodalModel,
        images: ImagePreprocessor,
        texts: TextPreprocessor,
        device: Device,
    ) -> Self {
        Self {
            name: name.into(),
            model,
            images,
            texts,
            device,
        }
    }

    /// Load weights and tokenizer described by `config`
    pub fn load(config: &ModelConfig) -> Result<Self> {
        Self::from_loaded(LoadedModel::load(config)?)
    }

    pub fn from_loaded(loaded: LoadedModel) -> Result<Self> {
        let arch = &loaded.metadata.architecture;
        let images = ImagePreprocessor::new(arch.image_size, loaded.device.clone());
        let texts = TextPreprocessor::new(loaded.tokenizer, arch.max_seq_len, arch.max_token_id())?;

        Ok(Self::new(
            loaded.metadata.name,
            loaded.model,
            images,
            texts,
            loaded.device,
        ))
    }

    /// Probability that the pair is offensive
    pub fn score(&self, image: &str, text: &str) -> Result<f32> {
        let image = self.images.preprocess_base64(image)?;
        let input_ids = self.texts.preprocess(text, &self.device)?;

        let probs = self
            .model
            .forward(&input_ids, &image)
            .and_then(|probs| probs.to_vec1::<f32>())
            .map_err(|e| Error::inference(format!("Model forward pass failed: {}", e)))?;

        match probs.as_slice() {
            [score] => Ok(*score),
            other => Err(Error::inference(format!(
                "Expected a single probability, got {} values",
                other.len()
            ))),
        }
    }
}

impl Classifier for OffensiveClassifier {
    fn classify(&self, image: &str, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();

        let score = self.score(image, text)?;
        let latency_us = start.elapsed().as_micros() as u64;

        tracing::debug!(score, latency_us, "classified pair");

        Ok(ClassificationResult {
            label: Label::from_score(score),
            score,
            model: Some(self.name.clone()),
            latency_us,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
