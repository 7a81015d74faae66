//! Model loading for the Candle-based multimodal classifier

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use hf_hub::{api::sync::Api, Repo, RepoType};
use memeguard_core::{Error, Result};
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

use crate::model_config::{ArchitectureConfig, ModelConfig, TokenizerSource, WeightFormat};
use crate::multimodal::MultimodalModel;

/// Device type for inference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    /// CPU inference (always available)
    Cpu,
    /// CUDA GPU inference (if available)
    Cuda(usize), // GPU index
    /// Metal (Apple Silicon)
    Metal(usize),
}

impl DeviceType {
    /// Parse `cpu`, `cuda`, `cuda:1`, `metal`, `mps`
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim().to_ascii_lowercase();
        let (kind, index) = match spec.split_once(':') {
            Some((kind, index)) => {
                let index = index
                    .parse::<usize>()
                    .map_err(|_| Error::config(format!("Invalid device index in '{}'", spec)))?;
                (kind.to_string(), index)
            }
            None => (spec.clone(), 0),
        };

        match kind.as_str() {
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda(index)),
            "metal" | "mps" => Ok(Self::Metal(index)),
            _ => Err(Error::config(format!("Unknown device '{}'", spec))),
        }
    }
}

/// Metadata describing what was loaded
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    /// Model name/identifier
    pub name: String,

    /// Resolved weights file
    pub weights_path: PathBuf,

    /// Resolved weight format
    pub format: WeightFormat,

    /// Layer dimensions
    pub architecture: ArchitectureConfig,
}

/// Multimodal network with its tokenizer, ready for inference
pub struct LoadedModel {
    pub model: MultimodalModel,
    pub tokenizer: Tokenizer,
    pub device: Device,
    pub metadata: ModelMetadata,
}

impl LoadedModel {
    /// Build the architecture and load pretrained weights into it.
    ///
    /// Any failure here (missing file, missing tensor, shape mismatch) means
    /// the process cannot serve.
    pub fn load(config: &ModelConfig) -> Result<Self> {
        config.architecture.validate()?;

        let weights_path = resolve_weights_path(&config.weights.path)?;
        let format = config.weights.format.resolve(&weights_path)?;
        let device = create_device(DeviceType::parse(&config.device)?)?;

        tracing::info!(
            "Loading model '{}' from {} ({:?}) on {:?}",
            config.name,
            weights_path.display(),
            format,
            device
        );

        let vb = load_var_builder(&weights_path, format, &device)?;
        let model = MultimodalModel::new(&config.architecture, vb).map_err(|e| {
            Error::model(format!(
                "Weights in {} do not match the architecture: {}",
                weights_path.display(),
                e
            ))
        })?;

        let tokenizer = load_tokenizer(&config.tokenizer)?;

        tracing::info!(
            "Model '{}' loaded (vocab {}, seq len {}, image {}x{})",
            config.name,
            config.architecture.vocab_size,
            config.architecture.max_seq_len,
            config.architecture.image_size,
            config.architecture.image_size
        );

        Ok(Self {
            model,
            tokenizer,
            device,
            metadata: ModelMetadata {
                name: config.name.clone(),
                weights_path,
                format,
                architecture: config.architecture.clone(),
            },
        })
    }
}

fn resolve_weights_path(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(Error::model(format!(
            "Model weights not found: {}",
            path.display()
        )));
    }
    Ok(path.to_path_buf())
}

/// Create Candle device from device type
pub fn create_device(device_type: DeviceType) -> Result<Device> {
    match device_type {
        DeviceType::Cpu => Ok(Device::Cpu),
        DeviceType::Cuda(idx) => Device::new_cuda(idx)
            .map_err(|e| Error::model(format!("Failed to create CUDA device: {}", e))),
        DeviceType::Metal(idx) => Device::new_metal(idx)
            .map_err(|e| Error::model(format!("Failed to create Metal device: {}", e))),
    }
}

fn load_var_builder(
    weights_path: &Path,
    format: WeightFormat,
    device: &Device,
) -> Result<VarBuilder<'static>> {
    match format {
        WeightFormat::PyTorch => VarBuilder::from_pth(weights_path, DType::F32, device)
            .map_err(|e| Error::model(format!("Failed to load PyTorch weights: {}", e))),
        // SAFETY: the file is mapped read-only and not modified while the
        // process serves.
        WeightFormat::SafeTensors => unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)
                .map_err(|e| Error::model(format!("Failed to load SafeTensors: {}", e)))
        },
        WeightFormat::Auto => Err(Error::internal("weight format was not resolved")),
    }
}

/// Load the tokenizer from a local file or the HuggingFace Hub
pub fn load_tokenizer(source: &TokenizerSource) -> Result<Tokenizer> {
    let path = match source {
        TokenizerSource::Local { path } => {
            if !path.exists() {
                return Err(Error::model(format!(
                    "Tokenizer file not found: {}",
                    path.display()
                )));
            }
            path.clone()
        }
        TokenizerSource::HuggingFace { repo, revision } => {
            tracing::info!("Fetching tokenizer from HuggingFace: {} @ {}", repo, revision);

            let api = Api::new()
                .map_err(|e| Error::model(format!("Failed to initialize HF API: {}", e)))?;
            let repo = api.repo(Repo::with_revision(
                repo.clone(),
                RepoType::Model,
                revision.clone(),
            ));

            repo.get("tokenizer.json")
                .map_err(|e| Error::model(format!("Failed to download tokenizer: {}", e)))?
        }
    };

    tracing::debug!("Loading tokenizer from {}", path.display());
    Tokenizer::from_file(&path)
        .map_err(|e| Error::model(format!("Failed to load tokenizer: {}", e)))
}
