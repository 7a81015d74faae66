//! Server configuration

use memeguard_classifiers::{ModelConfig, TokenizerSource, WeightsConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use crate::cli::Cli;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body, base64 images included
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Model, tokenizer and architecture
    #[serde(default)]
    pub model: ModelConfig,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            tracing::debug!("No config file at {}, using defaults", config_path);
            Self::default()
        };

        config.apply_overrides(cli);
        config.model.architecture.validate()?;

        Ok(config)
    }

    /// Apply CLI / environment overrides
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(listen) = &cli.listen {
            self.listen = listen.clone();
        }

        if let Some(port) = cli.port {
            self.port = port;
        }

        if let Some(weights) = &cli.weights {
            self.model.weights = WeightsConfig {
                path: weights.clone(),
                ..self.model.weights.clone()
            };
        }

        if let Some(path) = &cli.tokenizer_file {
            self.model.tokenizer = TokenizerSource::Local { path: path.clone() };
        } else if let Some(repo) = &cli.tokenizer_repo {
            self.model.tokenizer = TokenizerSource::HuggingFace {
                repo: repo.clone(),
                revision: "main".to_string(),
            };
        }

        if let Some(device) = &cli.device {
            self.model.device = device.clone();
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.listen, self.port).parse()?)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            model: ModelConfig::default(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:5000");
        assert_eq!(config.model.architecture.vocab_size, 4410);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ServerConfig::load("/nonexistent/memeguard.yaml", &Cli::default()).unwrap();
        assert_eq!(config.port, 5000);
    }

    #[test]
    fn test_load_yaml_with_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
port: 8080
max_body_bytes: 1024
model:
  weights:
    path: "./models/model.safetensors"
  tokenizer:
    type: huggingface
    repo: "bert-base-uncased"
"#
        )
        .unwrap();

        let cli = Cli {
            port: Some(9000),
            weights: Some(PathBuf::from("/models/other.pth")),
            tokenizer_file: Some(PathBuf::from("/models/tokenizer.json")),
            ..Default::default()
        };

        let config = ServerConfig::load(file.path().to_str().unwrap(), &cli).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_body_bytes, 1024);
        assert_eq!(config.model.weights.path, PathBuf::from("/models/other.pth"));
        assert!(matches!(config.model.tokenizer, TokenizerSource::Local { .. }));
    }

    #[test]
    fn test_invalid_architecture_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "model:\n  architecture:\n    image_size: 100\n").unwrap();

        assert!(ServerConfig::load(file.path().to_str().unwrap(), &Cli::default()).is_err());
    }
}
