//! Shared application state

use memeguard_classifiers::{Classifier, OffensiveClassifier};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::info;

use crate::config::ServerConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    /// The classifier, immutable after startup
    pub classifier: Arc<dyn Classifier>,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: ServerConfig, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            config: Arc::new(config),
            classifier,
            metrics_handle: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }

    /// Load weights and tokenizer. Failure here is fatal for the process.
    pub fn load(config: ServerConfig) -> anyhow::Result<Self> {
        let classifier = OffensiveClassifier::load(&config.model)?;
        info!("Classifier '{}' ready", classifier.name());

        Ok(Self::new(config, Arc::new(classifier)))
    }
}
