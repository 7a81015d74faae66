//! Test fixtures for the HTTP surface
//!
//! A configurable mock classifier for exercising routing and error mapping,
//! plus a tiny real network for end-to-end requests.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use memeguard_classifiers::{
    ArchitectureConfig, ClassificationResult, Classifier, ImagePreprocessor, MultimodalModel,
    OffensiveClassifier, TextPreprocessor,
};
use memeguard_core::{Error, Result};
use memeguard_server::{create_router, AppState, ServerConfig};
use std::io::Cursor;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokenizers::Tokenizer;

/// A configurable mock classifier for testing
pub struct MockClassifier {
    score: f32,
    failure: Option<String>,
    call_count: AtomicU32,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self {
            score: 0.1,
            failure: None,
            call_count: AtomicU32::new(0),
        }
    }

    /// Set the probability this classifier will return
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// Fail every call with a decode error
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Get the number of times classify was called
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Classifier for MockClassifier {
    fn classify(&self, _image: &str, _text: &str) -> Result<ClassificationResult> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        match &self.failure {
            Some(message) => Err(Error::decode(message.clone())),
            None => Ok(ClassificationResult::from_score(self.score)),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

pub fn app_with(classifier: Arc<dyn Classifier>) -> Router {
    create_router(AppState::new(ServerConfig::default(), classifier))
}

pub fn form_request(pairs: &[(&str, &str)]) -> Request<Body> {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }

    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(serializer.finish()))
        .unwrap()
}

pub fn multipart_request(pairs: &[(&str, &str)]) -> Request<Body> {
    let boundary = "memeguard-test-boundary";
    let mut body = String::new();
    for (key, value) in pairs {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{key}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

const TOKENIZER_JSON: &str = r#"{
    "version": "1.0",
    "truncation": null,
    "padding": null,
    "added_tokens": [],
    "normalizer": {"type": "Lowercase"},
    "pre_tokenizer": {"type": "Whitespace"},
    "post_processor": null,
    "decoder": null,
    "model": {
        "type": "WordLevel",
        "vocab": {"[PAD]": 0, "[UNK]": 1, "hello": 2, "zebra": 30521},
        "unk_token": "[UNK]"
    }
}"#;

/// All-zero network: every pair scores exactly 0.5
pub fn zero_weight_classifier() -> OffensiveClassifier {
    let arch = ArchitectureConfig {
        max_seq_len: 16,
        image_size: 32,
        ..Default::default()
    };
    let device = Device::Cpu;
    let vb = VarBuilder::zeros(DType::F32, &device);

    let tokenizer = Tokenizer::from_bytes(TOKENIZER_JSON.as_bytes()).unwrap();
    let model = MultimodalModel::new(&arch, vb).unwrap();
    let images = ImagePreprocessor::new(arch.image_size, device.clone());
    let texts = TextPreprocessor::new(tokenizer, arch.max_seq_len, arch.max_token_id()).unwrap();

    OffensiveClassifier::new("zero", model, images, texts, device)
}

/// Base64 JPEG of a solid gray square
pub fn gray_jpeg_base64(side: u32) -> String {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::from_pixel(side, side, Rgb([128, 128, 128])))
        .write_to(&mut buf, ImageFormat::Jpeg)
        .unwrap();
    STANDARD.encode(buf.into_inner())
}
