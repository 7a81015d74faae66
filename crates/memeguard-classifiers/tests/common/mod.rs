//! Shared fixtures for classifier integration tests

#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD, Engine as _};
use candle_core::Device;
use candle_nn::VarBuilder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use memeguard_classifiers::{
    ArchitectureConfig, ImagePreprocessor, MultimodalModel, OffensiveClassifier, TextPreprocessor,
};
use std::io::Cursor;
use tokenizers::Tokenizer;

/// WordLevel tokenizer with one id far beyond the trained vocabulary
pub const TOKENIZER_JSON: &str = r#"{
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
        "vocab": {"[PAD]": 0, "[UNK]": 1, "hello": 2, "gray": 3, "meme": 4, "zebra": 30521},
        "unk_token": "[UNK]"
    }
}"#;

pub fn tokenizer() -> Tokenizer {
    Tokenizer::from_bytes(TOKENIZER_JSON.as_bytes()).expect("fixture tokenizer must parse")
}

/// Checkpoint dimensions with a small image and short sequences
pub fn small_arch() -> ArchitectureConfig {
    ArchitectureConfig {
        max_seq_len: 16,
        image_size: 32,
        ..Default::default()
    }
}

pub fn classifier_from(vb: VarBuilder, arch: &ArchitectureConfig) -> OffensiveClassifier {
    let device = Device::Cpu;
    let model = MultimodalModel::new(arch, vb).expect("model must build");
    let images = ImagePreprocessor::new(arch.image_size, device.clone());
    let texts = TextPreprocessor::new(tokenizer(), arch.max_seq_len, arch.max_token_id())
        .expect("tokenizer must accept fixed-length settings");
    OffensiveClassifier::new("test-model", model, images, texts, device)
}

fn encode_image(image: RgbImage, format: ImageFormat) -> String {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut buf, format)
        .expect("fixture image must encode");
    STANDARD.encode(buf.into_inner())
}

/// Base64 JPEG of a solid gray square
pub fn gray_jpeg_base64(side: u32) -> String {
    encode_image(RgbImage::from_pixel(side, side, Rgb([128, 128, 128])), ImageFormat::Jpeg)
}

/// Base64 PNG with a diagonal gradient
pub fn gradient_png_base64(side: u32) -> String {
    let image = RgbImage::from_fn(side, side, |x, y| {
        let v = ((x + y) * 255 / (2 * side.max(1))) as u8;
        Rgb([v, 255 - v, v / 2])
    });
    encode_image(image, ImageFormat::Png)
}
