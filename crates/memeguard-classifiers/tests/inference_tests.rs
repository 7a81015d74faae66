//! End-to-end tests of decode -> normalize -> infer -> label

mod common;

use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use common::{classifier_from, gradient_png_base64, gray_jpeg_base64, small_arch};
use memeguard_classifiers::Classifier;
use memeguard_core::{Error, Label};

#[test]
fn test_zero_weights_score_half_is_offensive() {
    let arch = small_arch();
    let classifier = classifier_from(VarBuilder::zeros(DType::F32, &Device::Cpu), &arch);

    let result = classifier.classify(&gray_jpeg_base64(40), "hello").unwrap();
    assert_eq!(result.score, 0.5);
    assert_eq!(result.label, Label::Offensive);
    assert_eq!(result.model.as_deref(), Some("test-model"));
}

#[test]
fn test_gray_jpeg_scenario_yields_a_label() {
    let arch = small_arch();
    let varmap = VarMap::new();
    let classifier = classifier_from(
        VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu),
        &arch,
    );

    let result = classifier.classify(&gray_jpeg_base64(64), "hello").unwrap();
    assert!((0.0..=1.0).contains(&result.score));
    assert!(matches!(result.label, Label::Offensive | Label::NonOffensive));
}

#[test]
fn test_identical_pairs_get_identical_labels() {
    let arch = small_arch();
    let varmap = VarMap::new();
    let classifier = classifier_from(
        VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu),
        &arch,
    );
    let image = gradient_png_base64(48);

    let first = classifier.classify(&image, "hello gray meme").unwrap();
    let second = classifier.classify(&image, "hello gray meme").unwrap();
    assert_eq!(first.label, second.label);
    assert_eq!(first.score, second.score);
}

#[test]
fn test_out_of_vocabulary_token_is_clamped_not_rejected() {
    let arch = small_arch();
    let varmap = VarMap::new();
    let classifier = classifier_from(
        VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu),
        &arch,
    );

    // "zebra" maps to id 30521, far past the 4410-row embedding table.
    let result = classifier.classify(&gray_jpeg_base64(32), "zebra zebra hello");
    assert!(result.is_ok(), "clamped ids must not fail: {:?}", result.err());
}

#[test]
fn test_data_uri_prefix_is_accepted() {
    let arch = small_arch();
    let classifier = classifier_from(VarBuilder::zeros(DType::F32, &Device::Cpu), &arch);

    let payload = format!("data:image/jpeg;base64,{}", gray_jpeg_base64(32));
    assert!(classifier.classify(&payload, "hello").is_ok());
}

#[test]
fn test_malformed_base64_is_decode_error() {
    let arch = small_arch();
    let classifier = classifier_from(VarBuilder::zeros(DType::F32, &Device::Cpu), &arch);

    let err = classifier.classify("%%%not base64%%%", "hello").unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_valid_base64_non_image_is_decode_error() {
    let arch = small_arch();
    let classifier = classifier_from(VarBuilder::zeros(DType::F32, &Device::Cpu), &arch);

    // "hello world" in base64
    let err = classifier.classify("aGVsbG8gd29ybGQ=", "hello").unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}
