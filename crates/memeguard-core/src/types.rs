//! Core types for memeguard

use serde::{Deserialize, Serialize};
use std::fmt;

/// Probability at or above which a pair is labelled offensive.
pub const OFFENSIVE_THRESHOLD: f32 = 0.5;

/// Binary moderation label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "offensive")]
    Offensive,
    #[serde(rename = "non-offensive")]
    NonOffensive,
}

impl Label {
    /// Map a sigmoid probability onto a label.
    ///
    /// The comparison is inclusive: a score of exactly
    /// [`OFFENSIVE_THRESHOLD`] is offensive. NaN is never offensive.
    pub fn from_score(score: f32) -> Self {
        if score >= OFFENSIVE_THRESHOLD {
            Self::Offensive
        } else {
            Self::NonOffensive
        }
    }

    /// Wire representation of the label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offensive => "offensive",
            Self::NonOffensive => "non-offensive",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated (image, text) pair as submitted by a caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Base64 image payload, optionally prefixed with a data-URI header
    pub image: String,

    /// Free text accompanying the image
    pub text: String,
}

impl PredictRequest {
    /// Build a request from optional form fields.
    ///
    /// Absent and empty fields are both treated as missing.
    pub fn from_fields(image: Option<String>, text: Option<String>) -> crate::Result<Self> {
        match (non_empty(image), non_empty(text)) {
            (Some(image), Some(text)) => Ok(Self { image, text }),
            _ => Err(crate::Error::validation(
                "both image and text fields are required",
            )),
        }
    }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

/// Successful prediction body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: Label,
}

/// Error body returned for every failed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
