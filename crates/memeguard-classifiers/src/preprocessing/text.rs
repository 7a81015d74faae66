//! Free text -> fixed-length, vocabulary-clamped token ids

use candle_core::{Device, Tensor};
use memeguard_core::{Error, Result};
use std::sync::Arc;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

const PAD_TOKEN: &str = "[PAD]";

/// Tokenizes text into exactly `max_len` ids no larger than `max_token_id`
#[derive(Clone)]
pub struct TextPreprocessor {
    tokenizer: Arc<Tokenizer>,
    max_len: usize,
    max_token_id: u32,
    pad_id: u32,
}

impl TextPreprocessor {
    /// Configure `tokenizer` for fixed-length encoding.
    pub fn new(mut tokenizer: Tokenizer, max_len: usize, max_token_id: u32) -> Result<Self> {
        let pad_id = tokenizer.token_to_id(PAD_TOKEN).unwrap_or(0);

        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::Fixed(max_len),
            pad_id,
            pad_token: PAD_TOKEN.to_string(),
            ..Default::default()
        }));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_len,
                ..Default::default()
            }))
            .map_err(|e| Error::config(format!("Invalid truncation settings: {}", e)))?;

        Ok(Self {
            tokenizer: Arc::new(tokenizer),
            max_len,
            max_token_id,
            pad_id,
        })
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn max_token_id(&self) -> u32 {
        self.max_token_id
    }

    /// Token ids, truncated or padded to `max_len`, then clamped
    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::inference(format!("Tokenization failed: {}", e)))?;

        let mut ids = encoding.get_ids().to_vec();
        ids.truncate(self.max_len);
        ids.resize(self.max_len, self.pad_id);

        Ok(clamp_token_ids(ids, self.max_token_id))
    }

    /// Text -> `[1, max_len]` u32 tensor
    pub fn preprocess(&self, text: &str, device: &Device) -> Result<Tensor> {
        let ids = self.encode(text)?;
        Tensor::from_vec(ids, (1, self.max_len), device)
            .map_err(|e| Error::inference(format!("Failed to create token tensor: {}", e)))
    }
}

/// Clamp every id to `max_token_id` so embedding lookups stay in range
pub fn clamp_token_ids(mut ids: Vec<u32>, max_token_id: u32) -> Vec<u32> {
    for id in ids.iter_mut() {
        *id = (*id).min(max_token_id);
    }
    ids
}
