//! Base64 image payload -> normalized NCHW tensor

use base64::{engine::general_purpose::STANDARD, Engine as _};
use candle_core::{Device, Tensor};
use image::{imageops::FilterType, DynamicImage};
use memeguard_core::{Error, Result};

/// ImageNet normalization mean values
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// ImageNet normalization std values
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Strip an optional data-URI header (`data:image/png;base64,`).
///
/// Only the segment after the first comma is kept; a payload without a comma
/// is returned unchanged.
pub fn strip_data_uri(payload: &str) -> &str {
    match payload.split(',').nth(1) {
        Some(body) => body,
        None => payload,
    }
}

/// Decode a base64 image payload into raw bytes
pub fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    let body: String = strip_data_uri(payload)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = STANDARD
        .decode(body.as_bytes())
        .map_err(|e| Error::decode(format!("Invalid base64 image payload: {}", e)))?;

    if bytes.is_empty() {
        return Err(Error::decode("Image payload is empty"));
    }

    Ok(bytes)
}

/// Decode image bytes (any format the `image` crate recognizes) into RGB
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| Error::decode(format!("Failed to decode image: {}", e)))?;
    Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
}

/// Resizes and normalizes images for the VGG16 branch
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    size: u32,
    device: Device,
}

impl ImagePreprocessor {
    pub fn new(size: usize, device: Device) -> Self {
        Self {
            size: size as u32,
            device,
        }
    }

    /// Target square resolution
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Base64 payload -> `[1, 3, S, S]` f32 tensor
    pub fn preprocess_base64(&self, payload: &str) -> Result<Tensor> {
        let bytes = decode_base64(payload)?;
        let image = decode_image(&bytes)?;
        self.preprocess(&image)
    }

    /// Resize to `S x S`, scale to [0, 1], normalize per channel
    pub fn preprocess(&self, image: &DynamicImage) -> Result<Tensor> {
        let data = self.normalized_pixels(image);
        let side = self.size as usize;

        Tensor::from_vec(data, (1, 3, side, side), &self.device)
            .map_err(|e| Error::inference(format!("Failed to create image tensor: {}", e)))
    }

    /// Channel-major normalized pixel values
    pub fn normalized_pixels(&self, image: &DynamicImage) -> Vec<f32> {
        let resized = image
            .resize_exact(self.size, self.size, FilterType::Triangle)
            .to_rgb8();
        let plane = (self.size * self.size) as usize;

        let mut data = vec![0f32; 3 * plane];
        for (i, pixel) in resized.pixels().enumerate() {
            for c in 0..3 {
                data[c * plane + i] = (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
            }
        }
        data
    }
}
