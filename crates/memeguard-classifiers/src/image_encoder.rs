//! Frozen VGG16 convolutional feature extractor

use candle_core::{Module, Result, Tensor};
use candle_nn::{conv2d, Conv2d, Conv2dConfig, VarBuilder};

/// VGG16 layer plan: output channels of each 3x3 convolution, `None` for a
/// 2x2 max-pool.
const VGG16_PLAN: [Option<usize>; 18] = [
    Some(64),
    Some(64),
    None,
    Some(128),
    Some(128),
    None,
    Some(256),
    Some(256),
    Some(256),
    None,
    Some(512),
    Some(512),
    Some(512),
    None,
    Some(512),
    Some(512),
    Some(512),
    None,
];

enum Layer {
    Conv(Conv2d),
    MaxPool,
}

/// Image branch: `vgg16.features` followed by a flatten.
///
/// Convolution weights live under `features.{i}` where `i` is the position
/// in the torchvision `Sequential` (every conv is followed by a ReLU slot).
pub struct ImageEncoder {
    layers: Vec<Layer>,
}

impl ImageEncoder {
    pub fn new(vb: VarBuilder) -> Result<Self> {
        let vb = vb.pp("features");
        let cfg = Conv2dConfig {
            padding: 1,
            ..Default::default()
        };

        let mut layers = Vec::with_capacity(VGG16_PLAN.len());
        let mut in_channels = 3;
        let mut index = 0;
        for step in VGG16_PLAN {
            match step {
                Some(out_channels) => {
                    let conv = conv2d(in_channels, out_channels, 3, cfg, vb.pp(index.to_string()))?;
                    layers.push(Layer::Conv(conv));
                    in_channels = out_channels;
                    index += 2;
                }
                None => {
                    layers.push(Layer::MaxPool);
                    index += 1;
                }
            }
        }

        Ok(Self { layers })
    }
}

impl Module for ImageEncoder {
    /// `[batch, 3, S, S]` -> `[batch, 512 * (S / 32)^2]`
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let mut xs = xs.clone();
        for layer in &self.layers {
            xs = match layer {
                Layer::Conv(conv) => conv.forward(&xs)?.relu()?,
                Layer::MaxPool => xs.max_pool2d(2)?,
            };
        }
        xs.flatten_from(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn test_weight_names_follow_torchvision_indices() {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        ImageEncoder::new(vb).unwrap();

        let data = varmap.data().lock().unwrap();
        for index in [0, 2, 5, 7, 10, 12, 14, 17, 19, 21, 24, 26, 28] {
            assert!(data.contains_key(&format!("features.{}.weight", index)));
            assert!(data.contains_key(&format!("features.{}.bias", index)));
        }
        assert_eq!(data.len(), 26);
        assert_eq!(
            data["features.28.weight"].as_tensor().dims(),
            &[512, 512, 3, 3]
        );
    }

    #[test]
    fn test_feature_width() {
        let device = Device::Cpu;
        let encoder = ImageEncoder::new(VarBuilder::zeros(DType::F32, &device)).unwrap();
        let image = Tensor::zeros((1, 3, 64, 64), DType::F32, &device).unwrap();

        let features = encoder.forward(&image).unwrap();
        assert_eq!(features.dims(), &[1, 512 * 2 * 2]);
    }
}
