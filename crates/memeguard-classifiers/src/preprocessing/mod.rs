//! Input normalization for the image and text branches

pub mod image;
pub mod text;

pub use self::image::{decode_base64, decode_image, strip_data_uri, ImagePreprocessor, MEAN, STD};
pub use self::text::{clamp_token_ids, TextPreprocessor};
