use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShadowError {
    #[error("Image loading error: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Block size must be odd and smaller than image dimensions")]
    InvalidBlockSize,

    #[error("Image too small for analysis (minimum: {0}x{0})")]
    ImageTooSmall(u32),

    #[error("Config serialization error: {0}")]
    ConfigSerialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ShadowError>;
