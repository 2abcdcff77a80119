use thiserror::Error;

#[derive(Error, Debug)]
pub enum CropError {
    #[error("Selection too small. Please select a larger area.")]
    SelectionTooSmall { width: f64, height: f64, min: u32 },

    #[error("Selection {x},{y} {width}x{height} lies outside the {image_width}x{image_height} image")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    #[error("Invalid display width: {0}")]
    InvalidScale(f64),

    #[error("Image payload is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type CropResult<T> = Result<T, CropError>;
