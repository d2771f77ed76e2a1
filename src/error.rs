use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("No landmarks detected for this frame")]
    NoDetection,

    #[error("Invalid contour: {reason}")]
    InvalidContour { reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid color {0:?}: expected #rrggbb")]
    InvalidColor(String),

    #[error("Frame source unavailable: {0}")]
    Device(String),
}

impl Error {
    pub(crate) fn invalid_contour(reason: impl Into<String>) -> Self {
        Error::InvalidContour {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
