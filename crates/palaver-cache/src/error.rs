use thiserror::Error;

use palaver_transport::GatewayError;

/// Errors produced by an attachment load.
///
/// Either class leaves the cache entry absent, so a later load attempt
/// starts fresh.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The download itself failed (any gateway error class).
    #[error("download failed: {0}")]
    Gateway(#[from] GatewayError),

    /// The bytes arrived but could not be decoded for display.
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
}

/// Errors turning raw bytes into a display-ready representation.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The payload claimed an image MIME type but did not decode as one.
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),

    /// The payload claimed a text MIME type but was not valid UTF-8.
    #[error("text is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}
