//! Decode fetched bytes into a display-ready representation.

use crate::error::DecodeError;

/// What the rendering layer needs beyond the raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedContent {
    /// A decodable image; dimensions are pre-computed so layout does not
    /// have to touch the bytes again.
    Image { width: u32, height: u32 },
    /// UTF-8 text content.
    Text(String),
    /// Anything else stays opaque and is offered as a download.
    Binary,
}

/// Decode `bytes` according to the attachment's MIME type.
///
/// A failed decode is a failed load: the caller must not cache the entry,
/// so a later attempt can retry with fresh bytes.
pub fn decode(mime_type: &str, bytes: &[u8]) -> Result<DecodedContent, DecodeError> {
    if mime_type.starts_with("image/") {
        let img = image::load_from_memory(bytes)?;
        Ok(DecodedContent::Image {
            width: img.width(),
            height: img.height(),
        })
    } else if mime_type.starts_with("text/") {
        let text = std::str::from_utf8(bytes)?;
        Ok(DecodedContent::Text(text.to_string()))
    } else {
        Ok(DecodedContent::Binary)
    }
}
