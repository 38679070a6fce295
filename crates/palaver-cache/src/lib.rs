//! # palaver-cache
//!
//! The attachment cache: maps a file identity to its loaded binary content,
//! deduplicating concurrent loads so at most one download per file is ever
//! in flight (single-flight). Loaded bytes are decoded once into a
//! display-ready representation for the rendering layer.

pub mod cache;
pub mod decode;

mod error;

pub use cache::{wants_auto_load, AttachmentCache, LoadOutcome, LoadedAttachment};
pub use decode::DecodedContent;
pub use error::{CacheError, DecodeError};
