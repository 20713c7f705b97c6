//! Content encodings for rendered query results.
//!
//! This crate wraps the compression libraries behind a unified
//! [`Compression`] enum whose variants correspond to HTTP content-coding
//! tokens, providing:
//!
//! - **Token parsing** from content-coding names ([`Compression::from_str`](std::str::FromStr))
//! - **In-memory** compression/decompression ([`Compression::compress`],
//!   [`Compression::decompress`])
//! - **Labels** for the `Content-Encoding` header ([`Compression::content_encoding`])
//!
//! Gzip and Deflate are always available. Brotli and Zstd are behind feature
//! flags.
//!
//! Results are compressed once and then served many times, so every format
//! uses its highest level.

mod construct;
pub mod error;
mod ops;
mod util;

use serde::{Deserialize, Serialize};

/// A supported content encoding.
///
/// Variants gated behind feature flags (`brotli`, `zstd`) are only available
/// when the corresponding feature is enabled. Defaults to
/// [`None`](Self::None) (the `identity` encoding).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Compression {
    /// Uncompressed (`identity`)
    #[default]
    None,
    /// Brotli compression (`br`)
    #[cfg(feature = "brotli")]
    Brotli,
    /// Zlib-wrapped deflate stream (`deflate`)
    Deflate,
    /// Gzip compression (`gzip`)
    Gzip,
    /// Zstd compression (`zstd`)
    #[cfg(feature = "zstd")]
    Zstd,
}
