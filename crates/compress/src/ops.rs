//! Compression Operations

use crate::Compression;
use crate::error::{ErrorKind, Result};
#[cfg(feature = "brotli")]
use brotli::{CompressorWriter as BrotliEncoder, Decompressor as BrotliDecoder};
use exn::ResultExt;
use flate2::{
    Compression as FlateCompression,
    read::{GzDecoder, ZlibDecoder},
    write::{GzEncoder, ZlibEncoder},
};
use std::io::{Read, Write};
use tracing::instrument;
#[cfg(feature = "zstd")]
use zstd::stream::{read::Decoder as ZstdDecoder, write::Encoder as ZstdEncoder};

// A compressed representation is produced once per result and generation,
// then served to every client asking for that encoding. Spend the CPU.
const FLATE_LEVEL: FlateCompression = FlateCompression::best();
#[cfg(feature = "zstd")]
const ZSTD_LEVEL: i32 = 19;
#[cfg(feature = "brotli")]
const BROTLI_LEVEL: u32 = 11;
#[cfg(feature = "brotli")]
const BROTLI_BUFFER_SIZE: usize = 4096;
#[cfg(feature = "brotli")]
const BROTLI_LG_WINDOW_SIZE: u32 = 22;

impl Compression {
    /// Compress a byte slice in memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use mdq_compress::Compression;
    ///
    /// let data = b"<EntityDescriptor entityID=\"https://idp.example.org\"/>";
    /// let compressed = Compression::Gzip.compress(data).unwrap();
    /// assert_ne!(compressed.as_slice(), data.as_slice());
    /// ```
    pub fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.compress_into(input, &mut output)?;
        Ok(output)
    }

    /// Decompress a byte slice in memory.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mdq_compress::Compression;
    ///
    /// let original = b"Hello, world!";
    /// let compressed = Compression::Deflate.compress(original).unwrap();
    /// let decompressed = Compression::Deflate.decompress(&compressed).unwrap();
    /// assert_eq!(decompressed, original);
    /// ```
    pub fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.decompress_into(input, &mut output)?;
        Ok(output)
    }

    #[instrument(skip(input, output), fields(
        format = %self,
        input_size = input.len(),
        output_size
    ))]
    pub fn compress_into(&self, input: &[u8], output: &mut Vec<u8>) -> Result<usize> {
        let start = output.len();
        match self {
            Compression::None => output.extend_from_slice(input),
            #[cfg(feature = "brotli")]
            Compression::Brotli => {
                let mut encoder =
                    BrotliEncoder::new(&mut *output, BROTLI_BUFFER_SIZE, BROTLI_LEVEL, BROTLI_LG_WINDOW_SIZE);
                encoder.write_all(input).or_raise(|| ErrorKind::Encode)?;
                // The stream is only terminated when the encoder is dropped.
                drop(encoder);
            },
            Compression::Deflate => {
                let mut encoder = ZlibEncoder::new(&mut *output, FLATE_LEVEL);
                encoder.write_all(input).or_raise(|| ErrorKind::Encode)?;
                encoder.finish().or_raise(|| ErrorKind::Encode)?;
            },
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(&mut *output, FLATE_LEVEL);
                encoder.write_all(input).or_raise(|| ErrorKind::Encode)?;
                encoder.finish().or_raise(|| ErrorKind::Encode)?;
            },
            #[cfg(feature = "zstd")]
            Compression::Zstd => {
                let mut encoder = ZstdEncoder::new(&mut *output, ZSTD_LEVEL).or_raise(|| ErrorKind::Encode)?;
                encoder.write_all(input).or_raise(|| ErrorKind::Encode)?;
                encoder.finish().or_raise(|| ErrorKind::Encode)?;
            },
        }
        let size = output.len() - start;
        tracing::Span::current().record("output_size", size);
        Ok(size)
    }

    #[instrument(skip(input, output), fields(
        format = %self,
        input_size = input.len(),
        output_size
    ))]
    pub fn decompress_into(&self, input: &[u8], output: &mut Vec<u8>) -> Result<usize> {
        let size = match self {
            Compression::None => {
                output.extend_from_slice(input);
                input.len()
            },
            #[cfg(feature = "brotli")]
            Compression::Brotli => {
                let mut decoder = BrotliDecoder::new(input, BROTLI_BUFFER_SIZE);
                decoder.read_to_end(output).or_raise(|| ErrorKind::Decode)?
            },
            Compression::Deflate => {
                let mut decoder = ZlibDecoder::new(input);
                decoder.read_to_end(output).or_raise(|| ErrorKind::Decode)?
            },
            Compression::Gzip => {
                let mut decoder = GzDecoder::new(input);
                decoder.read_to_end(output).or_raise(|| ErrorKind::Decode)?
            },
            #[cfg(feature = "zstd")]
            Compression::Zstd => {
                let mut decoder = ZstdDecoder::new(input).or_raise(|| ErrorKind::Decode)?;
                decoder.read_to_end(output).or_raise(|| ErrorKind::Decode)?
            },
        };
        tracing::Span::current().record("output_size", size);
        Ok(size)
    }
}
