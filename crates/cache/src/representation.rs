use mdq_compress::Compression;

/// One encoded form of a rendered result: its bytes, an entity tag, and the
/// content encoding that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Representation {
    bytes: Vec<u8>,
    etag: String,
    compression: Compression,
}

impl Representation {
    /// Wrap already-encoded bytes. The entity tag is a quoted BLAKE3 hash of
    /// exactly these bytes, so each encoding has its own tag.
    pub fn new(bytes: Vec<u8>, compression: Compression) -> Self {
        let etag = format!("\"{}\"", blake3::hash(&bytes));
        Self {
            bytes,
            etag,
            compression,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Quoted strong entity tag, ready for an `ETag` header.
    pub fn etag(&self) -> &str {
        &self.etag
    }

    /// Value for `Content-Encoding`, or `None` for the identity encoding.
    pub fn content_encoding(&self) -> Option<&'static str> {
        self.compression.content_encoding()
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etag_is_quoted_content_hash() {
        let rep = Representation::new(b"abc".to_vec(), Compression::None);
        let etag = rep.etag();
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        // 32-byte hash as hex, plus quotes
        assert_eq!(etag.len(), 66);
        assert_eq!(rep.content_encoding(), None);
    }

    #[test]
    fn etag_follows_bytes() {
        let a = Representation::new(b"abc".to_vec(), Compression::None);
        let b = Representation::new(b"abc".to_vec(), Compression::Gzip);
        let c = Representation::new(b"abd".to_vec(), Compression::None);
        assert_eq!(a.etag(), b.etag());
        assert_ne!(a.etag(), c.etag());
        assert_eq!(b.content_encoding(), Some("gzip"));
    }
}
