use crate::error::{Error, ErrorKind, Result};
use crate::representation::Representation;
use exn::ResultExt;
use mdq_compress::Compression;
use mdq_library::Identifier;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// The rendered bytes of one record set, shared by every alias it was
/// published under until the generation moves on.
///
/// The canonical representation is built with the result; compressed
/// representations are produced the first time they are asked for and kept
/// for the lifetime of the result.
#[derive(Debug)]
pub struct Rendered {
    identifiers: Vec<Identifier>,
    generation: u64,
    canonical: Arc<Representation>,
    encoded: Mutex<HashMap<Compression, Arc<Representation>>>,
    encodings: Arc<[Compression]>,
}

impl Rendered {
    pub(crate) fn new(bytes: Vec<u8>, identifiers: Vec<Identifier>, generation: u64, encodings: Arc<[Compression]>) -> Self {
        Self {
            identifiers,
            generation,
            canonical: Arc::new(Representation::new(bytes, Compression::None)),
            encoded: Mutex::new(HashMap::new()),
            encodings,
        }
    }

    /// Every identifier that resolves to the rendered set.
    pub fn identifiers(&self) -> &[Identifier] {
        &self.identifiers
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The uncompressed bytes.
    pub fn canonical(&self) -> Arc<Representation> {
        Arc::clone(&self.canonical)
    }

    /// Get the representation in the requested encoding, compressing the
    /// canonical bytes on first use.
    ///
    /// Encodings the service was not configured to produce are rejected with
    /// [`ErrorKind::DisabledEncoding`] rather than falling back to identity.
    pub fn representation(&self, compression: Compression) -> Result<Arc<Representation>> {
        if compression.is_identity() {
            return Ok(self.canonical());
        }
        if !self.encodings.contains(&compression) {
            exn::bail!(ErrorKind::DisabledEncoding(compression.to_string()));
        }
        // Held across compression so concurrent first requests compress once.
        let mut encoded = self.encoded.lock();
        if let Some(existing) = encoded.get(&compression) {
            return Ok(Arc::clone(existing));
        }
        let bytes = compression.compress(self.canonical.bytes()).or_raise(|| ErrorKind::Compression)?;
        tracing::debug!(
            encoding = %compression,
            generation = self.generation,
            from = self.canonical.len(),
            to = bytes.len(),
            "compressed representation"
        );
        let representation = Arc::new(Representation::new(bytes, compression));
        encoded.insert(compression, Arc::clone(&representation));
        Ok(representation)
    }

    pub fn gzip(&self) -> Result<Arc<Representation>> {
        self.representation(Compression::Gzip)
    }

    pub fn deflate(&self) -> Result<Arc<Representation>> {
        self.representation(Compression::Deflate)
    }

    /// Encodings that have already been produced for this result.
    pub fn cached_encodings(&self) -> Vec<Compression> {
        let mut encodings: Vec<_> = self.encoded.lock().keys().copied().collect();
        encodings.sort_by_key(|compression| compression.as_str());
        encodings
    }
}

/// Outcome of querying the service for one identifier.
#[derive(Debug, Clone)]
pub enum QueryResult {
    /// No record set is published under the identifier.
    NotFound,
    /// The record set was rendered; possibly to zero bytes.
    Found(Arc<Rendered>),
    /// The record set exists but could not be rendered or serialized.
    Failed(Arc<Error>),
}

impl QueryResult {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn rendered(&self) -> Option<&Arc<Rendered>> {
        match self {
            Self::Found(rendered) => Some(rendered),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// The canonical representation, if there is one.
    pub fn canonical(&self) -> Option<Arc<Representation>> {
        self.rendered().map(|rendered| rendered.canonical())
    }

    /// The representation in the requested encoding; `Ok(None)` unless found.
    pub fn representation(&self, compression: Compression) -> Result<Option<Arc<Representation>>> {
        self.rendered().map(|rendered| rendered.representation(compression)).transpose()
    }

    pub fn identifiers(&self) -> &[Identifier] {
        self.rendered().map(|rendered| rendered.identifiers()).unwrap_or_default()
    }

    pub fn generation(&self) -> Option<u64> {
        self.rendered().map(|rendered| rendered.generation())
    }
}
