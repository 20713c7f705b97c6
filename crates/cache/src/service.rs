use crate::error::{ErrorKind, Result};
use crate::render::{Pipeline, Render};
use crate::result::{QueryResult, Rendered};
use crate::serialize::Serializer;
use exn::{OptionExt, ResultExt};
use mdq_compress::Compression;
use mdq_library::{Identifier, Lookup, LookupHandle, RecordSet};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

/// Settings for [`MetadataService`] that do not involve collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceOptions {
    /// Content encodings results may be requested in, besides identity.
    pub encodings: Vec<Compression>,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            encodings: vec![Compression::Gzip, Compression::Deflate],
        }
    }
}

/// Renders record sets on demand and keeps the rendered bytes for as long
/// as the generation they were rendered from is current.
///
/// Cached results are keyed by every identifier of the rendered set, so a
/// lookup through any alias of an entity is a hit once one of them has been
/// rendered. Rendering happens outside the cache lock; two threads missing
/// on the same identifier at once may both render it, and either result is
/// correct for that generation.
///
/// Storing the first result of a newer generation evicts every entry from
/// older generations, so identifiers dropped by a refresh do not linger.
pub struct MetadataService<T> {
    library: LookupHandle<T>,
    render: Box<dyn Render<T>>,
    serializer: Box<dyn Serializer<T>>,
    encodings: Arc<[Compression]>,
    cache: Mutex<ResultCache>,
}

#[derive(Default)]
struct ResultCache {
    results: HashMap<Identifier, Arc<Rendered>>,
    /// Newest generation stored so far.
    generation: u64,
}

/// Builder for [`MetadataService`]; a library and a serializer are
/// mandatory, rendering defaults to publishing records unchanged.
pub struct Builder<T> {
    library: Option<LookupHandle<T>>,
    render: Option<Box<dyn Render<T>>>,
    serializer: Option<Box<dyn Serializer<T>>>,
    options: ServiceOptions,
}

impl<T> Default for Builder<T> {
    fn default() -> Self {
        Self {
            library: None,
            render: None,
            serializer: None,
            options: ServiceOptions::default(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Builder<T> {
    pub fn library(mut self, library: LookupHandle<T>) -> Self {
        self.library = Some(library);
        self
    }

    pub fn render(mut self, render: impl Render<T> + 'static) -> Self {
        self.render = Some(Box::new(render));
        self
    }

    pub fn serializer(mut self, serializer: impl Serializer<T> + 'static) -> Self {
        self.serializer = Some(Box::new(serializer));
        self
    }

    pub fn options(mut self, options: ServiceOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<MetadataService<T>> {
        let library = self.library.ok_or_raise(|| ErrorKind::Configuration("library must be supplied"))?;
        let serializer = self
            .serializer
            .ok_or_raise(|| ErrorKind::Configuration("serializer must be supplied"))?;
        let render: Box<dyn Render<T>> = match self.render {
            Some(render) => render,
            None => Box::new(Pipeline::default()),
        };
        let mut encodings = Vec::new();
        for compression in self.options.encodings {
            if !compression.is_identity() && !encodings.contains(&compression) {
                encodings.push(compression);
            }
        }
        Ok(MetadataService {
            library,
            render,
            serializer,
            encodings: encodings.into(),
            cache: Mutex::new(ResultCache::default()),
        })
    }
}

impl<T: Clone + Send + Sync + 'static> MetadataService<T> {
    pub fn builder() -> Builder<T> {
        Builder::default()
    }

    /// Result for a unique identifier or tag.
    pub fn get(&self, identifier: &str) -> QueryResult {
        self.query(&Identifier::from(identifier))
    }

    /// Result for every known record.
    pub fn get_all(&self) -> QueryResult {
        self.query(&Identifier::All)
    }

    pub fn query(&self, identifier: &Identifier) -> QueryResult {
        let Some(set) = self.library.lookup(identifier) else {
            tracing::trace!(%identifier, "No record set");
            return QueryResult::NotFound;
        };

        if let Some(hit) = self.cached(identifier, set.generation()) {
            return QueryResult::Found(hit);
        }

        match self.render_set(&set) {
            Ok(rendered) => {
                let rendered = Arc::new(rendered);
                self.store(identifier, &rendered);
                QueryResult::Found(rendered)
            },
            Err(err) => {
                tracing::warn!(%identifier, generation = set.generation(), error = ?err, "Failed to render record set");
                QueryResult::Failed(Arc::new(err))
            },
        }
    }

    /// Drop every cached result. The next query for each identifier renders
    /// again.
    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock();
        tracing::debug!(entries = cache.results.len(), "Clearing result cache");
        cache.results.clear();
    }

    /// Number of identifiers with a cached result.
    pub fn cache_size(&self) -> usize {
        self.cache.lock().results.len()
    }

    pub fn encodings(&self) -> &[Compression] {
        &self.encodings
    }

    fn cached(&self, identifier: &Identifier, generation: u64) -> Option<Arc<Rendered>> {
        self.cache
            .lock()
            .results
            .get(identifier)
            .filter(|rendered| rendered.generation() == generation)
            .map(Arc::clone)
    }

    #[instrument(level = "debug", skip_all, fields(generation = set.generation(), records = set.len()))]
    fn render_set(&self, set: &RecordSet<T>) -> Result<Rendered> {
        let mut items = set.clone_items();
        self.render.execute(&mut items).or_raise(|| ErrorKind::Render)?;
        let mut bytes = Vec::new();
        self.serializer
            .serialize(&items, &mut bytes)
            .or_raise(|| ErrorKind::Serialize)?;
        tracing::debug!(bytes = bytes.len(), "Rendered record set");
        Ok(Rendered::new(
            bytes,
            set.identifiers().to_vec(),
            set.generation(),
            Arc::clone(&self.encodings),
        ))
    }

    fn store(&self, queried: &Identifier, rendered: &Arc<Rendered>) {
        let mut cache = self.cache.lock();
        if rendered.generation() > cache.generation {
            let before = cache.results.len();
            cache.results.retain(|_, existing| existing.generation() >= rendered.generation());
            cache.generation = rendered.generation();
            tracing::debug!(
                generation = cache.generation,
                evicted = before - cache.results.len(),
                "Evicted results from older generations"
            );
        }
        let keys = std::iter::once(queried).chain(rendered.identifiers());
        for key in keys {
            // Another thread may already have stored a result from a later refresh.
            let newer = cache
                .results
                .get(key)
                .is_some_and(|existing| existing.generation() > rendered.generation());
            if !newer {
                cache.results.insert(key.clone(), Arc::clone(rendered));
            }
        }
    }
}

impl<T> std::fmt::Debug for MetadataService<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataService")
            .field("encodings", &self.encodings)
            .field("cached", &self.cache.lock().results.len())
            .finish_non_exhaustive()
    }
}
