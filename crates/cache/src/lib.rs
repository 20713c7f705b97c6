//! Query service on top of an [`mdq_library`] index.
//!
//! [`MetadataService`] looks an identifier up, renders the matching record
//! set into bytes through a [`Render`] stage and a [`Serializer`], and keeps
//! the [`Rendered`] result until the library publishes a new generation for
//! that identifier:
//!
//! ```
//! use mdq_cache::{JsonListSerializer, MetadataService};
//! use mdq_library::{Item, Library, StaticSource};
//! use std::sync::Arc;
//!
//! let library = Arc::new(
//!     Library::builder()
//!         .source(StaticSource::new([Item::new(1).with_id("one").with_tag("odd")]))
//!         .build()
//!         .unwrap(),
//! );
//! let service = MetadataService::builder()
//!     .library(library)
//!     .serializer(JsonListSerializer::new())
//!     .build()
//!     .unwrap();
//!
//! let result = service.get("odd");
//! let gzip = result.rendered().unwrap().gzip().unwrap();
//! assert_eq!(gzip.content_encoding(), Some("gzip"));
//! assert!(service.get("two").is_not_found());
//! ```

pub mod error;
mod render;
mod representation;
mod result;
mod serialize;
mod service;

pub use crate::render::{Pipeline, Render};
pub use crate::representation::Representation;
pub use crate::result::{QueryResult, Rendered};
pub use crate::serialize::{ItemSerializer, JsonListSerializer, SimpleSerializer, Serializer};
pub use crate::service::{Builder, MetadataService, ServiceOptions};
pub use mdq_compress::Compression;
