//! In-memory, generation-tagged index of metadata records.
//!
//! A [`Library`] executes a [`Source`] to obtain every known [`Item`], then
//! publishes them as immutable [`RecordSet`]s under three kinds of key:
//!
//! - each **unique identifier** resolves to the single item claiming it
//!   (first claimant wins; later duplicates are logged and dropped),
//! - each **tag** resolves to every item carrying it, in source order,
//! - [`Identifier::All`] resolves to every item.
//!
//! Refreshes rebuild the whole index and swap it in atomically. Every set
//! from one refresh shares a generation number, which strictly increases from
//! one successful refresh to the next.

pub mod error;
mod health;
mod index;
mod item;
mod library;
mod record_set;
mod source;

pub use crate::health::{Health, Status};
pub use crate::item::{Identifier, Item};
pub use crate::library::{Builder, Library};
pub use crate::record_set::RecordSet;
pub use crate::source::{Source, StaticSource};
use std::sync::Arc;

/// Anything that can resolve identifiers to generation-tagged record sets.
///
/// [`Library`] is the real implementation; consumers depend on this trait so
/// they can be driven by a scripted provider in tests.
pub trait Lookup<T>: Send + Sync {
    fn lookup(&self, identifier: &Identifier) -> Option<Arc<RecordSet<T>>>;
}

pub type LookupHandle<T> = Arc<dyn Lookup<T>>;
