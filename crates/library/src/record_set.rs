use crate::item::{Identifier, Item};
use std::sync::Arc;

/// An immutable snapshot: records, the identifiers resolving to them, and
/// the refresh generation that produced them.
///
/// Every set published by one refresh carries the same generation, and any
/// two sets with equal identifiers but different contents carry different
/// generations. Consumers use this to validate anything they derived from a
/// set earlier.
///
/// Items are shared between the sets of one index (a record appears in its
/// own set, each of its tag groups, and the [`Identifier::All`] set), so they
/// are held behind [`Arc`] and must be cloned before mutation.
#[derive(Debug)]
pub struct RecordSet<T> {
    items: Vec<Arc<Item<T>>>,
    identifiers: Vec<Identifier>,
    generation: u64,
}

impl<T> RecordSet<T> {
    pub fn new(items: impl IntoIterator<Item = Item<T>>, identifiers: Vec<Identifier>, generation: u64) -> Self {
        Self::from_shared(items.into_iter().map(Arc::new).collect(), identifiers, generation)
    }

    pub(crate) fn from_shared(items: Vec<Arc<Item<T>>>, identifiers: Vec<Identifier>, generation: u64) -> Self {
        Self {
            items,
            identifiers,
            generation,
        }
    }

    pub fn items(&self) -> &[Arc<Item<T>>] {
        &self.items
    }

    /// Every identifier that resolves to this set, in registration order.
    pub fn identifiers(&self) -> &[Identifier] {
        &self.identifiers
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Clone> RecordSet<T> {
    /// Deep copy of the records, safe to hand to a stage that mutates them.
    pub fn clone_items(&self) -> Vec<Item<T>> {
        self.items.iter().map(|item| Item::clone(item)).collect()
    }
}
