//! Where records come from.

use crate::error::Result;
use crate::item::Item;

/// Produces the complete, current list of records.
///
/// Executed once when the [`Library`](crate::Library) is built and again on
/// every refresh. A failure must leave nothing half-done: the library keeps
/// serving whatever it published last.
///
/// Any `Fn() -> Result<Vec<Item<T>>>` closure is a source:
///
/// ```
/// use mdq_library::{Item, Library, error::Result};
///
/// let library = Library::builder()
///     .source(|| -> Result<Vec<Item<&'static str>>> { Ok(vec![Item::new("payload").with_id("https://sp.example.org")]) })
///     .build()
///     .unwrap();
/// assert_eq!(library.get("https://sp.example.org").unwrap().len(), 1);
/// ```
pub trait Source<T>: Send + Sync {
    fn execute(&self) -> Result<Vec<Item<T>>>;
}

impl<T, F> Source<T> for F
where
    F: Fn() -> Result<Vec<Item<T>>> + Send + Sync,
{
    fn execute(&self) -> Result<Vec<Item<T>>> {
        self()
    }
}

/// A source which returns copies of a fixed list of items.
#[derive(Debug, Clone)]
pub struct StaticSource<T> {
    items: Vec<Item<T>>,
}

impl<T> StaticSource<T> {
    pub fn new(items: impl IntoIterator<Item = Item<T>>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }
}

impl<T: Clone + Send + Sync> Source<T> for StaticSource<T> {
    fn execute(&self) -> Result<Vec<Item<T>>> {
        Ok(self.items.clone())
    }
}
