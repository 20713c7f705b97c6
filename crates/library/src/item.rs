//! Records and the identifiers that resolve to them.

use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Key under which a [`RecordSet`](crate::RecordSet) is published.
///
/// Unique identifiers and tags share one namespace. [`Identifier::All`] is
/// reserved and never collides with a record's own identifiers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Identifier {
    /// Every record from the most recent successful refresh.
    All,
    /// A unique identifier or a tag name.
    Id(String),
}
impl Identifier {
    /// The identifier string, or `None` for [`Identifier::All`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Id(id) => Some(id),
        }
    }
}
impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::All => f.write_str("<all>"),
            Self::Id(id) => f.write_str(id),
        }
    }
}
impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::Id(value.to_string())
    }
}
impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self::Id(value)
    }
}

/// One indexed record: an opaque payload plus the metadata the index reads.
///
/// The index never looks inside `payload`. [`Clone`] is the deep copy used
/// before a render stage is allowed to mutate an item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Item<T> {
    ids: Vec<String>,
    tags: Vec<String>,
    payload: T,
}

impl<T> Item<T> {
    pub fn new(payload: T) -> Self {
        Self {
            ids: Vec::new(),
            tags: Vec::new(),
            payload,
        }
    }

    /// Add a unique identifier (an alias if the item already has one).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.ids.push(id.into());
        self
    }

    /// Add a tag; every item sharing a tag is published as one group.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn unique_ids(&self) -> &[String] {
        &self.ids
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut T {
        &mut self.payload
    }

    pub fn into_payload(self) -> T {
        self.payload
    }
}
