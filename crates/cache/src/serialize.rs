//! Turning rendered records into bytes.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use mdq_library::Item;
use serde::Serialize;
use std::io::Write;

/// Writes a whole collection of rendered records to an output sink.
pub trait Serializer<T>: Send + Sync {
    fn serialize(&self, items: &[Item<T>], output: &mut dyn Write) -> Result<()>;
}

/// Writes a single record. Any `Fn(&Item<T>, &mut dyn Write) -> Result<()>`
/// closure is an item serializer.
pub trait ItemSerializer<T>: Send + Sync {
    fn serialize_item(&self, item: &Item<T>, output: &mut dyn Write) -> Result<()>;
}

impl<T, F> ItemSerializer<T> for F
where
    F: Fn(&Item<T>, &mut dyn Write) -> Result<()> + Send + Sync,
{
    fn serialize_item(&self, item: &Item<T>, output: &mut dyn Write) -> Result<()> {
        self(item, output)
    }
}

/// Concatenates the output of an [`ItemSerializer`] for each record, with
/// nothing in between.
pub struct SimpleSerializer<T> {
    item: Box<dyn ItemSerializer<T>>,
}

impl<T> SimpleSerializer<T> {
    pub fn new(item: impl ItemSerializer<T> + 'static) -> Self {
        Self { item: Box::new(item) }
    }
}

impl<T> Serializer<T> for SimpleSerializer<T> {
    fn serialize(&self, items: &[Item<T>], output: &mut dyn Write) -> Result<()> {
        for item in items {
            self.item.serialize_item(item, output)?;
        }
        Ok(())
    }
}

/// Writes the records as a JSON array of `{"ids", "tags", "payload"}`
/// objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonListSerializer {
    pretty: bool,
}

impl JsonListSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl<T: Serialize> Serializer<T> for JsonListSerializer {
    fn serialize(&self, items: &[Item<T>], output: &mut dyn Write) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *output, items).or_raise(|| ErrorKind::Serialize)?;
        } else {
            serde_json::to_writer(&mut *output, items).or_raise(|| ErrorKind::Serialize)?;
        }
        output.flush().or_raise(|| ErrorKind::Serialize)
    }
}
