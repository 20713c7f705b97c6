//! Preparing records for publication.

use crate::error::Result;
use mdq_library::Item;
use tracing::instrument;

/// Transforms records in place before they are serialized (redaction,
/// signing, normalisation, ...).
///
/// Stages always receive a private copy of the records, never the ones held
/// by the library. Any `Fn(&mut Vec<Item<T>>) -> Result<()>` closure is a
/// render stage.
pub trait Render<T>: Send + Sync {
    fn execute(&self, items: &mut Vec<Item<T>>) -> Result<()>;
}

impl<T, F> Render<T> for F
where
    F: Fn(&mut Vec<Item<T>>) -> Result<()> + Send + Sync,
{
    fn execute(&self, items: &mut Vec<Item<T>>) -> Result<()> {
        self(items)
    }
}

/// Render stages run one after another. Stops at the first failure.
///
/// An empty pipeline publishes records unchanged.
pub struct Pipeline<T> {
    stages: Vec<Box<dyn Render<T>>>,
}

impl<T> Default for Pipeline<T> {
    fn default() -> Self {
        Self { stages: Vec::new() }
    }
}

impl<T> Pipeline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(mut self, stage: impl Render<T> + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl<T> Render<T> for Pipeline<T> {
    #[instrument(level = "trace", skip_all, fields(stages = self.stages.len(), items = items.len()))]
    fn execute(&self, items: &mut Vec<Item<T>>) -> Result<()> {
        for stage in &self.stages {
            stage.execute(items)?;
        }
        Ok(())
    }
}

impl<T> std::fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").field("stages", &self.stages.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn empty_pipeline_is_identity() {
        let mut items = vec![Item::new(1).with_id("a"), Item::new(2).with_id("b")];
        let expected = items.clone();
        Pipeline::new().execute(&mut items).unwrap();
        assert_eq!(items, expected);
    }

    #[test]
    fn stages_run_in_order() {
        let pipeline = Pipeline::new()
            .stage(|items: &mut Vec<Item<i32>>| -> Result<()> {
                items.iter_mut().for_each(|item| *item.payload_mut() += 1);
                Ok(())
            })
            .stage(|items: &mut Vec<Item<i32>>| -> Result<()> {
                items.iter_mut().for_each(|item| *item.payload_mut() *= 10);
                Ok(())
            })
            .stage(|items: &mut Vec<Item<i32>>| -> Result<()> {
                items.retain(|item| *item.payload() > 10);
                Ok(())
            });
        let mut items = vec![Item::new(0), Item::new(1), Item::new(2)];
        pipeline.execute(&mut items).unwrap();
        let payloads: Vec<_> = items.into_iter().map(Item::into_payload).collect();
        assert_eq!(payloads, vec![20, 30]);
        assert_eq!(pipeline.len(), 3);
    }

    #[test]
    fn failure_stops_pipeline() {
        let after = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&after);
        let pipeline = Pipeline::new()
            .stage(|_: &mut Vec<Item<()>>| -> Result<()> { exn::bail!(ErrorKind::Render) })
            .stage(move |_: &mut Vec<Item<()>>| -> Result<()> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        let err = pipeline.execute(&mut vec![Item::new(())]).unwrap_err();
        assert_eq!(*err, ErrorKind::Render);
        assert_eq!(after.load(Ordering::SeqCst), 0);
    }
}
