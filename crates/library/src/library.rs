//! The refreshable library of record sets.

use crate::Lookup;
use crate::error::{ErrorKind, Result};
use crate::health::{Health, Status};
use crate::index::Index;
use crate::item::Identifier;
use crate::record_set::RecordSet;
use crate::source::Source;
use exn::{OptionExt, ResultExt};
use parking_lot::{Condvar, Mutex, MutexGuard, RwLock};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use time::UtcDateTime;

/// Everything guarded by the library's reader/writer lock.
struct State<T> {
    index: Index<T>,
    /// Incremented once per refresh attempt, successful or not. The published
    /// index generation trails it after a failed attempt.
    generation: u64,
    last_refreshed: Option<UtcDateTime>,
    next_refresh: Option<UtcDateTime>,
    active: bool,
}

/// The part of the library shared with the refresh thread.
struct Shared<T> {
    source: Box<dyn Source<T>>,
    refresh_interval: Duration,
    state: RwLock<State<T>>,
    /// Held for the duration of a rebuild. Callers that can't take it wait
    /// for the holder instead of rebuilding a second time.
    refresh_gate: Mutex<()>,
}

struct Scheduler {
    stop: Arc<(Mutex<bool>, Condvar)>,
    handle: JoinHandle<()>,
}

/// Sources records from a [`Source`] and allows lookup on the results.
///
/// The library fetches its records once while being built. If a refresh
/// interval is configured, a background thread refreshes again at that fixed
/// delay; otherwise the owner decides when to call [`refresh`](Self::refresh).
///
/// Each refresh builds a complete new index off to the side and swaps it in
/// under the write lock, so lookups only ever wait for the swap itself. All
/// record sets from one refresh share a generation number; comparing
/// generations is how consumers detect that something they derived from a
/// set has gone stale.
///
/// ```
/// use mdq_library::{Identifier, Item, Library, StaticSource};
///
/// let library = Library::builder()
///     .source(StaticSource::new([
///         Item::new("idp").with_id("https://idp.example.org").with_tag("idps"),
///         Item::new("sp").with_id("https://sp.example.org"),
///     ]))
///     .build()
///     .unwrap();
///
/// assert_eq!(library.get_all().unwrap().len(), 2);
/// assert_eq!(library.get("idps").unwrap().identifiers(), [Identifier::from("idps")]);
/// assert!(library.get("https://unknown.example.org").is_none());
/// ```
pub struct Library<T> {
    shared: Arc<Shared<T>>,
    scheduler: Mutex<Option<Scheduler>>,
}

/// Builder for [`Library`]; a source is mandatory.
pub struct Builder<T> {
    source: Option<Box<dyn Source<T>>>,
    refresh_interval: Duration,
}

impl<T> Default for Builder<T> {
    fn default() -> Self {
        Self {
            source: None,
            refresh_interval: Duration::ZERO,
        }
    }
}

impl<T: Send + Sync + 'static> Builder<T> {
    /// The source to execute on every refresh.
    pub fn source(mut self, source: impl Source<T> + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Fixed delay between scheduled refreshes. [`Duration::ZERO`] (the
    /// default) disables scheduled refresh after the initial fetch.
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Validate the configuration, perform the initial refresh and start the
    /// refresh thread if one is configured.
    ///
    /// A failing initial fetch is not an error: the library starts empty,
    /// reports [`Status::Degraded`], and recovers on the next good refresh.
    pub fn build(self) -> Result<Library<T>> {
        let source = self.source.ok_or_raise(|| ErrorKind::Configuration("source must be supplied"))?;
        let shared = Arc::new(Shared {
            source,
            refresh_interval: self.refresh_interval,
            state: RwLock::new(State {
                index: Index::empty(),
                generation: 0,
                last_refreshed: None,
                next_refresh: None,
                active: true,
            }),
            refresh_gate: Mutex::new(()),
        });

        shared.refresh();

        let scheduler = if shared.refresh_interval.is_zero() {
            None
        } else {
            let scheduler = Scheduler::spawn(Arc::clone(&shared))?;
            shared.compute_next_refresh();
            Some(scheduler)
        };

        Ok(Library {
            shared,
            scheduler: Mutex::new(scheduler),
        })
    }
}

impl<T: Send + Sync + 'static> Library<T> {
    pub fn builder() -> Builder<T> {
        Builder::default()
    }

    /// Record set for all known records.
    pub fn get_all(&self) -> Option<Arc<RecordSet<T>>> {
        self.lookup(&Identifier::All)
    }

    /// Record set published under `identifier`, a unique identifier or tag.
    pub fn get(&self, identifier: &str) -> Option<Arc<RecordSet<T>>> {
        self.lookup(&Identifier::from(identifier))
    }

    /// Fetch new records from the source and publish them.
    ///
    /// If another thread is already refreshing, this waits for that refresh
    /// to complete and returns without duplicating the work.
    pub fn refresh(&self) {
        self.shared.refresh();
    }

    pub fn refresh_interval(&self) -> Duration {
        self.shared.refresh_interval
    }

    pub fn health(&self) -> Health {
        self.shared.health()
    }

    /// Stop the refresh thread and release the published index.
    ///
    /// Lookups return nothing and health reports [`Status::Down`] from here
    /// on. Calling this more than once is harmless.
    pub fn shutdown(&self) {
        if let Some(scheduler) = self.scheduler.lock().take() {
            scheduler.stop();
        }
        let mut state = self.shared.state.write();
        if state.active {
            tracing::debug!("Library shut down");
        }
        state.active = false;
        state.index = Index::empty();
        state.last_refreshed = None;
        state.next_refresh = None;
    }
}

impl<T: Send + Sync + 'static> Lookup<T> for Library<T> {
    fn lookup(&self, identifier: &Identifier) -> Option<Arc<RecordSet<T>>> {
        self.shared.state.read().index.get(identifier)
    }
}

impl<T> Drop for Library<T> {
    fn drop(&mut self) {
        if let Some(scheduler) = self.scheduler.get_mut().take() {
            scheduler.stop();
        }
    }
}

impl<T: Send + Sync + 'static> Shared<T> {
    fn refresh(&self) {
        match self.refresh_gate.try_lock() {
            Some(_gate) => self.do_refresh(),
            // Someone else is refreshing; wait for them, then share their result.
            None => drop(self.refresh_gate.lock()),
        }
    }

    fn do_refresh(&self) {
        let generation = {
            let mut state = self.state.write();
            if !state.active {
                return;
            }
            state.generation += 1;
            state.generation
        };

        let started = Instant::now();
        tracing::debug!(generation, "Executing source");
        let items = match self.source.execute() {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(generation, error = ?err, "Source execution failed; keeping previous index");
                return;
            },
        };
        let (index, report) = Index::build(items, generation);

        let mut state = self.state.write();
        if !state.active {
            return;
        }
        state.index = index;
        state.last_refreshed = Some(UtcDateTime::now());
        tracing::info!(
            generation,
            records = state.index.record_count(),
            identifiers = state.index.identifier_count(),
            duplicates = report.duplicates.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Index refreshed"
        );
    }

    /// Body of the scheduled task. Nothing may escape it: a panic here would
    /// end scheduled refreshes for the lifetime of the library.
    fn scheduled_refresh(&self) {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.refresh();
            self.compute_next_refresh();
        }));
        if let Err(panic) = outcome {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(panic = %message, "Uncaught panic in scheduled refresh");
        }
    }

    fn compute_next_refresh(&self) {
        let next = UtcDateTime::now() + self.refresh_interval;
        self.state.write().next_refresh = Some(next);
        tracing::debug!(next = %next, "Next refresh estimated");
    }

    fn health(&self) -> Health {
        let state = self.state.read();
        if !state.active {
            return Health::down();
        }

        let age = state.last_refreshed.map(|last| Duration::try_from(UtcDateTime::now() - last).unwrap_or_default());
        let mut status = match age {
            Some(_) => Status::Up,
            None => Status::Degraded,
        };
        let next_refresh = if self.refresh_interval.is_zero() {
            None
        } else {
            // Stale-but-serving once two refreshes in a row have been missed.
            if age.is_some_and(|age| age > self.refresh_interval.saturating_mul(2)) {
                status = Status::Degraded;
            }
            state.next_refresh
        };

        Health {
            status,
            generation: state.index.generation(),
            identifiers: state.index.identifier_count(),
            records: state.index.record_count(),
            last_refreshed: state.last_refreshed,
            age,
            next_refresh,
        }
    }
}

impl Scheduler {
    fn spawn<T: Send + Sync + 'static>(shared: Arc<Shared<T>>) -> Result<Self> {
        let stop = Arc::new((Mutex::new(false), Condvar::new()));
        let signal = Arc::clone(&stop);
        let interval = shared.refresh_interval;
        let handle = std::thread::Builder::new()
            .name("mdq-refresh".to_string())
            .spawn(move || {
                let (lock, condvar) = &*signal;
                let mut stopped = lock.lock();
                let mut deadline = Instant::now() + interval;
                while !*stopped {
                    if condvar.wait_until(&mut stopped, deadline).timed_out() {
                        MutexGuard::unlocked(&mut stopped, || shared.scheduled_refresh());
                        deadline = Instant::now() + interval;
                    }
                }
            })
            .or_raise(|| ErrorKind::Scheduler)?;
        tracing::debug!(interval_ms = interval.as_millis() as u64, "Refresh scheduler started");
        Ok(Self { stop, handle })
    }

    fn stop(self) {
        let (lock, condvar) = &*self.stop;
        *lock.lock() = true;
        condvar.notify_all();
        if self.handle.join().is_err() {
            tracing::warn!("Refresh scheduler thread panicked");
        }
    }
}
