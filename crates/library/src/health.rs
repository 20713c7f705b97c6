use derive_more::Display;
use std::fmt::{Display as FmtDisplay, Formatter, Result as FmtResult};
use std::time::Duration;
use time::UtcDateTime;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum Status {
    /// Not serving: shut down.
    #[display("DOWN")]
    Down,
    #[display("UP")]
    Up,
    /// Serving, but the data is older than two refresh intervals (or was
    /// never successfully loaded).
    #[display("DEGRADED")]
    Degraded,
}

/// Point-in-time health of a [`Library`](crate::Library).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Health {
    pub status: Status,
    /// Generation of the published index.
    pub generation: u64,
    pub identifiers: usize,
    pub records: usize,
    pub last_refreshed: Option<UtcDateTime>,
    pub age: Option<Duration>,
    /// Only present when scheduled refresh is enabled.
    pub next_refresh: Option<UtcDateTime>,
}

impl Health {
    pub(crate) fn down() -> Self {
        Self {
            status: Status::Down,
            generation: 0,
            identifiers: 0,
            records: 0,
            last_refreshed: None,
            age: None,
            next_refresh: None,
        }
    }

    pub fn is_serving(&self) -> bool {
        !matches!(self.status, Status::Down)
    }
}

impl FmtDisplay for Health {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} (generation {}, {} records, {} identifiers", self.status, self.generation, self.records, self.identifiers)?;
        if let Some(age) = self.age {
            write!(f, ", age {}ms", age.as_millis())?;
        }
        if let Some(next) = self.next_refresh {
            write!(f, ", next refresh {next}")?;
        }
        f.write_str(")")
    }
}
