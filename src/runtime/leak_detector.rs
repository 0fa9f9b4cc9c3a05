//! Per-kind allocation accounting.
//!
//! Every value construction records an allocation and every final release
//! records a reclamation, bucketed by [`ValueKind`]. Counters are
//! thread-local because value graphs never cross threads, which also keeps
//! concurrently running tests isolated from each other.
//!
//! Recording is skipped unless `RuntimeConfig::track_allocations` is set
//! when the value is allocated. A value remembers the counter epoch it was
//! counted in, and its reclamation is recorded only against that same epoch,
//! so toggling tracking or calling [`reset`] never produces unmatched frees.

use std::{cell::RefCell, fmt};

use serde::Serialize;

use crate::runtime::{config, kind::ValueKind};

#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    epoch: u64,
    allocs: [u64; ValueKind::COUNT],
    frees: [u64; ValueKind::COUNT],
}

thread_local! {
    static COUNTERS: RefCell<Counters> = RefCell::new(Counters::default());
}

/// Counts an allocation when tracking is on and returns the epoch it was
/// counted in. `None` means the value is invisible to the counters.
pub(crate) fn record_alloc(kind: ValueKind) -> Option<u64> {
    if !config::current().track_allocations {
        return None;
    }
    COUNTERS.with(|c| {
        let mut counters = c.borrow_mut();
        counters.allocs[kind.index()] += 1;
        Some(counters.epoch)
    })
}

/// Counts a reclamation of a value allocated in `epoch`.
pub(crate) fn record_free(kind: ValueKind, epoch: Option<u64>) {
    let Some(epoch) = epoch else {
        return;
    };
    COUNTERS.with(|c| {
        let mut counters = c.borrow_mut();
        if counters.epoch == epoch {
            counters.frees[kind.index()] += 1;
        }
    });
}

/// Clears the counters of the current thread. Values counted before the
/// reset no longer affect them.
pub fn reset() {
    COUNTERS.with(|c| {
        let mut counters = c.borrow_mut();
        *counters = Counters {
            epoch: counters.epoch.wrapping_add(1),
            ..Counters::default()
        };
    });
}

/// Cumulative counts for one value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KindStats {
    pub kind: ValueKind,
    pub allocs: u64,
    pub frees: u64,
}

impl KindStats {
    pub fn live(&self) -> u64 {
        self.allocs.saturating_sub(self.frees)
    }
}

/// Snapshot of the current thread's counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeakStats {
    pub kinds: Vec<KindStats>,
}

impl LeakStats {
    pub fn allocs(&self) -> u64 {
        self.kinds.iter().map(|k| k.allocs).sum()
    }

    pub fn frees(&self) -> u64 {
        self.kinds.iter().map(|k| k.frees).sum()
    }

    pub fn live(&self) -> u64 {
        self.kinds.iter().map(KindStats::live).sum()
    }

    pub fn of(&self, kind: ValueKind) -> KindStats {
        self.kinds[kind.index()]
    }

    pub fn live_of(&self, kind: ValueKind) -> u64 {
        self.of(kind).live()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl fmt::Display for LeakStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "value allocs: {}  frees: {}  live: {}",
            self.allocs(),
            self.frees(),
            self.live()
        )?;
        if self.live() == 0 {
            return write!(f, "  (no leaks detected)");
        }
        write!(f, "  potential leak:")?;
        for stats in self.kinds.iter().filter(|k| k.live() > 0) {
            write!(f, " {}={}", stats.kind, stats.live())?;
        }
        Ok(())
    }
}

pub fn snapshot() -> LeakStats {
    let counters = COUNTERS.with(|c| *c.borrow());
    LeakStats {
        kinds: ValueKind::ALL
            .iter()
            .map(|&kind| KindStats {
                kind,
                allocs: counters.allocs[kind.index()],
                frees: counters.frees[kind.index()],
            })
            .collect(),
    }
}
