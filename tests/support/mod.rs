#![allow(dead_code)]

use refc::runtime::{
    config::{self, RuntimeConfig},
    leak_detector::{self, LeakStats},
};

/// Runs `f` with allocation tracking on and fresh counters, then restores
/// the previous configuration.
pub fn tracked<R>(f: impl FnOnce() -> R) -> R {
    let previous = config::install(RuntimeConfig {
        track_allocations: true,
        ..config::current()
    });
    leak_detector::reset();
    let result = f();
    config::install(previous);
    result
}

pub fn stats() -> LeakStats {
    leak_detector::snapshot()
}

pub fn assert_no_leaks() {
    let stats = stats();
    assert_eq!(stats.live(), 0, "{stats}");
}
