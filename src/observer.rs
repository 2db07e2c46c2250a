//! Hooks into every expansion of a running search.
//!
//! Observers are side-effect only. Strategies expand the same States in the
//! same order whether an observer is attached or not; the only thing an
//! observer can do is ask the search to stop early.

use std::fmt::Debug;

/// What the search should do after notifying an observer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// A single expansion step.
#[derive(Debug)]
pub struct Expansion<'a, Sp, St> {
    pub space: &'a Sp,
    /// The State being expanded.
    pub current: St,
    /// States waiting in the frontier, in no particular order.
    pub frontier: &'a [St],
    /// The path from the root of the search to `current`.
    pub path: &'a [St],
    /// Expansions so far, this one included.
    pub expansions: usize,
}

pub trait SearchObserver<Sp, St> {
    /// Inactive observers are never called, and strategies skip building the
    /// frontier and path snapshots for them.
    fn is_active(&self) -> bool {
        true
    }

    fn on_expand(&self, e: &Expansion<'_, Sp, St>) -> Flow;
}

/// Observes nothing.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoObserver;

impl<Sp, St> SearchObserver<Sp, St> for NoObserver {
    fn is_active(&self) -> bool {
        false
    }
    fn on_expand(&self, _e: &Expansion<'_, Sp, St>) -> Flow {
        Flow::Continue
    }
}

/// Traces every expansion through `log`.
#[derive(Copy, Clone, Debug)]
pub struct LoggingObserver {
    pub name: &'static str,
}

impl<Sp, St: Debug> SearchObserver<Sp, St> for LoggingObserver {
    fn is_active(&self) -> bool {
        log::log_enabled!(log::Level::Trace)
    }
    fn on_expand(&self, e: &Expansion<'_, Sp, St>) -> Flow {
        log::trace!(
            "{}: #{} {:?} (depth {}, |frontier| {})",
            self.name,
            e.expansions,
            e.current,
            e.path.len().saturating_sub(1),
            e.frontier.len(),
        );
        Flow::Continue
    }
}
