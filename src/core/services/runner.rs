//! Polling runner
//!
//! Runs a unit of work once, or forever at a fixed interval. In interval
//! mode a failing cycle is logged and the loop continues; per-cycle caches
//! are dropped after every cycle, failed or not.

use log::{error, info};

use crate::core::ports::Wait;

use super::cache::SessionCache;

/// Drives the work callback once or on an interval
pub struct PollingRunner<'a> {
    interval: Option<u64>,
    waiter: &'a dyn Wait,
    cache: SessionCache,
    #[cfg(test)]
    cycles_left: std::cell::Cell<Option<usize>>,
}

impl std::fmt::Debug for PollingRunner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingRunner")
            .field("interval", &self.interval)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl<'a> PollingRunner<'a> {
    /// Runner polling every `interval` minutes; `None` or `0` runs once
    #[must_use]
    pub fn new(interval: Option<u64>, waiter: &'a dyn Wait) -> Self {
        Self {
            interval: interval.filter(|minutes| *minutes > 0),
            waiter,
            cache: SessionCache::new(),
            #[cfg(test)]
            cycles_left: std::cell::Cell::new(None),
        }
    }

    /// Run `work` once and return its result, or poll forever
    ///
    /// When polling, a failed cycle is logged and the next one starts after
    /// the usual wait.
    pub fn run<T, F>(&self, mut work: F) -> anyhow::Result<T>
    where
        F: FnMut(&SessionCache) -> anyhow::Result<T>,
    {
        let Some(interval) = self.interval else {
            let result = work(&self.cache);
            self.cache.invalidate();
            return result;
        };

        loop {
            self.run_cycle(&mut work);
            #[cfg(test)]
            if self.last_cycle() {
                anyhow::bail!("cycle limit reached");
            }
            self.waiter.wait(interval);
        }
    }

    fn run_cycle<T, F>(&self, work: &mut F)
    where
        F: FnMut(&SessionCache) -> anyhow::Result<T>,
    {
        if let Err(e) = work(&self.cache) {
            error!("cycle failed: {e:#}");
        }
        self.cache.invalidate();
        info!("cycle finished");
    }

    #[cfg(test)]
    fn stop_after(self, cycles: usize) -> Self {
        self.cycles_left.set(Some(cycles));
        self
    }

    #[cfg(test)]
    fn last_cycle(&self) -> bool {
        match self.cycles_left.get() {
            Some(left) if left <= 1 => true,
            Some(left) => {
                self.cycles_left.set(Some(left - 1));
                false
            },
            None => false,
        }
    }
}
