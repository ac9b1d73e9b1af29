//! Pause between polling cycles

/// Blocks until the next polling cycle should start
#[cfg_attr(test, mockall::automock)]
pub trait Wait {
    /// Wait up to `minutes`; implementations may return early on operator request
    fn wait(&self, minutes: u64);
}
