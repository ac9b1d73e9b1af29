//! Pauses between polling cycles

use std::io::{self, BufRead, IsTerminal};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use chrono::Local;
use log::info;

use crate::core::ports::Wait;

/// Sleeps for the full interval
#[derive(Debug, Clone, Copy, Default)]
pub struct TimedWait;

impl Wait for TimedWait {
    fn wait(&self, minutes: u64) {
        info!("sleeping {minutes} minutes");
        thread::sleep(Duration::from_secs(minutes.saturating_mul(60)));
    }
}

/// Sleeps for the interval, or until the operator presses enter
///
/// A reader thread owns stdin for the life of the process, so a line typed
/// mid-cycle is picked up by the next wait.
#[derive(Debug)]
pub struct InteractiveWait {
    lines: Receiver<()>,
}

impl InteractiveWait {
    /// Start the stdin reader
    #[must_use]
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                if line.is_err() || tx.send(()).is_err() {
                    break;
                }
            }
        });
        Self { lines: rx }
    }
}

impl Wait for InteractiveWait {
    fn wait(&self, minutes: u64) {
        info!("sleeping {minutes} minutes. Press enter to check now ...");
        match self.lines.recv_timeout(Duration::from_secs(minutes.saturating_mul(60))) {
            Ok(()) | Err(RecvTimeoutError::Timeout) => {},
            Err(RecvTimeoutError::Disconnected) => thread::sleep(Duration::from_secs(minutes.saturating_mul(60))),
        }
        info!("recheck at {}", Local::now().format("%Y-%m-%dT%H:%M:%S"));
    }
}

/// The interactive wait when stdin is a terminal, else the timed one
#[must_use]
pub fn for_stdin() -> Box<dyn Wait> {
    if io::stdin().is_terminal() {
        Box::new(InteractiveWait::spawn())
    } else {
        Box::new(TimedWait)
    }
}
