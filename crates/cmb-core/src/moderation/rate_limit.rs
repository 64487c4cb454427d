use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use crate::domain::SenderId;

/// Outcome of a spam check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    SpamDetected,
}

#[derive(Clone, Debug)]
struct SenderWindow {
    count: u32,
    window_start: Instant,
}

/// Per-sender tumbling-window message counter.
///
/// The window is tumbling, not sliding: it resets wholesale when the first
/// message after expiry arrives, never on a timer. A sender who goes silent
/// keeps a stale entry indefinitely (accepted: entries are never evicted),
/// and bursts of up to 2x the threshold can straddle a window boundary.
///
/// The read-modify-write per sender must complete before the pipeline hits
/// any suspension point; callers on multi-threaded runtimes hold a mutex
/// around the guard for the duration of the check.
#[derive(Debug)]
pub struct SpamGuard {
    threshold: u32,
    window: Duration,
    windows: HashMap<SenderId, SenderWindow>,
}

impl SpamGuard {
    pub fn new(threshold: u32, window: Duration) -> Self {
        Self {
            threshold,
            window,
            windows: HashMap::new(),
        }
    }

    /// Record one message from `sender` and return the verdict.
    pub fn check_and_record(&mut self, sender: &SenderId) -> Verdict {
        self.check_and_record_at(sender, Instant::now())
    }

    pub fn check_and_record_at(&mut self, sender: &SenderId, now: Instant) -> Verdict {
        match self.windows.get_mut(sender) {
            None => {
                self.windows.insert(
                    sender.clone(),
                    SenderWindow {
                        count: 1,
                        window_start: now,
                    },
                );
                Verdict::Allowed
            }
            Some(win) => {
                if now.duration_since(win.window_start) < self.window {
                    win.count += 1;
                } else {
                    win.count = 1;
                    win.window_start = now;
                }

                // Strict comparison: exactly `threshold` messages in a window
                // are fine; the verdict is re-evaluated per message, not
                // latched, so traffic resumes once the window rolls over.
                if win.count > self.threshold {
                    Verdict::SpamDetected
                } else {
                    Verdict::Allowed
                }
            }
        }
    }

    /// Number of tracked senders (grows without bound by design).
    pub fn tracked_senders(&self) -> usize {
        self.windows.len()
    }
}
