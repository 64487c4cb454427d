use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tokio::sync::RwLock;

/// Runtime-mutable bot state: command prefix and bio text, plus the immutable
/// start time.
///
/// This is an explicitly passed handle, not a process global. Single writer
/// (command handlers / bio refresher), snapshot reads: the pipeline takes one
/// [`StateSnapshot`] per message, so a concurrent `setprefix` can change the
/// classification of the *next* message, never the one in flight.
pub struct BotState {
    inner: RwLock<Mutable>,
    started: Instant,
    started_at: DateTime<Local>,
}

#[derive(Clone, Debug)]
struct Mutable {
    prefix: String,
    bio: String,
}

/// Point-in-time copy of the mutable state, taken once per pipeline pass.
#[derive(Clone, Debug)]
pub struct StateSnapshot {
    pub prefix: String,
    pub bio: String,
}

impl BotState {
    pub fn new(prefix: impl Into<String>) -> Self {
        let now = Local::now();
        Self {
            inner: RwLock::new(Mutable {
                prefix: prefix.into(),
                bio: default_bio(now),
            }),
            started: Instant::now(),
            started_at: now,
        }
    }

    pub async fn snapshot(&self) -> StateSnapshot {
        let inner = self.inner.read().await;
        StateSnapshot {
            prefix: inner.prefix.clone(),
            bio: inner.bio.clone(),
        }
    }

    /// Callers must pass a non-empty prefix; `setprefix` validates arity
    /// before reaching here and whitespace-splitting guarantees non-empty
    /// tokens.
    pub async fn set_prefix(&self, prefix: impl Into<String>) {
        self.inner.write().await.prefix = prefix.into();
    }

    pub async fn set_bio(&self, bio: impl Into<String>) {
        self.inner.write().await.bio = bio.into();
    }

    /// Elapsed time since the process baseline. Immutable post-init.
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }
}

/// Default bio text carrying a seconds-resolution time-of-day token, so two
/// refreshes in different seconds produce distinct bios.
pub fn default_bio(now: DateTime<Local>) -> String {
    format!("Online and moderating | {}", now.format("%H:%M:%S"))
}
