//! Periodic bio refresher: an independent recurring task that regenerates
//! the timestamped default bio and pushes it upstream. It takes no lock the
//! message pipeline needs beyond the brief state write.

use std::{sync::Arc, time::Duration};

use chrono::Local;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::{ports::ChatTransport, state::{default_bio, BotState}};

/// One refresh: regenerate, store, push. Failures to push are logged only.
pub async fn refresh_once(state: &BotState, transport: &dyn ChatTransport) {
    let bio = default_bio(Local::now());
    state.set_bio(&bio).await;
    if let Err(e) = transport.set_bio(&bio).await {
        warn!(error = %e, "periodic bio update failed");
    }
}

/// Spawn the recurring refresher. The first refresh happens one full period
/// after startup, matching an interval timer rather than an immediate tick.
pub fn spawn(
    period: Duration,
    state: Arc<BotState>,
    transport: Arc<dyn ChatTransport>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await; // consume the immediate tick
        loop {
            ticker.tick().await;
            refresh_once(&state, transport.as_ref()).await;
        }
    })
}
