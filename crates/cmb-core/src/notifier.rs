//! Group membership notifier. Join/leave notifications flow through this
//! unconditional path, independent of the message pipeline.

use tracing::warn;

use crate::{domain::GroupEvent, ports::ChatTransport};

pub async fn welcome(transport: &dyn ChatTransport, ev: &GroupEvent) {
    let text = format!("Welcome to the group, @{}!", ev.participant.as_str());
    if let Err(e) = transport
        .send_to_origin(&ev.origin, &text, std::slice::from_ref(&ev.participant))
        .await
    {
        // Best effort, no retry.
        warn!(target = ev.origin.as_str(), error = %e, "welcome notice failed");
    }
}

pub async fn farewell(transport: &dyn ChatTransport, ev: &GroupEvent) {
    let text = format!("Goodbye, @{}.", ev.participant.as_str());
    if let Err(e) = transport
        .send_to_origin(&ev.origin, &text, std::slice::from_ref(&ev.participant))
        .await
    {
        warn!(target = ev.origin.as_str(), error = %e, "farewell notice failed");
    }
}
