//! The moderation pipeline: one pass per inbound message, strict priority
//! order with short-circuit after the first stage that claims the message.
//!
//! Stage order is a designed contract: spam check, then link check (for
//! non-command, group-origin messages), then command dispatch, then the
//! greeting responder. Transport failures are caught per action and logged;
//! a malfunctioning message never blocks the next one.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    commands::{self, parse_invocation},
    config::Config,
    domain::{GroupEvent, InboundMessage, OutboundAction, TransportEvent},
    moderation::{contains_link, SpamGuard, Verdict},
    notifier,
    ports::{ChatTransport, CommandUsageSink},
    state::BotState,
};

pub struct Pipeline {
    state: Arc<BotState>,
    transport: Arc<dyn ChatTransport>,
    guard: Mutex<SpamGuard>,
    greeting_words: Vec<String>,
    greeting_reply: String,
    usage: Option<Arc<dyn CommandUsageSink>>,
}

impl Pipeline {
    pub fn new(
        cfg: &Config,
        state: Arc<BotState>,
        transport: Arc<dyn ChatTransport>,
        usage: Option<Arc<dyn CommandUsageSink>>,
    ) -> Self {
        Self {
            state,
            transport,
            guard: Mutex::new(SpamGuard::new(cfg.spam_threshold, cfg.spam_window)),
            greeting_words: cfg.greeting_words.clone(),
            greeting_reply: cfg.greeting_reply.clone(),
            usage,
        }
    }

    /// Entry point for everything the transport hands us.
    pub async fn handle_event(&self, event: TransportEvent) {
        match event {
            TransportEvent::Message(msg) => self.handle_message(&msg).await,
            TransportEvent::GroupJoin(ev) => self.handle_group_join(&ev).await,
            TransportEvent::GroupLeave(ev) => self.handle_group_leave(&ev).await,
            TransportEvent::Ready => info!("transport ready"),
            TransportEvent::Authenticated => info!("transport authenticated"),
            TransportEvent::AuthFailure(reason) => warn!(%reason, "transport auth failure"),
            TransportEvent::PairingCode(code) => {
                // Rendering (QR etc.) is the adapter's concern.
                info!(%code, "pairing code available");
            }
        }
    }

    /// One full pipeline pass. Never returns an error: every failure is
    /// handled at the point of the action.
    pub async fn handle_message(&self, msg: &InboundMessage) {
        let actions = self.decide(msg).await;
        self.execute(msg, &actions).await;
    }

    /// Run the stages and produce this message's outbound actions.
    pub async fn decide(&self, msg: &InboundMessage) -> Vec<OutboundAction> {
        // Spam stage. The window read-modify-write finishes inside this lock,
        // before any transport suspension point, so two messages from the
        // same sender cannot race on the same window.
        let verdict = self.guard.lock().await.check_and_record(&msg.sender);
        if verdict == Verdict::SpamDetected {
            if msg.is_group {
                return vec![
                    OutboundAction::DeleteMessage,
                    OutboundAction::SendToOrigin {
                        text: "Slow down! That message was removed for spamming.".to_string(),
                        mentions: vec![msg.sender.clone()],
                    },
                ];
            }
            return vec![OutboundAction::Reply(
                "You're sending messages too quickly. Slow down.".to_string(),
            )];
        }

        // One snapshot per message: a concurrent setprefix reclassifies the
        // next message, not this one.
        let snap = self.state.snapshot().await;
        let invocation = parse_invocation(&msg.body, &snap.prefix);

        // Link stage: non-command messages in groups only.
        if invocation.is_none() && msg.is_group && contains_link(&msg.body) {
            return vec![
                OutboundAction::DeleteMessage,
                OutboundAction::SendToOrigin {
                    text: "No links in this group, please.".to_string(),
                    mentions: vec![msg.sender.clone()],
                },
            ];
        }

        // Command stage: claims the message regardless of outcome.
        if let Some(inv) = invocation {
            self.record_usage(&inv.name, msg).await;
            return commands::route(&inv, msg, &self.state, &snap, self.transport.as_ref()).await;
        }

        // Greeting stage.
        let lower = msg.body.to_lowercase();
        if self.greeting_words.iter().any(|w| lower.contains(w)) {
            return vec![OutboundAction::Reply(self.greeting_reply.clone())];
        }

        Vec::new()
    }

    /// Apply actions through the transport, catching and logging each
    /// failure with its action kind and target.
    async fn execute(&self, msg: &InboundMessage, actions: &[OutboundAction]) {
        for action in actions {
            match action {
                OutboundAction::Reply(text) => {
                    if let Err(e) = self.transport.reply(msg, text).await {
                        warn!(target = msg.origin.as_str(), error = %e, "reply failed");
                    }
                }
                OutboundAction::SendToOrigin { text, mentions } => {
                    if let Err(e) = self
                        .transport
                        .send_to_origin(&msg.origin, text, mentions)
                        .await
                    {
                        warn!(target = msg.origin.as_str(), error = %e, "send failed");
                    }
                }
                OutboundAction::DeleteMessage => {
                    if let Err(e) = self.transport.delete_message(msg, true).await {
                        warn!(target = msg.origin.as_str(), error = %e, "delete failed");
                    }
                }
                OutboundAction::RemoveParticipant(id) => {
                    // The per-id notice reflects the actual outcome of the
                    // removal request.
                    let notice = match self.transport.remove_participant(&msg.origin, id).await {
                        Ok(()) => format!("@{} has been removed.", id.as_str()),
                        Err(e) => {
                            warn!(target = id.as_str(), error = %e, "remove failed");
                            format!("Couldn't remove @{}.", id.as_str())
                        }
                    };
                    if let Err(e) = self
                        .transport
                        .send_to_origin(&msg.origin, &notice, std::slice::from_ref(id))
                        .await
                    {
                        warn!(target = msg.origin.as_str(), error = %e, "send failed");
                    }
                }
            }
        }
    }

    async fn record_usage(&self, command: &str, msg: &InboundMessage) {
        let Some(sink) = &self.usage else {
            return;
        };
        let timestamp = Utc::now().to_rfc3339();
        if let Err(e) = sink.record(command, &msg.sender, &timestamp).await {
            warn!(command, error = %e, "usage sink record failed");
        }
    }

    async fn handle_group_join(&self, ev: &GroupEvent) {
        notifier::welcome(self.transport.as_ref(), ev).await;
    }

    async fn handle_group_leave(&self, ev: &GroupEvent) {
        notifier::farewell(self.transport.as_ref(), ev).await;
    }
}
