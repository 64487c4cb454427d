//! Console transport adapter: a stdin/stdout stand-in for the real chat
//! transport, implementing the same port so the whole pipeline can be
//! exercised locally.
//!
//! Line protocol:
//! - `dm <text>`    direct message from `you@dm`
//! - `join <id>`    group join notification for `<id>`
//! - `leave <id>`   group leave notification for `<id>`
//! - anything else  group message from `you@console` (tokens starting with
//!   `@` become mentions, so `.kick @bob` works)

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};

use cmb_core::{
    domain::{
        ChatInfo, GroupEvent, InboundMessage, MessageId, OriginId, SenderId, TransportEvent,
    },
    pipeline::Pipeline,
    ports::ChatTransport,
    Result,
};

const GROUP_ORIGIN: &str = "console@g.us";
const GROUP_SENDER: &str = "you@console";
const DM_SENDER: &str = "you@dm";

pub struct ConsoleTransport {
    participants: Mutex<Vec<SenderId>>,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self {
            participants: Mutex::new(vec![SenderId(GROUP_SENDER.to_string())]),
        }
    }

    fn add_participant(&self, id: &SenderId) {
        let mut list = self.participants.lock().unwrap();
        if !list.contains(id) {
            list.push(id.clone());
        }
    }

    fn drop_participant(&self, id: &SenderId) -> bool {
        let mut list = self.participants.lock().unwrap();
        let before = list.len();
        list.retain(|p| p != id);
        list.len() != before
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatTransport for ConsoleTransport {
    async fn reply(&self, msg: &InboundMessage, text: &str) -> Result<()> {
        println!("[bot -> {}] {text}", msg.origin.as_str());
        Ok(())
    }

    async fn send_to_origin(
        &self,
        origin: &OriginId,
        text: &str,
        mentions: &[SenderId],
    ) -> Result<()> {
        if mentions.is_empty() {
            println!("[bot -> {}] {text}", origin.as_str());
        } else {
            let tagged: Vec<&str> = mentions.iter().map(|m| m.as_str()).collect();
            println!("[bot -> {}] {text} (mentions: {})", origin.as_str(), tagged.join(", "));
        }
        Ok(())
    }

    async fn delete_message(&self, msg: &InboundMessage, _everyone: bool) -> Result<()> {
        println!("[bot] deleted message {:?} in {}", msg.id.0, msg.origin.as_str());
        Ok(())
    }

    async fn get_chat(&self, _origin: &OriginId) -> Result<ChatInfo> {
        Ok(ChatInfo {
            name: "console".to_string(),
            participants: self.participants.lock().unwrap().clone(),
            description: None,
        })
    }

    async fn remove_participant(&self, origin: &OriginId, id: &SenderId) -> Result<()> {
        if self.drop_participant(id) {
            println!("[bot] removed {} from {}", id.as_str(), origin.as_str());
            Ok(())
        } else {
            Err(cmb_core::Error::transport(
                "remove_participant",
                id.as_str().to_string(),
                "not a participant",
            ))
        }
    }

    async fn set_bio(&self, text: &str) -> Result<()> {
        println!("[bot] bio is now: {text}");
        Ok(())
    }
}

fn parse_line(line: &str, seq: u64) -> Option<TransportEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(id) = line.strip_prefix("join ") {
        return Some(TransportEvent::GroupJoin(GroupEvent {
            origin: OriginId(GROUP_ORIGIN.to_string()),
            participant: SenderId(id.trim().to_string()),
        }));
    }
    if let Some(id) = line.strip_prefix("leave ") {
        return Some(TransportEvent::GroupLeave(GroupEvent {
            origin: OriginId(GROUP_ORIGIN.to_string()),
            participant: SenderId(id.trim().to_string()),
        }));
    }

    let (body, sender, origin, is_group) = match line.strip_prefix("dm ") {
        Some(rest) => (rest, DM_SENDER, DM_SENDER, false),
        None => (line, GROUP_SENDER, GROUP_ORIGIN, true),
    };

    let mentions = body
        .split_whitespace()
        .filter_map(|t| t.strip_prefix('@'))
        .map(|t| SenderId(t.to_string()))
        .collect();

    Some(TransportEvent::Message(InboundMessage {
        id: MessageId(format!("console-{seq}")),
        sender: SenderId(sender.to_string()),
        origin: OriginId(origin.to_string()),
        body: body.to_string(),
        mentions,
        is_group,
    }))
}

/// Read stdin until EOF, feeding each line to the pipeline as an event.
pub async fn run(pipeline: Arc<Pipeline>, transport: Arc<ConsoleTransport>) -> anyhow::Result<()> {
    tracing::info!("console transport reading stdin (dm/join/leave directives available)");
    pipeline.handle_event(TransportEvent::Ready).await;
    pipeline.handle_event(TransportEvent::Authenticated).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut seq = 0u64;

    while let Some(line) = lines.next_line().await? {
        let Some(event) = parse_line(&line, seq) else {
            continue;
        };
        seq += 1;

        // Keep the harness's member list in step with join events so
        // groupinfo and kick behave sensibly.
        if let TransportEvent::GroupJoin(ev) = &event {
            transport.add_participant(&ev.participant);
        }

        pipeline.handle_event(event).await;
    }

    Ok(())
}
