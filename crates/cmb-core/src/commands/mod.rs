//! Command parsing and dispatch.
//!
//! A message is a command invocation iff its body starts with the *current*
//! prefix (exact, case-sensitive). The prefix is read from the state snapshot
//! taken once per message, so a concurrent `setprefix` only reclassifies
//! later messages.

pub mod calc;

use std::time::Duration;

use chrono::Local;
use rand::{seq::SliceRandom, Rng};
use tracing::warn;

use crate::{
    domain::{InboundMessage, OutboundAction},
    ports::ChatTransport,
    state::{default_bio, BotState, StateSnapshot},
};

/// Ephemeral, parsed once per message, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandInvocation {
    /// First token after the prefix, lowercased. Empty when the body was the
    /// bare prefix; that still claims the message (unknown command).
    pub name: String,
    pub args: Vec<String>,
}

/// Parse `body` against `prefix`. `None` means "not a command" and the
/// message falls through to the greeting stage.
pub fn parse_invocation(body: &str, prefix: &str) -> Option<CommandInvocation> {
    let rest = body.strip_prefix(prefix)?;
    let mut tokens = rest.split_whitespace();
    let name = tokens.next().unwrap_or("").to_lowercase();
    let args = tokens.map(|t| t.to_string()).collect();
    Some(CommandInvocation { name, args })
}

const QUOTES: &[&str] = &[
    "The best way to predict the future is to invent it.",
    "Simplicity is the ultimate sophistication.",
    "Talk is cheap. Show me the code.",
    "First, solve the problem. Then, write the code.",
    "Make it work, make it right, make it fast.",
];

const FACTS: &[&str] = &[
    "Honey never spoils.",
    "Octopuses have three hearts.",
    "Bananas are berries, but strawberries are not.",
    "A group of flamingos is called a flamboyance.",
    "Hot water can freeze faster than cold water.",
];

/// Dispatch a parsed invocation to its handler.
///
/// Every branch returns its actions; the router never falls through to
/// greeting handling. State mutations (`setprefix`, `setbio`) happen here;
/// membership removals are emitted as actions and executed downstream so the
/// per-id outcome notice can reflect what actually happened.
pub async fn route(
    inv: &CommandInvocation,
    msg: &InboundMessage,
    state: &BotState,
    snap: &StateSnapshot,
    transport: &dyn ChatTransport,
) -> Vec<OutboundAction> {
    let prefix = &snap.prefix;

    match inv.name.as_str() {
        "ping" => vec![OutboundAction::Reply("pong".to_string())],

        "help" => vec![OutboundAction::Reply(help_text(prefix))],

        "say" => {
            if inv.args.is_empty() {
                vec![OutboundAction::Reply("There is no message to say.".to_string())]
            } else {
                vec![OutboundAction::Reply(inv.args.join(" "))]
            }
        }

        "roll" => {
            let n = rand::thread_rng().gen_range(1..=100);
            vec![OutboundAction::Reply(format!("You rolled a {n}!"))]
        }

        "uptime" => vec![OutboundAction::Reply(format!(
            "Uptime: {}",
            format_uptime(state.uptime())
        ))],

        "setbio" => {
            let bio = if inv.args.is_empty() {
                default_bio(Local::now())
            } else {
                inv.args.join(" ")
            };
            state.set_bio(&bio).await;
            if let Err(e) = transport.set_bio(&bio).await {
                warn!(error = %e, "bio update was not pushed upstream");
            }
            vec![OutboundAction::Reply(format!("Bio updated: {bio}"))]
        }

        "setprefix" => {
            if inv.args.len() != 1 {
                vec![OutboundAction::Reply(format!(
                    "Usage: {prefix}setprefix <new-prefix>"
                ))]
            } else {
                let new_prefix = inv.args[0].clone();
                state.set_prefix(&new_prefix).await;
                vec![OutboundAction::Reply(format!(
                    "Prefix changed to {new_prefix}"
                ))]
            }
        }

        "status" => vec![OutboundAction::Reply(format!(
            "Up {} | time {} | prefix {prefix}",
            format_uptime(state.uptime()),
            Local::now().format("%H:%M:%S"),
        ))],

        "groupinfo" => {
            if !msg.is_group {
                return vec![OutboundAction::Reply(
                    "This command only works in group chats.".to_string(),
                )];
            }
            match transport.get_chat(&msg.origin).await {
                Ok(info) => {
                    let description = info
                        .description
                        .unwrap_or_else(|| "No description set.".to_string());
                    vec![OutboundAction::Reply(format!(
                        "{}\nParticipants: {}\n{description}",
                        info.name,
                        info.participants.len(),
                    ))]
                }
                Err(e) => {
                    warn!(origin = msg.origin.as_str(), error = %e, "get_chat failed");
                    vec![OutboundAction::Reply(
                        "Couldn't fetch group info right now.".to_string(),
                    )]
                }
            }
        }

        "calc" => {
            let expr = inv.args.join(" ");
            match calc::evaluate(&expr) {
                Ok(value) => vec![OutboundAction::Reply(format!(
                    "{expr} = {}",
                    format_number(value)
                ))],
                Err(_) => vec![OutboundAction::Reply("Invalid expression.".to_string())],
            }
        }

        "weather" => {
            if inv.args.is_empty() {
                vec![OutboundAction::Reply(format!(
                    "Usage: {prefix}weather <city>"
                ))]
            } else {
                let city = inv.args.join(" ");
                let temp = rand::thread_rng().gen_range(10..=39);
                vec![OutboundAction::Reply(format!(
                    "It's {temp}\u{b0}C in {city} right now."
                ))]
            }
        }

        "quote" => vec![OutboundAction::Reply(pick(QUOTES))],

        "fact" => vec![OutboundAction::Reply(pick(FACTS))],

        "kick" => {
            if !msg.is_group {
                return vec![OutboundAction::Reply(
                    "This command only works in group chats.".to_string(),
                )];
            }
            if msg.mentions.is_empty() {
                return vec![OutboundAction::Reply(
                    "Mention the participants you want to kick.".to_string(),
                )];
            }
            msg.mentions
                .iter()
                .map(|id| OutboundAction::RemoveParticipant(id.clone()))
                .collect()
        }

        unknown => vec![OutboundAction::Reply(format!(
            "Unknown command: {unknown}. Try {prefix}help"
        ))],
    }
}

fn pick(entries: &[&str]) -> String {
    entries
        .choose(&mut rand::thread_rng())
        .unwrap_or(&"")
        .to_string()
}

fn help_text(prefix: &str) -> String {
    format!(
        "Commands:\n\
{prefix}ping - check the bot is alive\n\
{prefix}help - this list\n\
{prefix}say <text> - repeat after you\n\
{prefix}roll - roll a d100\n\
{prefix}uptime - time since start\n\
{prefix}setbio [text] - set or refresh the bio\n\
{prefix}setprefix <p> - change the command prefix\n\
{prefix}status - uptime, time and prefix\n\
{prefix}groupinfo - group name and members (groups only)\n\
{prefix}calc <expr> - arithmetic\n\
{prefix}weather <city> - totally real forecast\n\
{prefix}quote / {prefix}fact - random wisdom\n\
{prefix}kick @someone - remove a participant (groups only)"
    )
}

/// `HhMmSs` uptime rendering; hours are included even when zero.
pub fn format_uptime(d: Duration) -> String {
    let total = d.as_secs();
    let hours = total / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours}h {mins}m {secs}s")
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::domain::{ChatInfo, MessageId, OriginId, SenderId};
    use crate::Result;

    struct FakeTransport {
        chat: Option<ChatInfo>,
        bio_pushes: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        fn new() -> Self {
            Self {
                chat: None,
                bio_pushes: Mutex::new(Vec::new()),
            }
        }

        fn with_chat(chat: ChatInfo) -> Self {
            Self {
                chat: Some(chat),
                bio_pushes: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatTransport for FakeTransport {
        async fn reply(&self, _msg: &InboundMessage, _text: &str) -> Result<()> {
            Ok(())
        }

        async fn send_to_origin(
            &self,
            _origin: &OriginId,
            _text: &str,
            _mentions: &[SenderId],
        ) -> Result<()> {
            Ok(())
        }

        async fn delete_message(&self, _msg: &InboundMessage, _everyone: bool) -> Result<()> {
            Ok(())
        }

        async fn get_chat(&self, origin: &OriginId) -> Result<ChatInfo> {
            self.chat.clone().ok_or_else(|| {
                crate::Error::transport("get_chat", origin.as_str().to_string(), "no chat")
            })
        }

        async fn remove_participant(&self, _origin: &OriginId, _id: &SenderId) -> Result<()> {
            Ok(())
        }

        async fn set_bio(&self, text: &str) -> Result<()> {
            self.bio_pushes.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn message(body: &str, is_group: bool, mentions: Vec<&str>) -> InboundMessage {
        InboundMessage {
            id: MessageId("m1".to_string()),
            sender: SenderId("sender@c.us".to_string()),
            origin: OriginId(if is_group {
                "group@g.us".to_string()
            } else {
                "sender@c.us".to_string()
            }),
            body: body.to_string(),
            mentions: mentions
                .into_iter()
                .map(|m| SenderId(m.to_string()))
                .collect(),
            is_group,
        }
    }

    async fn run(body: &str, is_group: bool, mentions: Vec<&str>) -> Vec<OutboundAction> {
        let state = BotState::new(".");
        let snap = state.snapshot().await;
        let transport = FakeTransport::new();
        let msg = message(body, is_group, mentions);
        let inv = parse_invocation(&msg.body, &snap.prefix).expect("is a command");
        route(&inv, &msg, &state, &snap, &transport).await
    }

    #[test]
    fn parsing_requires_exact_prefix() {
        assert!(parse_invocation("ping", ".").is_none());
        assert!(parse_invocation("!ping", ".").is_none());
        assert!(parse_invocation(".ping", ".").is_some());
    }

    #[test]
    fn parsing_lowercases_command_and_splits_args() {
        let inv = parse_invocation(".SAY  Hello   World", ".").unwrap();
        assert_eq!(inv.name, "say");
        assert_eq!(inv.args, vec!["Hello", "World"]);
    }

    #[test]
    fn bare_prefix_is_still_an_invocation() {
        let inv = parse_invocation(".", ".").unwrap();
        assert_eq!(inv.name, "");
    }

    #[tokio::test]
    async fn ping_yields_exactly_one_pong() {
        let actions = run(".ping", false, vec![]).await;
        assert_eq!(actions, vec![OutboundAction::Reply("pong".to_string())]);
    }

    #[tokio::test]
    async fn say_joins_args_and_rejects_empty() {
        let actions = run(".say hello   world", false, vec![]).await;
        assert_eq!(
            actions,
            vec![OutboundAction::Reply("hello world".to_string())]
        );

        let actions = run(".say", false, vec![]).await;
        assert_eq!(
            actions,
            vec![OutboundAction::Reply(
                "There is no message to say.".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn roll_stays_in_range() {
        for _ in 0..50 {
            let actions = run(".roll", false, vec![]).await;
            let OutboundAction::Reply(text) = &actions[0] else {
                panic!("expected reply");
            };
            let n: u32 = text
                .trim_start_matches("You rolled a ")
                .trim_end_matches('!')
                .parse()
                .unwrap();
            assert!((1..=100).contains(&n));
        }
    }

    #[tokio::test]
    async fn setprefix_requires_exactly_one_arg() {
        let actions = run(".setprefix", false, vec![]).await;
        assert_eq!(
            actions,
            vec![OutboundAction::Reply(
                "Usage: .setprefix <new-prefix>".to_string()
            )]
        );

        let actions = run(".setprefix ! extra", false, vec![]).await;
        assert!(matches!(&actions[0], OutboundAction::Reply(t) if t.starts_with("Usage:")));
    }

    #[tokio::test]
    async fn setprefix_mutates_state() {
        let state = BotState::new(".");
        let snap = state.snapshot().await;
        let transport = FakeTransport::new();
        let msg = message(".setprefix !", false, vec![]);
        let inv = parse_invocation(&msg.body, &snap.prefix).unwrap();

        route(&inv, &msg, &state, &snap, &transport).await;
        assert_eq!(state.snapshot().await.prefix, "!");
    }

    #[tokio::test]
    async fn setbio_stores_and_pushes_upstream() {
        let state = BotState::new(".");
        let snap = state.snapshot().await;
        let transport = FakeTransport::new();
        let msg = message(".setbio busy saving the world", false, vec![]);
        let inv = parse_invocation(&msg.body, &snap.prefix).unwrap();

        let actions = route(&inv, &msg, &state, &snap, &transport).await;
        assert_eq!(state.snapshot().await.bio, "busy saving the world");
        assert_eq!(
            transport.bio_pushes.lock().unwrap().as_slice(),
            &["busy saving the world".to_string()]
        );
        assert!(matches!(&actions[0], OutboundAction::Reply(t) if t.contains("busy saving")));
    }

    #[tokio::test]
    async fn setbio_without_args_generates_timestamped_default() {
        let actions = run(".setbio", false, vec![]).await;
        let OutboundAction::Reply(text) = &actions[0] else {
            panic!("expected reply");
        };
        assert!(text.contains("Online and moderating |"));
    }

    #[tokio::test]
    async fn groupinfo_refuses_outside_groups() {
        let actions = run(".groupinfo", false, vec![]).await;
        assert!(matches!(&actions[0], OutboundAction::Reply(t) if t.contains("group chats")));
    }

    #[tokio::test]
    async fn groupinfo_reports_chat_metadata() {
        let state = BotState::new(".");
        let snap = state.snapshot().await;
        let transport = FakeTransport::with_chat(ChatInfo {
            name: "Rustaceans".to_string(),
            participants: vec![
                SenderId("a@c.us".to_string()),
                SenderId("b@c.us".to_string()),
            ],
            description: None,
        });
        let msg = message(".groupinfo", true, vec![]);
        let inv = parse_invocation(&msg.body, &snap.prefix).unwrap();

        let actions = route(&inv, &msg, &state, &snap, &transport).await;
        let OutboundAction::Reply(text) = &actions[0] else {
            panic!("expected reply");
        };
        assert!(text.contains("Rustaceans"));
        assert!(text.contains("Participants: 2"));
        assert!(text.contains("No description set."));
    }

    #[tokio::test]
    async fn calc_evaluates_and_reports_invalid_input() {
        let actions = run(".calc 2 + 3 * 4", false, vec![]).await;
        assert_eq!(
            actions,
            vec![OutboundAction::Reply("2 + 3 * 4 = 14".to_string())]
        );

        let actions = run(".calc drop table users", false, vec![]).await;
        assert_eq!(
            actions,
            vec![OutboundAction::Reply("Invalid expression.".to_string())]
        );
    }

    #[tokio::test]
    async fn weather_needs_a_city() {
        let actions = run(".weather", false, vec![]).await;
        assert!(matches!(&actions[0], OutboundAction::Reply(t) if t.starts_with("Usage:")));

        let actions = run(".weather Buenos Aires", false, vec![]).await;
        let OutboundAction::Reply(text) = &actions[0] else {
            panic!("expected reply");
        };
        assert!(text.contains("Buenos Aires"));
    }

    #[tokio::test]
    async fn kick_is_group_only_and_needs_mentions() {
        let actions = run(".kick", false, vec![]).await;
        assert!(matches!(&actions[0], OutboundAction::Reply(t) if t.contains("group chats")));

        let actions = run(".kick", true, vec![]).await;
        assert_eq!(
            actions,
            vec![OutboundAction::Reply(
                "Mention the participants you want to kick.".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn kick_emits_one_removal_per_mention() {
        let actions = run(".kick", true, vec!["a@c.us", "b@c.us"]).await;
        assert_eq!(
            actions,
            vec![
                OutboundAction::RemoveParticipant(SenderId("a@c.us".to_string())),
                OutboundAction::RemoveParticipant(SenderId("b@c.us".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn unknown_command_is_reported() {
        let actions = run(".frobnicate", false, vec![]).await;
        assert!(matches!(&actions[0], OutboundAction::Reply(t) if t.contains("Unknown command")));
    }

    #[test]
    fn uptime_format_always_includes_hours() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0h 0m 0s");
        assert_eq!(format_uptime(Duration::from_secs(3725)), "1h 2m 5s");
        assert_eq!(format_uptime(Duration::from_secs(59)), "0h 0m 59s");
    }
}
