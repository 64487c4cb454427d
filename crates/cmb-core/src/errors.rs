/// Core error type for the bot.
///
/// Adapter crates should map their transport-specific failures into
/// `Error::Transport` so the pipeline can log them uniformly (action kind +
/// target id) and keep going. Malformed command usage and invalid calc
/// expressions are *not* errors; they are reported to the user as replies.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("transport action failed: {action} on {target}: {reason}")]
    Transport {
        action: &'static str,
        target: String,
        reason: String,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn transport(action: &'static str, target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            action,
            target: target.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
