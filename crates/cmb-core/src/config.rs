use std::{env, fs, path::Path, path::PathBuf, time::Duration};

/// Typed configuration for the bot, loaded from the environment with an
/// optional `.env` file.
///
/// The runtime-mutable pieces (prefix, bio) start from these values but live
/// in [`crate::state::BotState`] afterwards.
#[derive(Clone, Debug)]
pub struct Config {
    /// Initial command prefix, e.g. `"."`.
    pub prefix: String,

    // Spam rate limiting
    pub spam_threshold: u32,
    pub spam_window: Duration,

    // Greeting responder
    pub greeting_words: Vec<String>,
    pub greeting_reply: String,

    // Bio refresh
    pub bio_refresh_interval: Duration,

    // Command usage sink (disabled when unset)
    pub usage_log_path: Option<PathBuf>,
}

impl Config {
    pub fn load() -> crate::Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let prefix = env_str("BOT_PREFIX").unwrap_or_else(|| ".".to_string());
        if prefix.trim().is_empty() {
            return Err(crate::Error::Config(
                "BOT_PREFIX must not be empty".to_string(),
            ));
        }

        let spam_threshold = env_u32("SPAM_THRESHOLD").unwrap_or(5);
        let spam_window = Duration::from_millis(env_u64("SPAM_WINDOW_MS").unwrap_or(10_000));

        let greeting_words = parse_csv_lower(
            env_str("GREETING_WORDS").or_else(|| Some("hello,hi,hey".to_string())),
        );
        let greeting_reply =
            env_str("GREETING_REPLY").unwrap_or_else(|| "Hey there! How can I help?".to_string());

        let bio_refresh_interval =
            Duration::from_secs(env_u64("BIO_REFRESH_SECS").unwrap_or(59));

        let usage_log_path = env::var_os("USAGE_LOG_PATH").map(PathBuf::from);

        Ok(Self {
            prefix,
            spam_threshold,
            spam_window,
            greeting_words,
            greeting_reply,
            bio_refresh_interval,
            usage_log_path,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    env_str(key).and_then(|s| s.trim().parse::<u32>().ok())
}

fn parse_csv_lower(v: Option<String>) -> Vec<String> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
