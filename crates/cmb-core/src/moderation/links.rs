use std::sync::OnceLock;

use regex::Regex;

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)https?://\S+").expect("link regex is valid"))
}

/// True iff `body` contains an http(s) URL anywhere, case-insensitively.
/// Pure and stateless; multiple matches are irrelevant.
pub fn contains_link(body: &str) -> bool {
    link_re().is_match(body)
}
