//! Moderation primitives: the per-sender spam guard and the link detector.

pub mod links;
pub mod rate_limit;

pub use links::contains_link;
pub use rate_limit::{SpamGuard, Verdict};
