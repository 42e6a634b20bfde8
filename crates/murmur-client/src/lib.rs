//! Client side of Murmur: a typed HTTP client for the server's JSON API and
//! the advisory moderation checker that gates a compose form.

pub mod checker;
pub mod client;

pub use checker::{ModerationChecker, ModerationReport};
pub use client::{ClientError, MurmurClient};
