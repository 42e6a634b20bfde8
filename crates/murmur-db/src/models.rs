//! Database row types — these map directly to SQLite rows.
//! Distinct from murmur-types API models to keep the DB layer independent.

use chrono::{DateTime, NaiveDateTime, Utc};

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub verify_code: String,
    pub verify_code_expiry: String,
    pub is_verified: bool,
    pub is_accepting_messages: bool,
    pub anon_shield: bool,
    pub created_at: String,
}

/// Everything needed to insert a fresh, unverified user.
pub struct NewUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub verify_code: String,
    pub verify_code_expiry: DateTime<Utc>,
}

pub struct MessageRow {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: String,
}

/// Result of registering an unverified user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingUserOutcome {
    /// Inserted; any earlier unverified placeholder for the same username or
    /// email was replaced.
    Created,
    UsernameTaken,
    EmailTaken,
}

/// Parse a stored timestamp. Rows written by this crate are RFC 3339;
/// SQLite's `datetime('now')` default is "YYYY-MM-DD HH:MM:SS" in UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>().ok().or_else(|| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|ndt| ndt.and_utc())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_both_timestamp_forms() {
        let rfc = parse_timestamp("2026-03-01T10:20:30.123Z").unwrap();
        assert_eq!((rfc.year(), rfc.hour(), rfc.second()), (2026, 10, 30));

        let sqlite = parse_timestamp("2026-03-01 10:20:30").unwrap();
        assert_eq!(sqlite.minute(), 20);

        assert!(parse_timestamp("yesterday").is_none());
    }
}
