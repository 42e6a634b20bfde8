use crate::models::{MessageRow, NewUser, PendingUserOutcome, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, Row};

const USER_COLUMNS: &str = "id, username, email, password, verify_code, verify_code_expiry, \
                            is_verified, is_accepting_messages, anon_shield, created_at";

impl Database {
    // -- Users --

    /// Register an unverified user, replacing any unverified placeholder that
    /// holds the same username or email. Verified holders win.
    pub fn register_pending_user(&self, user: &NewUser) -> Result<PendingUserOutcome> {
        self.with_tx(|tx| {
            let username_taken: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1 AND is_verified = 1)",
                [&user.username],
                |row| row.get(0),
            )?;
            if username_taken {
                return Ok(PendingUserOutcome::UsernameTaken);
            }

            let email_taken: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1 AND is_verified = 1)",
                [&user.email],
                |row| row.get(0),
            )?;
            if email_taken {
                return Ok(PendingUserOutcome::EmailTaken);
            }

            tx.execute(
                "DELETE FROM users WHERE is_verified = 0 AND (username = ?1 OR email = ?2)",
                (&user.username, &user.email),
            )?;
            tx.execute(
                "INSERT INTO users (id, username, email, password, verify_code, verify_code_expiry)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (
                    &user.id,
                    &user.username,
                    &user.email,
                    &user.password_hash,
                    &user.verify_code,
                    user.verify_code_expiry.to_rfc3339(),
                ),
            )?;
            Ok(PendingUserOutcome::Created)
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", id))
    }

    /// Any user holding the username, verified or not.
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", username))
    }

    pub fn get_verified_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1 AND is_verified = 1", username))
    }

    /// Look up a verified user by email or username.
    pub fn get_verified_user_by_identifier(&self, identifier: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            query_user(
                conn,
                "(email = ?1 OR username = ?1) AND is_verified = 1",
                identifier,
            )
        })
    }

    pub fn mark_verified(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("UPDATE users SET is_verified = 1 WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    /// Returns false when no such user exists. Setting the current value is
    /// still a match.
    pub fn set_accepting_messages(&self, id: &str, accepting: bool) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET is_accepting_messages = ?2 WHERE id = ?1",
                rusqlite::params![id, accepting],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn set_anon_shield(&self, id: &str, enabled: bool) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET anon_shield = ?2 WHERE id = ?1",
                rusqlite::params![id, enabled],
            )?;
            Ok(changed > 0)
        })
    }

    // -- Messages --

    pub fn insert_message(&self, message: &MessageRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, user_id, content, created_at) VALUES (?1, ?2, ?3, ?4)",
                (
                    &message.id,
                    &message.user_id,
                    &message.content,
                    &message.created_at,
                ),
            )?;
            Ok(())
        })
    }

    /// A user's messages, newest first.
    pub fn get_messages(&self, user_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, content, created_at
                 FROM messages
                 WHERE user_id = ?1
                 ORDER BY seq DESC",
            )?;

            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(MessageRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        content: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn count_messages(&self, user_id: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE user_id = ?1",
                [user_id],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
    }

    /// Delete one message owned by `user_id`. Returns false if the user has
    /// no message with that id.
    pub fn delete_message(&self, user_id: &str, message_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM messages WHERE id = ?1 AND user_id = ?2",
                [message_id, user_id],
            )?;
            Ok(changed > 0)
        })
    }
}

fn query_user(conn: &Connection, predicate: &str, arg: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {predicate}");
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row([arg], map_user).optional()?;
    Ok(row)
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        verify_code: row.get(4)?,
        verify_code_expiry: row.get(5)?,
        is_verified: row.get(6)?,
        is_accepting_messages: row.get(7)?,
        anon_shield: row.get(8)?,
        created_at: row.get(9)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
