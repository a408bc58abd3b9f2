use rand::distr::Alphanumeric;
use rand::Rng;
use rusqlite::{Connection, OptionalExtension};

use crate::error::{invalid, Error, Result};
use crate::model::User;

const TOKEN_LEN: usize = 40;

fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

fn read_user_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
    })
}

/// Create a user and return it together with its bearer token.
pub fn create_user(conn: &Connection, name: &str) -> Result<(User, String)> {
    let name = name.trim();
    if name.is_empty() {
        invalid!("user name must not be empty");
    }
    if find_user(conn, name)?.is_some() {
        return Err(Error::Conflict(format!("user '{name}' already exists")));
    }
    let token = generate_token();
    conn.execute(
        "INSERT INTO users (name, token) VALUES (?1, ?2)",
        rusqlite::params![name, token],
    )?;
    let user = conn.query_row(
        "SELECT id, name, created_at FROM users WHERE id = ?1",
        [conn.last_insert_rowid()],
        read_user_row,
    )?;
    Ok((user, token))
}

pub fn find_user(conn: &Connection, name: &str) -> Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, name, created_at FROM users WHERE name = ?1",
            [name],
            read_user_row,
        )
        .optional()?;
    Ok(user)
}

/// Look a user up by name, failing with `Authentication` when unknown.
pub fn require_user(conn: &Connection, name: &str) -> Result<User> {
    find_user(conn, name)?.ok_or_else(|| Error::Authentication(format!("unknown user '{name}'")))
}

/// Resolve a bearer token to its user.
pub fn authenticate(conn: &Connection, token: &str) -> Result<User> {
    if token.is_empty() {
        return Err(Error::Authentication("missing bearer token".into()));
    }
    conn.query_row(
        "SELECT id, name, created_at FROM users WHERE token = ?1",
        [token],
        read_user_row,
    )
    .optional()?
    .ok_or_else(|| Error::Authentication("invalid bearer token".into()))
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
