use log::debug;
use sqlx::SqliteConnection;

use crate::{db_types::User, traits::AuthApiError};

/// Creates a new user row. The uniqueness constraint on `login` turns a duplicate registration into a clean
/// [`AuthApiError::LoginTaken`] instead of a raw database error.
pub async fn insert_user(
    login: &str,
    password_hash: &str,
    conn: &mut SqliteConnection,
) -> Result<User, AuthApiError> {
    let user: Option<User> = sqlx::query_as(
        r#"
            INSERT INTO users (login, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (login) DO NOTHING
            RETURNING *;
        "#,
    )
    .bind(login)
    .bind(password_hash)
    .fetch_optional(conn)
    .await?;
    match user {
        Some(user) => {
            debug!("🧑️ User {} registered with id {}", user.login, user.id);
            Ok(user)
        },
        None => Err(AuthApiError::LoginTaken),
    }
}

pub async fn fetch_user_by_login(login: &str, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE login = $1").bind(login).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn fetch_user_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(user)
}
