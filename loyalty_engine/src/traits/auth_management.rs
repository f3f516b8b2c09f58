use thiserror::Error;

use crate::db_types::User;

/// The credential store. Passwords arrive here already hashed; the trait never sees a plaintext password.
#[allow(async_fn_in_trait)]
pub trait AuthManagement {
    /// Creates a new user. Fails with [`AuthApiError::LoginTaken`] when the login already exists.
    async fn create_user(&self, login: &str, password_hash: &str) -> Result<User, AuthApiError>;

    async fn fetch_user_by_login(&self, login: &str) -> Result<Option<User>, AuthApiError>;

    async fn fetch_user_by_id(&self, id: i64) -> Result<Option<User>, AuthApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Login is already taken")]
    LoginTaken,
    #[error("Invalid login or password")]
    InvalidCredentials,
    #[error("Could not hash the supplied password. {0}")]
    PasswordHash(String),
}

impl From<sqlx::Error> for AuthApiError {
    fn from(e: sqlx::Error) -> Self {
        AuthApiError::DatabaseError(e.to_string())
    }
}
