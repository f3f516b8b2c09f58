use std::fmt::Debug;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use log::*;

use crate::{
    db_types::User,
    traits::{AuthApiError, AuthManagement},
};

/// `AuthApi` is the credential store: it registers users and verifies logins. Passwords are hashed with Argon2 in
/// PHC string format; the plaintext never reaches the storage layer.
pub struct AuthApi<B> {
    db: B,
}

impl<B> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi")
    }
}

impl<B> AuthApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AuthApi<B>
where B: AuthManagement
{
    /// Registers a new user. A duplicate login fails with [`AuthApiError::LoginTaken`].
    pub async fn register(&self, login: &str, password: &str) -> Result<User, AuthApiError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthApiError::PasswordHash(e.to_string()))?
            .to_string();
        let user = self.db.create_user(login, &hash).await?;
        info!("🔐️ New user registered: {} (#{})", user.login, user.id);
        Ok(user)
    }

    /// Verifies a login/password pair. Unknown logins and wrong passwords are indistinguishable to the caller.
    pub async fn verify(&self, login: &str, password: &str) -> Result<User, AuthApiError> {
        let user = self.db.fetch_user_by_login(login).await?.ok_or(AuthApiError::InvalidCredentials)?;
        let parsed = PasswordHash::new(&user.password_hash).map_err(|e| {
            error!("🔐️ Stored password hash for user #{} is unparsable. {e}", user.id);
            AuthApiError::InvalidCredentials
        })?;
        Argon2::default().verify_password(password.as_bytes(), &parsed).map_err(|_| {
            debug!("🔐️ Password verification failed for login {login}");
            AuthApiError::InvalidCredentials
        })?;
        Ok(user)
    }

    pub async fn user_by_id(&self, id: i64) -> Result<Option<User>, AuthApiError> {
        self.db.fetch_user_by_id(id).await
    }
}
