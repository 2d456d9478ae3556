use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{AuthError, PasswordError, PasswordHasher, TokenPair, TokenService, TokenType};
use crate::database::models::{NewUser, User};
use crate::database::{Store, StoreError};
use crate::error::ApiError;
use crate::services::validation::{
    normalize_email, validate_email_format, validate_name, validate_password,
};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("email already registered")]
    EmailTaken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("refresh token rejected")]
    RefreshRejected,

    #[error("account not found")]
    NotFound,

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Token(#[from] AuthError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmailTaken => AccountError::EmailTaken,
            StoreError::NotFound(_) => AccountError::NotFound,
            other => AccountError::Store(other),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Invalid { field, reason } => ApiError::field_error(field, reason),
            AccountError::EmailTaken => ApiError::conflict("Email is already registered"),
            AccountError::InvalidCredentials => ApiError::invalid_credentials(),
            AccountError::RefreshRejected => ApiError::unauthorized(),
            AccountError::NotFound => ApiError::not_found("User not found"),
            AccountError::Store(e) => e.into(),
            AccountError::Token(e) => e.into(),
            AccountError::Password(e) => e.into(),
        }
    }
}

fn invalid(field: &'static str) -> impl FnOnce(String) -> AccountError {
    move |reason| AccountError::Invalid { field, reason }
}

/// Fields accepted when creating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Partial profile change. `None` leaves the field as is.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Account plus a freshly minted token pair.
#[derive(Debug, Serialize)]
pub struct Session {
    pub user: User,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Registration, login, refresh and profile management over the credential store.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    tokens: Arc<TokenService>,
    passwords: PasswordHasher,
    password_min_length: usize,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn Store>,
        tokens: Arc<TokenService>,
        passwords: PasswordHasher,
        password_min_length: usize,
    ) -> Self {
        Self {
            store,
            tokens,
            passwords,
            password_min_length,
        }
    }

    /// Validate and persist a new account. No tokens are issued.
    pub async fn create_account(&self, account: NewAccount) -> Result<User, AccountError> {
        validate_name(&account.name).map_err(invalid("name"))?;
        let email = normalize_email(&account.email);
        validate_email_format(&email).map_err(invalid("email"))?;
        validate_password(&account.password, self.password_min_length).map_err(invalid("password"))?;

        let password_hash = self.passwords.hash(&account.password).await?;
        let user = self
            .store
            .create_user(NewUser {
                name: account.name.trim().to_string(),
                email,
                password_hash,
            })
            .await?;

        info!(user_id = user.id, "account created");
        Ok(user)
    }

    /// Create an account and sign it in.
    pub async fn register(&self, account: NewAccount) -> Result<Session, AccountError> {
        let user = self.create_account(account).await?;
        let tokens = self.tokens.issue(user.id)?;
        Ok(Session { user, tokens })
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AccountError> {
        let email = normalize_email(email);

        let Some(user) = self.store.find_user_by_email(&email).await? else {
            self.passwords.verify_decoy(password).await;
            warn!("login rejected: unknown account");
            return Err(AccountError::InvalidCredentials);
        };

        if !self.passwords.verify(password, &user.password_hash).await {
            warn!(user_id = user.id, "login rejected: password mismatch");
            return Err(AccountError::InvalidCredentials);
        }

        let tokens = self.tokens.issue(user.id)?;
        info!(user_id = user.id, "login succeeded");
        Ok(Session { user, tokens })
    }

    /// Exchange a refresh token for a new pair. The presented token stays valid until it
    /// expires.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AccountError> {
        let user_id = self
            .tokens
            .verify(refresh_token, TokenType::Refresh)
            .map_err(|reason| {
                warn!("refresh rejected: {}", reason);
                AccountError::RefreshRejected
            })?;

        if self.store.find_user_by_id(user_id).await?.is_none() {
            warn!(user_id, "refresh rejected: account no longer active");
            return Err(AccountError::RefreshRejected);
        }

        Ok(self.tokens.issue(user_id)?)
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        changes: ProfileChanges,
    ) -> Result<User, AccountError> {
        let mut user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or(AccountError::NotFound)?;

        if let Some(name) = changes.name {
            validate_name(&name).map_err(invalid("name"))?;
            user.name = name.trim().to_string();
        }

        if let Some(email) = changes.email {
            let email = normalize_email(&email);
            validate_email_format(&email).map_err(invalid("email"))?;
            user.email = email;
        }

        if let Some(password) = changes.password {
            validate_password(&password, self.password_min_length).map_err(invalid("password"))?;
            user.password_hash = self.passwords.hash(&password).await?;
        }

        let saved = self.store.save_user(&user).await?;
        info!(user_id, "profile updated");
        Ok(saved)
    }

    /// Soft delete. Refresh is refused from now on; access tokens lapse at expiry.
    pub async fn delete_account(&self, user_id: i64) -> Result<(), AccountError> {
        self.store.soft_delete_user(user_id).await?;
        info!(user_id, "account deleted");
        Ok(())
    }
}
