use std::sync::Arc;
use secrecy::ExposeSecret;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::jwt::{generate_token, AuthError};
use crate::config::jwt::JwtSettings;
use crate::db::{StoreError, UserRepository};
use crate::errors::AppError;
use crate::models::auth::LoginRequest;
use crate::models::user::{NewUser, RegistrationRequest, User};
use crate::utils::password::{hash_password, verify_password};

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    Validation(String),

    #[error("Password must be at least 6 characters long")]
    WeakPassword,

    #[error("Username or email already exists")]
    DuplicateIdentity,

    #[error("Invalid username or password")]
    UnknownUser,

    #[error("Invalid username or password")]
    InvalidCredential,

    #[error("Failed to hash password: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Failed to issue token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation(_) => SessionError::DuplicateIdentity,
            other => SessionError::Store(other),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Validation(message) => AppError::validation(message),
            SessionError::WeakPassword => AppError::BadRequest {
                reason: "weak_password",
                message: SessionError::WeakPassword.to_string(),
            },
            SessionError::DuplicateIdentity => AppError::Conflict {
                reason: "duplicate_identity",
                message: SessionError::DuplicateIdentity.to_string(),
            },
            // Both login failures look the same from outside
            SessionError::UnknownUser | SessionError::InvalidCredential => {
                AppError::Auth(AuthError::InvalidCredentials)
            }
            SessionError::Hash(e) => AppError::Internal(e.to_string()),
            SessionError::Token(e) => AppError::Internal(e.to_string()),
            SessionError::Store(e) => AppError::Store(e),
        }
    }
}

/// A freshly authenticated user together with their bearer token.
#[derive(Debug)]
pub struct Session {
    pub user: User,
    pub token: String,
}

pub struct SessionService {
    users: Arc<dyn UserRepository>,
    jwt_settings: Arc<JwtSettings>,
    password_cost: u32,
    // Verified against on unknown usernames so both login failures cost a hash
    dummy_hash: String,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        jwt_settings: Arc<JwtSettings>,
        password_cost: u32,
    ) -> Result<Self, SessionError> {
        let dummy_hash = hash_password("medimate-dummy-password", password_cost)?;
        Ok(Self {
            users,
            jwt_settings,
            password_cost,
            dummy_hash,
        })
    }

    #[tracing::instrument(name = "Register user", skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: &RegistrationRequest) -> Result<Session, SessionError> {
        let username = request.username.trim();
        let email = request.email.trim();
        let password = request.password.expose_secret();

        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(SessionError::Validation(
                "Username, email and password are required".to_string(),
            ));
        }
        if !email.contains('@') {
            return Err(SessionError::Validation("Email address is not valid".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(SessionError::WeakPassword);
        }

        if self.users.find_by_username(username).await?.is_some()
            || self.users.find_by_email(email).await?.is_some()
        {
            tracing::info!("Registration rejected: identity already taken");
            return Err(SessionError::DuplicateIdentity);
        }

        let password_hash = hash_password(password, self.password_cost)?;
        let user = self
            .users
            .insert(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await?;

        let token = generate_token(user.id, &user.username, &self.jwt_settings)?;
        tracing::info!(user_id = %user.id, "User registered");
        Ok(Session { user, token })
    }

    #[tracing::instrument(name = "Login user", skip(self, request), fields(username = %request.username))]
    pub async fn login(&self, request: &LoginRequest) -> Result<Session, SessionError> {
        let username = request.username.trim();
        if username.is_empty() || request.password.expose_secret().is_empty() {
            return Err(SessionError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let user = match self.users.find_by_username(username).await? {
            Some(user) => user,
            None => {
                verify_password(request.password.expose_secret(), &self.dummy_hash);
                tracing::info!("User not found");
                return Err(SessionError::UnknownUser);
            }
        };

        if !verify_password(request.password.expose_secret(), &user.password_hash) {
            tracing::info!("Invalid password");
            return Err(SessionError::InvalidCredential);
        }

        let token = generate_token(user.id, &user.username, &self.jwt_settings)?;
        Ok(Session { user, token })
    }

    pub async fn current_user(&self, user_id: Uuid) -> Result<Option<User>, SessionError> {
        Ok(self.users.find_by_id(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::decode_token;
    use crate::db::MemoryStore;
    use secrecy::SecretString;

    fn secret(value: &str) -> SecretString {
        SecretString::new(value.to_string().into_boxed_str())
    }

    fn service() -> SessionService {
        let jwt = Arc::new(JwtSettings::new("test-secret".to_string(), 24));
        SessionService::new(Arc::new(MemoryStore::new()), jwt, 4).unwrap()
    }

    fn registration(username: &str, email: &str, password: &str) -> RegistrationRequest {
        RegistrationRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: secret(password),
        }
    }

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: secret(password),
        }
    }

    #[tokio::test]
    async fn register_issues_token_for_new_user() {
        let service = service();
        let session = service
            .register(&registration("alice", "alice@x.com", "secret1"))
            .await
            .unwrap();

        assert_ne!(session.user.password_hash, "secret1");
        let jwt = JwtSettings::new("test-secret".to_string(), 24);
        let claims = decode_token(&session.token, &jwt).unwrap();
        assert_eq!(claims.user_id(), Some(session.user.id));
        assert_eq!(claims.username, "alice");
    }

    #[tokio::test]
    async fn second_registration_with_same_identity_conflicts() {
        let service = service();
        service.register(&registration("alice", "alice@x.com", "secret1")).await.unwrap();

        let same_name = service.register(&registration("alice", "other@x.com", "secret1")).await;
        assert!(matches!(same_name, Err(SessionError::DuplicateIdentity)));

        let same_email = service.register(&registration("bob", "alice@x.com", "secret1")).await;
        assert!(matches!(same_email, Err(SessionError::DuplicateIdentity)));
    }

    #[tokio::test]
    async fn short_password_is_weak() {
        let result = service().register(&registration("alice", "alice@x.com", "12345")).await;
        assert!(matches!(result, Err(SessionError::WeakPassword)));
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable_to_clients() {
        let service = service();
        service.register(&registration("alice", "alice@x.com", "secret1")).await.unwrap();

        let wrong = service.login(&login("alice", "wrongpass")).await.unwrap_err();
        let unknown = service.login(&login("mallory", "secret1")).await.unwrap_err();
        assert!(matches!(wrong, SessionError::InvalidCredential));
        assert!(matches!(unknown, SessionError::UnknownUser));

        let wrong = AppError::from(wrong);
        let unknown = AppError::from(unknown);
        assert_eq!(wrong.reason(), unknown.reason());
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn login_returns_token_for_stored_user() {
        let service = service();
        let registered = service
            .register(&registration("alice", "alice@x.com", "secret1"))
            .await
            .unwrap();
        let session = service.login(&login("alice", "secret1")).await.unwrap();
        assert_eq!(session.user.id, registered.user.id);
    }
}
