use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Password;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::DEFAULT_TIME_ZONE;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user and credential operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
/// Hashing and hash verification run on the blocking thread pool.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: auth::PasswordHasher,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    pub fn new(repository: Arc<UR>) -> Self {
        Self {
            repository,
            password_hasher: auth::PasswordHasher::new(),
        }
    }

    async fn hash_secret(&self, secret: String) -> Result<String, UserError> {
        let hasher = self.password_hasher;
        tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| UserError::Unknown(format!("Hashing task failed: {}", e)))?
            .map_err(UserError::from)
    }

    async fn verify_secret(&self, secret: String, hash: String) -> Result<bool, UserError> {
        let hasher = self.password_hasher;
        tokio::task::spawn_blocking(move || hasher.verify(&secret, &hash))
            .await
            .map_err(|e| UserError::Unknown(format!("Verification task failed: {}", e)))?
            .map_err(UserError::from)
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        let password_hash = self
            .hash_secret(command.password.as_str().to_string())
            .await?;

        let email = command.email.clone();
        let new_user = NewUser {
            uuid: Uuid::new_v4(),
            email: command.email,
            name: command.name,
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            password_hash,
        };

        match self.repository.create(new_user).await {
            Ok(user) => {
                tracing::info!(email = %user.email, user_id = %user.id, "User registered");
                Ok(user)
            }
            Err(e @ UserError::EmailAlreadyExists(_)) => {
                tracing::warn!(email = %email, "Failed to create user: email already exists");
                Err(e)
            }
            Err(e) => {
                tracing::error!(email = %email, error = %e, "Failed to create user");
                Err(e)
            }
        }
    }

    async fn authenticate(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<User, UserError> {
        let password_hash = self
            .repository
            .find_credentials_by_email(email)
            .await?
            .and_then(|credentials| credentials.password_hash);

        let Some(password_hash) = password_hash else {
            tracing::warn!(email = %email, "Authentication failure: unknown email");
            return Err(UserError::InvalidCredentials);
        };

        if !self
            .verify_secret(password.to_string(), password_hash)
            .await?
        {
            tracing::warn!(email = %email, "Authentication failure: password mismatch");
            return Err(UserError::InvalidCredentials);
        }

        // Hand out the user through the credential-free query only.
        self.repository
            .find_by_email(email)
            .await?
            .ok_or(UserError::InvalidCredentials)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    async fn change_password(
        &self,
        id: &UserId,
        old_password: &str,
        new_password: Password,
    ) -> Result<(), UserError> {
        let password_hash = self
            .repository
            .find_credentials_by_id(id)
            .await?
            .and_then(|credentials| credentials.password_hash);

        let Some(password_hash) = password_hash else {
            tracing::warn!(user_id = %id, "Change password failure: no stored password hash");
            return Err(UserError::InvalidCredentials);
        };

        if !self
            .verify_secret(old_password.to_string(), password_hash)
            .await?
        {
            tracing::warn!(user_id = %id, "Change password failure: old password mismatch");
            return Err(UserError::InvalidCredentials);
        }

        let new_hash = self
            .hash_secret(new_password.as_str().to_string())
            .await?;
        let rows_affected = self.repository.update_password_hash(id, &new_hash).await?;

        if rows_affected != 1 {
            tracing::error!(
                user_id = %id,
                rows_affected,
                "Change password failure: unexpected number of rows updated"
            );
            return Err(UserError::Unknown(format!(
                "Password update affected {} rows",
                rows_affected
            )));
        }

        tracing::info!(user_id = %id, "Password changed");
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        id: &UserId,
        refresh_token: &str,
    ) -> Result<(), UserError> {
        let refresh_token_hash = self.hash_secret(refresh_token.to_string()).await?;

        let rows_affected = self
            .repository
            .update_refresh_token_hash(id, Some(refresh_token_hash))
            .await?;

        if rows_affected == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn get_user_if_refresh_token_matches(
        &self,
        id: &UserId,
        refresh_token: &str,
    ) -> Result<User, UserError> {
        let stored_hash = self
            .repository
            .find_credentials_by_id(id)
            .await?
            .and_then(|credentials| credentials.refresh_token_hash);

        let Some(stored_hash) = stored_hash else {
            tracing::warn!(user_id = %id, "Refresh failure: no active refresh token");
            return Err(UserError::InvalidCredentials);
        };

        if !self
            .verify_secret(refresh_token.to_string(), stored_hash)
            .await?
        {
            tracing::warn!(user_id = %id, "Refresh failure: refresh token superseded");
            return Err(UserError::InvalidCredentials);
        }

        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::InvalidCredentials)
    }

    async fn revoke_refresh_token(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.update_refresh_token_hash(id, None).await?;
        Ok(())
    }

    async fn check_health(&self) -> Result<(), UserError> {
        self.repository.ping().await
    }
}
