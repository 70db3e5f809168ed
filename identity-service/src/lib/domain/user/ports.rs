use async_trait::async_trait;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Password;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserCredentials;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user, hashing the password before it is stored.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError>;

    /// Resolve the user owning an email/password pair.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable)
    /// * `DatabaseError` - Database operation failed
    async fn authenticate(&self, email: &EmailAddress, password: &str)
        -> Result<User, UserError>;

    /// Retrieve user by internal identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Replace a user's password after checking the current one.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown user or `old_password` does not match
    /// * `Unknown` - Update did not affect exactly one row
    /// * `DatabaseError` - Database operation failed
    async fn change_password(
        &self,
        id: &UserId,
        old_password: &str,
        new_password: Password,
    ) -> Result<(), UserError>;

    /// Store the hash of a freshly issued refresh token, superseding any previous one.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn rotate_refresh_token(&self, id: &UserId, refresh_token: &str)
        -> Result<(), UserError>;

    /// Return the user if `refresh_token` matches the currently stored hash.
    ///
    /// # Errors
    /// * `InvalidCredentials` - No stored hash, or it belongs to another token
    /// * `DatabaseError` - Database operation failed
    async fn get_user_if_refresh_token_matches(
        &self,
        id: &UserId,
        refresh_token: &str,
    ) -> Result<User, UserError>;

    /// Forget the stored refresh-token hash so no issued refresh token is accepted.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn revoke_refresh_token(&self, id: &UserId) -> Result<(), UserError>;

    /// Check that the backing store answers.
    ///
    /// # Errors
    /// * `DatabaseError` - Store is unreachable
    async fn check_health(&self) -> Result<(), UserError>;
}

/// Persistence operations for user aggregate.
///
/// Queries come in two explicit variants: the public ones never read
/// credential columns, the `*_credentials_*` ones read nothing else.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: NewUser) -> Result<User, UserError>;

    /// Retrieve user by identifier, without credentials.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by email address, without credentials.
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;

    /// Retrieve the credential material of a user by identifier.
    async fn find_credentials_by_id(
        &self,
        id: &UserId,
    ) -> Result<Option<UserCredentials>, UserError>;

    /// Retrieve the credential material of a user by email address.
    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserCredentials>, UserError>;

    /// Replace the stored password hash.
    ///
    /// # Returns
    /// Number of rows affected
    async fn update_password_hash(&self, id: &UserId, password_hash: &str)
        -> Result<u64, UserError>;

    /// Replace (or clear, with `None`) the stored refresh-token hash.
    ///
    /// # Returns
    /// Number of rows affected
    async fn update_refresh_token_hash(
        &self,
        id: &UserId,
        refresh_token_hash: Option<String>,
    ) -> Result<u64, UserError>;

    /// Round-trip to the store.
    async fn ping(&self) -> Result<(), UserError>;
}
