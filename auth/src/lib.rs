//! Authentication utilities library
//!
//! Provides the session building blocks used by the identity service:
//! - Secret hashing for passwords and refresh tokens (Argon2id)
//! - JWT signing and validation, one handler per token kind
//! - Session cookie construction (`Authentication` and `Refresh`)
//!
//! The library knows nothing about HTTP frameworks or storage; the service
//! decides where hashes live and how cookies reach the client.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Session Cookies
//! ```
//! use auth::{Authenticator, TokenSettings};
//!
//! let auth = Authenticator::new(
//!     &TokenSettings {
//!         secret: "access_secret_key_at_least_32_bytes!".to_string(),
//!         expiration_seconds: 900,
//!     },
//!     &TokenSettings {
//!         secret: "refresh_secret_key_at_least_32_bytes".to_string(),
//!         expiration_seconds: 604800,
//!     },
//! );
//!
//! // Sign-in: one cookie per token kind
//! let access_cookie = auth.access_token_cookie(42).unwrap();
//! let refresh = auth.refresh_token_cookie(42).unwrap();
//! assert!(access_cookie.starts_with("Authentication="));
//!
//! // Refresh: the raw token validates against the refresh secret only
//! let claims = auth.validate_refresh_token(&refresh.token).unwrap();
//! assert_eq!(claims.user_id, 42);
//!
//! // Sign-out
//! let [expired_access, expired_refresh] = auth.logout_cookies();
//! assert!(expired_access.ends_with("Max-Age=0"));
//! assert!(expired_refresh.ends_with("Max-Age=0"));
//! ```

pub mod authenticator;
pub mod cookie;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::Authenticator;
pub use authenticator::RefreshTokenCookie;
pub use authenticator::TokenSettings;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenKind;
pub use password::PasswordError;
pub use password::PasswordHasher;
