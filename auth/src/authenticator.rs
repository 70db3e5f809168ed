use crate::cookie::expired_cookie;
use crate::cookie::session_cookie;
use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::TokenKind;

/// Secret and lifetime for one kind of session token.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub expiration_seconds: i64,
}

/// Session token coordinator: signs, validates and wraps tokens in cookies.
///
/// Access and refresh tokens are handled by two independent `JwtHandler`s,
/// each keyed by its own secret and expiry.
pub struct Authenticator {
    access_tokens: JwtHandler,
    refresh_tokens: JwtHandler,
}

/// Refresh cookie plus the raw token it carries.
///
/// The caller persists a hash of `token` so the refresh can later be matched
/// against the stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenCookie {
    pub cookie: String,
    pub token: String,
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `access` - Secret and expiry for access tokens
    /// * `refresh` - Secret and expiry for refresh tokens
    pub fn new(access: &TokenSettings, refresh: &TokenSettings) -> Self {
        Self {
            access_tokens: JwtHandler::new(access.secret.as_bytes(), access.expiration_seconds),
            refresh_tokens: JwtHandler::new(
                refresh.secret.as_bytes(),
                refresh.expiration_seconds,
            ),
        }
    }

    /// Sign an access token for `user_id` and wrap it in an `Authentication` cookie.
    pub fn access_token_cookie(&self, user_id: i64) -> Result<String, JwtError> {
        let signed = self.access_tokens.sign(user_id)?;
        Ok(session_cookie(TokenKind::Access, &signed))
    }

    /// Sign a refresh token for `user_id` and wrap it in a `Refresh` cookie.
    pub fn refresh_token_cookie(&self, user_id: i64) -> Result<RefreshTokenCookie, JwtError> {
        let signed = self.refresh_tokens.sign(user_id)?;

        Ok(RefreshTokenCookie {
            cookie: session_cookie(TokenKind::Refresh, &signed),
            token: signed.token,
        })
    }

    /// Cookies that wipe both session cookies on the client.
    pub fn logout_cookies(&self) -> [String; 2] {
        [
            expired_cookie(TokenKind::Access),
            expired_cookie(TokenKind::Refresh),
        ]
    }

    /// Validate an access token's signature and expiry.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.access_tokens.verify(token)
    }

    /// Validate a refresh token's signature and expiry.
    ///
    /// This only proves the token was minted by this service. Whether it is
    /// still the user's current refresh token is decided against the stored hash.
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.refresh_tokens.verify(token)
    }
}
