use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Kind of session token.
///
/// Each kind is signed with its own secret and carries its own expiry, so a
/// token minted for one kind never validates as the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    /// Name of the cookie that carries this kind of token.
    pub fn cookie_name(self) -> &'static str {
        match self {
            TokenKind::Access => "Authentication",
            TokenKind::Refresh => "Refresh",
        }
    }
}

/// Session token payload.
///
/// The only application field is the user's internal identifier. `iat` and
/// `exp` are set at signing time; `jti` makes every minted token unique even
/// when two are issued for the same user within the same second.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Internal user identifier
    #[serde(rename = "userId")]
    pub user_id: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Token identifier
    pub jti: String,
}

impl Claims {
    /// Create claims for a user, expiring `expiration_seconds` from now.
    pub fn for_user(user_id: i64, expiration_seconds: i64) -> Self {
        let now = Utc::now();
        let expiration = now + Duration::seconds(expiration_seconds);

        Self {
            user_id,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}
