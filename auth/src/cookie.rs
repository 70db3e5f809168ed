//! Session cookie values for `Set-Cookie` headers.
//!
//! Both session cookies are `HttpOnly`, scoped to `/`, and carry a `Max-Age`
//! equal to the lifetime of the token inside them.

use crate::jwt::SignedToken;
use crate::jwt::TokenKind;

/// Build the `Set-Cookie` value carrying a signed token of the given kind.
pub fn session_cookie(kind: TokenKind, signed: &SignedToken) -> String {
    format_cookie(kind.cookie_name(), &signed.token, signed.max_age_seconds)
}

/// Build a `Set-Cookie` value that makes the browser drop the cookie at once.
pub fn expired_cookie(kind: TokenKind) -> String {
    format_cookie(kind.cookie_name(), "", 0)
}

fn format_cookie(name: &str, value: &str, max_age_seconds: i64) -> String {
    format!("{name}={value}; HttpOnly; Path=/; Max-Age={max_age_seconds}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_cookie_format() {
        let signed = SignedToken {
            token: "abc.def.ghi".to_string(),
            max_age_seconds: 900,
        };

        assert_eq!(
            session_cookie(TokenKind::Access, &signed),
            "Authentication=abc.def.ghi; HttpOnly; Path=/; Max-Age=900"
        );
    }

    #[test]
    fn test_refresh_cookie_format() {
        let signed = SignedToken {
            token: "abc.def.ghi".to_string(),
            max_age_seconds: 604800,
        };

        assert_eq!(
            session_cookie(TokenKind::Refresh, &signed),
            "Refresh=abc.def.ghi; HttpOnly; Path=/; Max-Age=604800"
        );
    }

    #[test]
    fn test_expired_cookies() {
        assert_eq!(
            expired_cookie(TokenKind::Access),
            "Authentication=; HttpOnly; Path=/; Max-Age=0"
        );
        assert_eq!(
            expired_cookie(TokenKind::Refresh),
            "Refresh=; HttpOnly; Path=/; Max-Age=0"
        );
    }
}
