//! Bearer tokens issued by the backend.
//!
//! Both token kinds are opaque JWT strings. Their `Debug` output never shows
//! the value, so sessions can be traced freely.

use std::fmt;

macro_rules! bearer_token {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name(String);

        impl $name {
            pub fn new(token: impl Into<String>) -> Self {
                Self(token.into())
            }

            /// Raw token value. Only for building headers and persisting the
            /// session.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// `Authorization` header value carrying this token.
            pub fn bearer(&self) -> String {
                format!("Bearer {}", self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&"[REDACTED]").finish()
            }
        }
    };
}

bearer_token! {
    /// Short-lived token sent with every authenticated request.
    ///
    /// Issued by `/auth/login` and `/auth/refresh`.
    AccessToken
}

bearer_token! {
    /// Longer-lived token that is only ever sent to `/auth/refresh`.
    RefreshToken
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let access = AccessToken::new("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...");
        let refresh = RefreshToken::new("refresh_token_value_here");

        let debug = format!("{:?} {:?}", access, refresh);
        assert_eq!(debug, r#"AccessToken("[REDACTED]") RefreshToken("[REDACTED]")"#);
    }

    #[test]
    fn bearer_header_value() {
        assert_eq!(AccessToken::new("abc").bearer(), "Bearer abc");
        assert_eq!(RefreshToken::new("xyz").bearer(), "Bearer xyz");
        assert_eq!(AccessToken::new("abc").as_str(), "abc");
    }
}
