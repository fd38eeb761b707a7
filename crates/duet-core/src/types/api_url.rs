//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated API base URL, such as `https://api.example.com/api/v1`.
///
/// Only `http` and `https` are accepted. A trailing slash is removed so that
/// endpoint paths can be appended uniformly.
///
/// # Example
///
/// ```
/// use duet_core::ApiUrl;
///
/// let api = ApiUrl::new("http://localhost:8000/api/v1/").unwrap();
/// assert_eq!(api.endpoint("/auth/login").unwrap(),
///            "http://localhost:8000/api/v1/auth/login");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        // Normalize: remove trailing slash
        let mut normalized = url;
        let path = normalized.path().trim_end_matches('/').to_string();
        normalized.set_path(&path);

        Ok(Self(normalized))
    }

    /// Returns the absolute URL for an endpoint path such as `/users/me`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is absolute (has a scheme) or contains a
    /// query or fragment; those belong in the request descriptor.
    pub fn endpoint(&self, path: &str) -> Result<String, Error> {
        if path.contains("://") || path.contains('?') || path.contains('#') {
            return Err(InvalidInputError::Path {
                value: path.to_string(),
                reason: "expected a path relative to the API base URL".to_string(),
            }
            .into());
        }

        // The URL crate always keeps at least "/" as the path.
        let base = self.0.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(format!("{}/{}", base, path))
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(InvalidInputError::ApiUrl {
                    value: original.to_string(),
                    reason: format!("unsupported scheme '{}'", other),
                }
                .into());
            }
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "missing host".to_string(),
            }
            .into());
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "base URL must not carry a query or fragment".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_str().trim_end_matches('/'))
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_trailing_slash() {
        let api = ApiUrl::new("https://api.example.com/api/v1/").unwrap();
        assert_eq!(api.to_string(), "https://api.example.com/api/v1");
    }

    #[test]
    fn joins_endpoint_paths() {
        let api = ApiUrl::new("http://localhost:8000/api/v1").unwrap();
        assert_eq!(
            api.endpoint("/auth/refresh").unwrap(),
            "http://localhost:8000/api/v1/auth/refresh"
        );
        assert_eq!(
            api.endpoint("users/me").unwrap(),
            "http://localhost:8000/api/v1/users/me"
        );
    }

    #[test]
    fn root_base_url() {
        let api = ApiUrl::new("http://127.0.0.1:9000").unwrap();
        assert_eq!(api.endpoint("/auth/login").unwrap(), "http://127.0.0.1:9000/auth/login");
        assert_eq!(api.host(), Some("127.0.0.1"));
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert!(ApiUrl::new("ftp://example.com").is_err());
        assert!(ApiUrl::new("file:///tmp/api").is_err());
        assert!(ApiUrl::new("not a url").is_err());
    }

    #[test]
    fn rejects_query_in_base() {
        assert!(ApiUrl::new("https://example.com/api?x=1").is_err());
    }

    #[test]
    fn rejects_absolute_endpoint() {
        let api = ApiUrl::new("https://example.com/api").unwrap();
        assert!(api.endpoint("https://evil.example.com/steal").is_err());
        assert!(api.endpoint("/users?id=1").is_err());
    }

    #[test]
    fn serde_round_trip() {
        let api: ApiUrl = serde_json::from_str("\"https://example.com/api/v1/\"").unwrap();
        assert_eq!(serde_json::to_string(&api).unwrap(), "\"https://example.com/api/v1\"");
    }
}
