//! Bearer credentials for the persistence API.
//!
//! Tokens come from an external auth collaborator behind [`TokenProvider`].
//! A missing token is a precondition failure: the sync layer refuses to make
//! the call at all.

use std::fmt;

use async_trait::async_trait;

/// An opaque bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token; blank input yields `None`.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(***)")
    }
}

/// Source of the current session's bearer token.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// The token to attach to the next call, if the author is signed in.
    async fn access_token(&self) -> Option<AccessToken>;
}

/// A fixed token (or none, for a signed-out session).
#[derive(Clone, Debug, Default)]
pub struct StaticToken(Option<AccessToken>);

impl StaticToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(AccessToken::new(raw))
    }

    pub fn signed_out() -> Self {
        Self(None)
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Option<AccessToken> {
        self.0.clone()
    }
}

/// Reads the token from an environment variable on every call.
#[derive(Clone, Debug)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl TokenProvider for EnvToken {
    async fn access_token(&self) -> Option<AccessToken> {
        std::env::var(&self.var).ok().and_then(AccessToken::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_is_none() {
        assert!(AccessToken::new("  ").is_none());
        assert_eq!(AccessToken::new(" abc ").unwrap().secret(), "abc");
    }

    #[test]
    fn test_debug_hides_secret() {
        let token = AccessToken::new("s3cret").unwrap();
        assert!(!format!("{token:?}").contains("s3cret"));
    }

    #[tokio::test]
    async fn test_static_provider() {
        assert!(StaticToken::signed_out().access_token().await.is_none());
        assert!(StaticToken::new("t").access_token().await.is_some());
    }

    #[tokio::test]
    async fn test_env_provider_missing_var() {
        let provider = EnvToken::new("TOURBOOK_TEST_TOKEN_THAT_IS_NEVER_SET");
        assert!(provider.access_token().await.is_none());
    }
}
