//! Bearer credentials attached to every request.

use std::fmt;

/// Source of the access token sent as `Authorization: Bearer <token>`.
pub trait OauthToken: Send + Sync {
    fn access_token(&self) -> &str;
}

/// A fixed token, e.g. a manually generated Canvas access token.
#[derive(Clone, PartialEq, Eq)]
pub struct NonRefreshableOauthToken {
    access_token: String,
}

impl NonRefreshableOauthToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }
}

impl OauthToken for NonRefreshableOauthToken {
    fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for NonRefreshableOauthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonRefreshableOauthToken")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

pub(crate) fn bearer(token: &dyn OauthToken) -> String {
    format!("Bearer {}", token.access_token())
}
