use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthUser {
    pub id: i32,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// A signed-in user and the bearer token issued for them.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user: AuthUser,
    pub jwt: String,
}

impl AuthSession {
    pub fn new(user: AuthUser, jwt: impl Into<String>) -> Self {
        Self { user, jwt: jwt.into() }
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &self.user)
            .field("jwt", &"<redacted>")
            .finish()
    }
}

/// Authentication as the favorites cache observes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// The stored session has not been checked yet.
    Resolving,
    LoggedOut,
    LoggedIn(AuthSession),
}

impl AuthState {
    pub fn session(&self) -> Option<&AuthSession> {
        match self {
            AuthState::LoggedIn(session) => Some(session),
            _ => None,
        }
    }
}
