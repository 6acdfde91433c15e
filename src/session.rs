//! Authentication state shown by the header widget

use crate::data::User;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthStatus {
    /// Session check still in flight
    #[default]
    Unknown,
    LoggedOut,
    LoggedIn(User),
}

impl AuthStatus {
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthStatus::LoggedIn(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.user().is_some()
    }

    /// Greeting for a logged-in user, e.g. "Welcome, Aragorn!"
    pub fn welcome(&self) -> Option<String> {
        self.user()
            .map(|user| format!("Welcome, {}!", user.first_name))
    }
}
