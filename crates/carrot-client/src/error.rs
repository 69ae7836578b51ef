use thiserror::Error;

use carrot_core::messages;
use carrot_core::validation::ValidationError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; `message` is the server's localized error text.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("local storage: {0:#}")]
    Storage(#[from] anyhow::Error),

    #[error("{msg}", msg = messages::LOGIN_REQUIRED)]
    NotLoggedIn,
}

/// User-facing operations that report a generic message when the server
/// or transport fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SignIn,
    SignUp,
    UpdateProfile,
    LoadListings,
    LoadComments,
}

impl Action {
    pub fn fallback(self) -> &'static str {
        match self {
            Action::SignIn => messages::LOGIN_FAILED,
            Action::SignUp => messages::SIGNUP_FAILED,
            Action::UpdateProfile => messages::PROFILE_UPDATE_FAILED,
            Action::LoadListings => messages::LISTINGS_UNAVAILABLE,
            Action::LoadComments => messages::COMMENTS_UNAVAILABLE,
        }
    }
}

impl ClientError {
    /// Text to show the user. Transport, storage and server-side failures
    /// collapse into the action's generic message.
    pub fn user_message(&self, action: Action) -> String {
        match self {
            ClientError::Http(_) | ClientError::Storage(_) => action.fallback().to_string(),
            ClientError::Api { status, .. } if *status >= 500 => action.fallback().to_string(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_fall_back_per_action() {
        let err = ClientError::Api {
            status: 500,
            message: messages::UNEXPECTED.into(),
        };
        assert_eq!(err.user_message(Action::SignUp), messages::SIGNUP_FAILED);
        assert_eq!(err.user_message(Action::LoadComments), messages::COMMENTS_UNAVAILABLE);

        let err = ClientError::Api {
            status: 409,
            message: messages::NICKNAME_TAKEN.into(),
        };
        assert_eq!(err.user_message(Action::UpdateProfile), messages::NICKNAME_TAKEN);

        let err = ClientError::Storage(anyhow::anyhow!("disk full"));
        assert_eq!(err.user_message(Action::LoadListings), messages::LISTINGS_UNAVAILABLE);
        assert_eq!(ClientError::NotLoggedIn.user_message(Action::SignIn), messages::LOGIN_REQUIRED);
    }
}
