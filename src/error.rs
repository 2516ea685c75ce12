//! Error types for the diary.
//!
//! Every variant is recoverable by the user: the application shell turns
//! them into alerts (or, for autosave, inline status text).

use thiserror::Error;

/// Result type alias for diary operations.
pub type Result<T> = std::result::Result<T, DiaryError>;

#[derive(Debug, Error)]
pub enum DiaryError {
    /// Login attempt did not match the stored password
    #[error("Incorrect password!")]
    IncorrectPassword,

    /// Password change: the old password was wrong
    #[error("Old password incorrect!")]
    InvalidOldPassword,

    /// Password change: new and confirmation differ
    #[error("New passwords do not match!")]
    PasswordMismatch,

    /// Password change: new password is too short
    #[error("Password must be at least {min} characters.")]
    PasswordTooWeak { min: usize },

    /// Reading or writing one of the flat files failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl DiaryError {
    /// Title of the alert that reports this error.
    pub fn title(&self) -> &'static str {
        match self {
            DiaryError::PasswordTooWeak { .. } => "Weak",
            _ => "Error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(DiaryError::IncorrectPassword.to_string(), "Incorrect password!");
        assert_eq!(
            DiaryError::PasswordTooWeak { min: 4 }.to_string(),
            "Password must be at least 4 characters."
        );
    }

    #[test]
    fn test_titles() {
        assert_eq!(DiaryError::PasswordTooWeak { min: 4 }.title(), "Weak");
        assert_eq!(DiaryError::PasswordMismatch.title(), "Error");
    }

    #[test]
    fn test_io_conversion() {
        let err: DiaryError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.to_string().contains("gone"));
    }
}
