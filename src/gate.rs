//! Password gate in front of the diary, plus the password-change flow.

use tracing::{info, warn};

use crate::credentials::CredentialStore;
use crate::error::{DiaryError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    AwaitingPassword,
    Authenticated,
}

#[derive(Debug)]
pub struct SessionGate {
    store: CredentialStore,
    min_password_length: usize,
    state: GateState,
}

impl SessionGate {
    pub fn new(store: CredentialStore, min_password_length: usize) -> Self {
        SessionGate {
            store,
            min_password_length,
            state: GateState::AwaitingPassword,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == GateState::Authenticated
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Check a login attempt. Surrounding whitespace in the attempt is ignored.
    ///
    /// There is no attempt counter: a wrong password can be retried forever.
    pub fn submit(&mut self, attempt: &str) -> Result<()> {
        if attempt.trim() == self.store.load_password() {
            self.state = GateState::Authenticated;
            info!("login succeeded");
            Ok(())
        } else {
            warn!("login failed: incorrect password");
            Err(DiaryError::IncorrectPassword)
        }
    }

    /// Replace the stored password after validating, in order: the old
    /// password, the confirmation, and the minimum length.
    pub fn change_password(&self, old: &str, new: &str, confirm: &str) -> Result<()> {
        if old != self.store.load_password() {
            warn!("password change rejected: old password incorrect");
            return Err(DiaryError::InvalidOldPassword);
        }
        if new != confirm {
            return Err(DiaryError::PasswordMismatch);
        }
        if new.chars().count() < self.min_password_length {
            return Err(DiaryError::PasswordTooWeak {
                min: self.min_password_length,
            });
        }

        self.store.save_password(new)
    }
}
