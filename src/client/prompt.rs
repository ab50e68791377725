//! Password prompt shown when a box is selected

use crate::api::BoxResponse;
use crate::api::UpdateBoxForm;
use crate::api::VerifyBoxForm;
use crate::boxes::MIN_PASSWORD_LENGTH;

use super::Error;

/// What the prompt is for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptMode {
    /// Set the first password of an unused box
    Claim,

    /// Enter the password of a used box
    Unlock,
}

/// Request to send once the prompt is submitted
#[derive(Clone, Debug)]
pub enum PasswordRequest {
    /// `PUT /api/boxes`, claims the box
    Claim(UpdateBoxForm),

    /// `POST /api/boxes/verify`
    Unlock(VerifyBoxForm),
}

/// Password prompt for a single box
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasswordPrompt {
    box_number: i32,
    mode: PromptMode,
}

impl PasswordPrompt {
    /// Prompt fitting the current state of the box
    pub fn for_box(key_box: &BoxResponse) -> Self {
        Self {
            box_number: key_box.box_number,
            mode: if key_box.is_used {
                PromptMode::Unlock
            } else {
                PromptMode::Claim
            },
        }
    }

    pub fn box_number(&self) -> i32 {
        self.box_number
    }

    pub fn mode(&self) -> PromptMode {
        self.mode
    }

    /// Check the entered password
    ///
    /// The confirmation is only looked at when claiming a box
    pub fn validate(&self, password: &str, confirm_password: &str) -> Result<(), Error> {
        if password.is_empty() {
            return Err(Error::EmptyPassword);
        }

        if self.mode == PromptMode::Claim {
            if password != confirm_password {
                return Err(Error::PasswordMismatch);
            }

            if password.chars().count() < MIN_PASSWORD_LENGTH {
                return Err(Error::PasswordTooShort);
            }
        }

        Ok(())
    }

    /// Validate and build the request to send
    pub fn submit(&self, password: &str, confirm_password: &str) -> Result<PasswordRequest, Error> {
        self.validate(password, confirm_password)?;

        Ok(match self.mode {
            PromptMode::Claim => PasswordRequest::Claim(UpdateBoxForm {
                box_number: self.box_number,
                title: Some(String::new()),
                content: Some(String::new()),
                password: Some(password.to_string()),
                is_used: Some(true),
            }),
            PromptMode::Unlock => PasswordRequest::Unlock(VerifyBoxForm {
                box_number: self.box_number,
                password: password.to_string(),
            }),
        })
    }
}
