//! Client side of the keybox
//!
//! Everything a client needs to drive the boxes API: validating passwords before they are sent,
//! tracking edits of an opened box and sealing its content before it is saved. Transport is left
//! to the caller, this module only produces request bodies and consumes responses.

use thiserror::Error;

use crate::boxes::MAX_CONTENT_LENGTH;
use crate::boxes::MAX_TITLE_LENGTH;
use crate::boxes::MIN_PASSWORD_LENGTH;
use crate::cipher;

pub use draft::Draft;
pub use prompt::PasswordPrompt;
pub use prompt::PasswordRequest;
pub use prompt::PromptMode;
pub use session::Phase;
pub use session::Session;

mod draft;
mod prompt;
mod session;

/// Client errors
#[derive(Debug, Error)]
pub enum Error {
    /// No password given
    #[error("Please enter a password")]
    EmptyPassword,

    /// Password and its confirmation differ
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Password is too short to claim a box with
    #[error("Password should be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,

    /// Title is over its limit
    #[error("Title should be at most {MAX_TITLE_LENGTH} characters")]
    TitleTooLong,

    /// Content is over its limit
    #[error("Content should be at most {MAX_CONTENT_LENGTH} characters")]
    ContentTooLong,

    /// Box is not part of the session
    #[error("Box #{0} does not exist")]
    UnknownBox(i32),

    /// Action does not fit the current phase of the session
    #[error("Not possible right now: {0}")]
    OutOfOrder(&'static str),

    /// Closing would lose edits
    #[error("There are unsaved changes")]
    UnsavedChanges,

    /// Content could not be sealed or opened
    #[error(transparent)]
    Cipher(#[from] cipher::Error),
}
