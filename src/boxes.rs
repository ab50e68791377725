//! Boxes
//!
//! The fixed set of slots that make up the keybox

use chrono::naive::NaiveDateTime;
use uuid::Uuid;

use crate::storage::CreateBoxesValues;
use crate::storage::Result;
use crate::storage::Storage;

/// Number of boxes created on first run
pub const DEFAULT_BOX_COUNT: i32 = 5;

/// Minimal length of a box password, in characters
pub const MIN_PASSWORD_LENGTH: usize = 4;

/// Maximal length of a box title, in characters
pub const MAX_TITLE_LENGTH: usize = 100;

/// Maximal length of the (plaintext) content of a box, in characters
pub const MAX_CONTENT_LENGTH: usize = 3000;

/// Number of boxes the keybox holds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxCount(pub i32);

impl Default for BoxCount {
    fn default() -> Self {
        Self(DEFAULT_BOX_COUNT)
    }
}

/// A single box
///
/// An unused box has an empty title, content and password, a used box always carries a
/// hashed password
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyBox {
    /// Box ID
    pub id: Uuid,

    /// Slot number, starting at 1
    pub box_number: i32,

    /// Title of the box
    pub title: String,

    /// Content of the box, plaintext or a sealed envelope
    pub content: String,

    /// Hashed password, empty when unused
    pub hashed_password: String,

    /// Is a password set for the box?
    pub is_used: bool,

    /// Creation date
    pub created_at: NaiveDateTime,

    /// Last updated at
    pub updated_at: NaiveDateTime,
}

impl KeyBox {
    /// Is the box in the empty, unclaimed state?
    pub fn is_unused(&self) -> bool {
        !self.is_used
            && self.title.is_empty()
            && self.content.is_empty()
            && self.hashed_password.is_empty()
    }
}

/// Create the initial boxes when the storage has none
///
/// Returns all boxes, ordered by box number
pub async fn ensure_initial_boxes<S: Storage>(storage: &S, count: i32) -> Result<Vec<KeyBox>> {
    let boxes = storage.find_all_boxes().await?;

    if !boxes.is_empty() {
        return Ok(boxes);
    }

    tracing::info!("No boxes found, creating {count} empty boxes");

    storage.create_boxes(&CreateBoxesValues { count }).await
}
