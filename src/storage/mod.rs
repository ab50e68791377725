//! All things related to the storage of boxes

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::boxes::KeyBox;

pub use memory::Memory;
pub use postgres::Postgres;

mod memory;
mod postgres;

/// Storage configuration
pub enum Config {
    /// Detect configuration from environment
    ///
    /// Postgres when `DATABASE_URL` is set, memory otherwise
    DetectConfig,

    /// Use existing Postgres connection
    ExistingConnection(PgPool),

    /// Keep everything in memory
    InMemory,
}

/// Storage errors
#[derive(Debug, Error)]
pub enum Error {
    /// A connection error with the storage
    #[error("Connection error: {0}")]
    Connection(String),

    /// Migrations could not be applied
    #[error("Migration error: {0}")]
    Migration(String),

    /// A box disappeared while working on it
    #[error("Box #{0} is missing from storage")]
    MissingBox(i32),

    /// The box was reset while updating it without a new password
    #[error("Box #{0} was reset, a password is needed to claim it again")]
    ReleasedBox(i32),
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Values to create the initial boxes
pub struct CreateBoxesValues {
    /// Number of boxes, numbered `1..=count`
    pub count: i32,
}

/// Values to update a box
pub struct UpdateBoxValues<'a> {
    /// New title of the box
    pub title: &'a str,

    /// New content of the box
    pub content: &'a str,

    /// New hashed password
    ///
    /// When `None` the current hashed password is kept as is
    pub hashed_password: Option<&'a str>,
}

/// Storage with all supported operations
#[async_trait]
pub trait Storage: Clone + Send + Sync + 'static {
    /// Find all boxes, ordered by box number
    async fn find_all_boxes(&self) -> Result<Vec<KeyBox>>;

    /// Find a single box by its box number
    async fn find_single_box_by_number(&self, box_number: i32) -> Result<Option<KeyBox>>;

    /// Create empty, unused boxes
    ///
    /// All boxes are created at once or none are, box numbers that already exist are skipped.
    /// Returns all boxes, ordered by box number
    async fn create_boxes(&self, values: &CreateBoxesValues) -> Result<Vec<KeyBox>>;

    /// Update a box, marking it as used
    ///
    /// Without a new hashed password the box has to still be used when the update is applied,
    /// otherwise [`Error::ReleasedBox`] is returned and nothing changes
    async fn update_box(
        &self,
        key_box: &KeyBox,
        values: &UpdateBoxValues<'_>,
    ) -> Result<KeyBox>;

    /// Reset a box to its empty, unused state
    async fn reset_box(&self, key_box: &KeyBox) -> Result<KeyBox>;
}
