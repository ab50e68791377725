//! Memory storage
//!
//! Will be destroyed on system shutdown

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::boxes::KeyBox;

use super::CreateBoxesValues;
use super::Error;
use super::Result;
use super::Storage;
use super::UpdateBoxValues;

/// An in-memory storage
///
/// Will be destroyed on system shutdown
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// All boxes in storage, by box number
    boxes: Arc<Mutex<BTreeMap<i32, KeyBox>>>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for Memory {
    async fn find_all_boxes(&self) -> Result<Vec<KeyBox>> {
        Ok(self.boxes.lock().await.values().cloned().collect())
    }

    async fn find_single_box_by_number(&self, box_number: i32) -> Result<Option<KeyBox>> {
        Ok(self.boxes.lock().await.get(&box_number).cloned())
    }

    async fn create_boxes(&self, values: &CreateBoxesValues) -> Result<Vec<KeyBox>> {
        // holding the lock for the whole batch keeps it all-or-nothing
        let mut boxes = self.boxes.lock().await;

        let now = Utc::now().naive_utc();

        for box_number in 1..=values.count {
            boxes.entry(box_number).or_insert_with(|| KeyBox {
                id: Uuid::new_v4(),
                box_number,
                title: String::new(),
                content: String::new(),
                hashed_password: String::new(),
                is_used: false,
                created_at: now,
                updated_at: now,
            });
        }

        Ok(boxes.values().cloned().collect())
    }

    async fn update_box(
        &self,
        key_box: &KeyBox,
        values: &UpdateBoxValues<'_>,
    ) -> Result<KeyBox> {
        let mut boxes = self.boxes.lock().await;

        let current = boxes
            .get_mut(&key_box.box_number)
            .ok_or(Error::MissingBox(key_box.box_number))?;

        // checked against the current state, a reset may have landed since `key_box` was read
        match values.hashed_password {
            Some(hashed_password) => current.hashed_password = hashed_password.to_string(),
            None if current.is_used => {}
            None => return Err(Error::ReleasedBox(key_box.box_number)),
        }

        current.title = values.title.to_string();
        current.content = values.content.to_string();
        current.is_used = true;
        current.updated_at = Utc::now().naive_utc();

        Ok(current.clone())
    }

    async fn reset_box(&self, key_box: &KeyBox) -> Result<KeyBox> {
        self.boxes
            .lock()
            .await
            .get_mut(&key_box.box_number)
            .map(|key_box| {
                key_box.title.clear();
                key_box.content.clear();
                key_box.hashed_password.clear();
                key_box.is_used = false;
                key_box.updated_at = Utc::now().naive_utc();

                key_box.clone()
            })
            .ok_or(Error::MissingBox(key_box.box_number))
    }
}
