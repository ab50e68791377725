//! Edit buffer of an opened box

use crate::api::BoxResponse;
use crate::api::UpdateBoxForm;
use crate::boxes::MAX_CONTENT_LENGTH;
use crate::boxes::MAX_TITLE_LENGTH;
use crate::cipher;

use super::Error;

/// Title and content of an opened box, as edited by the user
///
/// Content is always kept as plaintext here, sealing happens when saving
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Draft {
    box_number: i32,
    saved_title: String,
    saved_content: String,
    title: String,
    content: String,
    is_editing: bool,
}

impl Draft {
    /// Open a box with its password
    ///
    /// Sealed content is opened with the password, plaintext content is taken as is. An empty
    /// box starts in edit mode
    pub fn open(key_box: &BoxResponse, password: &str) -> Result<Self, Error> {
        let content = if cipher::is_sealed(&key_box.content) {
            cipher::open(password, &key_box.content)?
        } else {
            key_box.content.clone()
        };

        let is_editing = key_box.title.is_empty() && content.is_empty();

        Ok(Self {
            box_number: key_box.box_number,
            saved_title: key_box.title.clone(),
            saved_content: content.clone(),
            title: key_box.title.clone(),
            content,
            is_editing,
        })
    }

    pub fn box_number(&self) -> i32 {
        self.box_number
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_editing(&self) -> bool {
        self.is_editing
    }

    /// Switch to edit mode
    pub fn edit(&mut self) {
        self.is_editing = true;
    }

    pub fn set_title<T: Into<String>>(&mut self, title: T) {
        self.title = title.into();
    }

    pub fn set_content<C: Into<String>>(&mut self, content: C) {
        self.content = content.into();
    }

    /// Are there edits that are not saved yet?
    pub fn has_unsaved_changes(&self) -> bool {
        self.is_editing && (self.title != self.saved_title || self.content != self.saved_content)
    }

    /// Throw away the edits and leave edit mode
    pub fn cancel(&mut self) {
        self.title.clone_from(&self.saved_title);
        self.content.clone_from(&self.saved_content);
        self.is_editing = false;
    }

    /// Build the update for the edits
    ///
    /// Title and content are trimmed first. With `seal_with` the content is sealed with that
    /// password; without it the content is sent as plaintext. The password itself is left out, so
    /// the stored one is kept
    pub fn prepare_save(&mut self, seal_with: Option<&str>) -> Result<UpdateBoxForm, Error> {
        let title = self.title.trim();
        let content = self.content.trim();

        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(Error::TitleTooLong);
        }

        if content.chars().count() > MAX_CONTENT_LENGTH {
            return Err(Error::ContentTooLong);
        }

        self.title = title.to_string();
        self.content = content.to_string();

        let content = match seal_with {
            Some(password) if !self.content.is_empty() => cipher::seal(password, &self.content)?,
            _ => self.content.clone(),
        };

        Ok(UpdateBoxForm {
            box_number: self.box_number,
            title: Some(self.title.clone()),
            content: Some(content),
            password: None,
            is_used: Some(true),
        })
    }

    /// Mark the prepared edits as saved and leave edit mode
    pub fn commit(&mut self) {
        self.saved_title.clone_from(&self.title);
        self.saved_content.clone_from(&self.content);
        self.is_editing = false;
    }
}
