//! Browsing session over all boxes
//!
//! A session moves between three phases: browsing the list, prompting for the password of a
//! selected box and editing an opened box. The password of an opened box is kept in memory until
//! the box is closed, so its content can be sealed again on save.

use zeroize::Zeroizing;

use crate::api::BoxResponse;
use crate::api::UpdateBoxForm;

use super::Draft;
use super::Error;
use super::PasswordPrompt;
use super::PasswordRequest;
use super::PromptMode;

/// Phase of a session
#[derive(Debug)]
pub enum Phase {
    /// Looking at the list of boxes
    Browsing,

    /// Waiting for the password of a selected box
    Prompting(PasswordPrompt),

    /// A box is opened
    Editing(Draft),
}

/// Session over the boxes of a keybox
pub struct Session {
    boxes: Vec<BoxResponse>,
    phase: Phase,
    password: Option<Zeroizing<String>>,
    protect_content: bool,
}

impl Session {
    /// Start browsing the listed boxes
    ///
    /// With `protect_content` the content of a box is sealed with its password before it is saved
    pub fn new(boxes: Vec<BoxResponse>, protect_content: bool) -> Self {
        Self {
            boxes,
            phase: Phase::Browsing,
            password: None,
            protect_content,
        }
    }

    pub fn boxes(&self) -> &[BoxResponse] {
        &self.boxes
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Replace the listed boxes, e.g. after listing them again
    pub fn refresh(&mut self, boxes: Vec<BoxResponse>) {
        self.boxes = boxes;
    }

    /// Select a box, asking for its password
    pub fn select(&mut self, box_number: i32) -> Result<&PasswordPrompt, Error> {
        if !matches!(self.phase, Phase::Browsing) {
            return Err(Error::OutOfOrder("another box is selected"));
        }

        let key_box = self.find_box(box_number)?;
        self.phase = Phase::Prompting(PasswordPrompt::for_box(key_box));

        self.prompt()
    }

    /// Validate the entered password and build the request to send
    pub fn submit_password(
        &self,
        password: &str,
        confirm_password: &str,
    ) -> Result<PasswordRequest, Error> {
        self.prompt()?.submit(password, confirm_password)
    }

    /// Go back to the list without opening the box
    pub fn cancel_prompt(&mut self) {
        if matches!(self.phase, Phase::Prompting(_)) {
            self.phase = Phase::Browsing;
        }
    }

    /// The box was claimed with `password`, open it
    pub fn claimed(&mut self, key_box: BoxResponse, password: &str) -> Result<&Draft, Error> {
        let prompt = self.prompt()?;
        if prompt.mode() != PromptMode::Claim || prompt.box_number() != key_box.box_number {
            return Err(Error::OutOfOrder("the box was not being claimed"));
        }

        self.replace_box(key_box.clone());
        self.open(&key_box, password)
    }

    /// The password was verified, open the box
    pub fn verified(&mut self, password: &str) -> Result<&Draft, Error> {
        let prompt = self.prompt()?;
        if prompt.mode() != PromptMode::Unlock {
            return Err(Error::OutOfOrder("the box was not being unlocked"));
        }

        let key_box = self.find_box(prompt.box_number())?.clone();
        self.open(&key_box, password)
    }

    /// The opened box
    pub fn draft(&self) -> Result<&Draft, Error> {
        match &self.phase {
            Phase::Editing(draft) => Ok(draft),
            _ => Err(Error::OutOfOrder("no box is opened")),
        }
    }

    /// The opened box, for editing
    pub fn draft_mut(&mut self) -> Result<&mut Draft, Error> {
        match &mut self.phase {
            Phase::Editing(draft) => Ok(draft),
            _ => Err(Error::OutOfOrder("no box is opened")),
        }
    }

    /// Build the update for the opened box
    pub fn save(&mut self) -> Result<UpdateBoxForm, Error> {
        let seal_with = if self.protect_content {
            self.password.as_ref().map(|password| password.as_str())
        } else {
            None
        };

        match &mut self.phase {
            Phase::Editing(draft) => draft.prepare_save(seal_with),
            _ => Err(Error::OutOfOrder("no box is opened")),
        }
    }

    /// The update was stored
    pub fn saved(&mut self, key_box: BoxResponse) -> Result<(), Error> {
        self.draft_mut()?.commit();
        self.replace_box(key_box);

        Ok(())
    }

    /// Box number to reset, i.e. `DELETE /api/boxes?boxNumber=..`
    pub fn reset(&self) -> Result<i32, Error> {
        Ok(self.draft()?.box_number())
    }

    /// The box was reset, back to the list
    pub fn was_reset(&mut self, key_box: BoxResponse) {
        self.replace_box(key_box);
        self.leave();
    }

    /// Close the opened box
    ///
    /// Refuses when there are unsaved changes, unless forced
    pub fn close(&mut self, force: bool) -> Result<(), Error> {
        if !force && self.draft()?.has_unsaved_changes() {
            return Err(Error::UnsavedChanges);
        }

        self.leave();

        Ok(())
    }

    fn open(&mut self, key_box: &BoxResponse, password: &str) -> Result<&Draft, Error> {
        let draft = Draft::open(key_box, password)?;

        self.password = Some(Zeroizing::new(password.to_string()));
        self.phase = Phase::Editing(draft);

        self.draft()
    }

    fn leave(&mut self) {
        self.password = None;
        self.phase = Phase::Browsing;
    }

    fn prompt(&self) -> Result<&PasswordPrompt, Error> {
        match &self.phase {
            Phase::Prompting(prompt) => Ok(prompt),
            _ => Err(Error::OutOfOrder("no box is selected")),
        }
    }

    fn find_box(&self, box_number: i32) -> Result<&BoxResponse, Error> {
        self.boxes
            .iter()
            .find(|key_box| key_box.box_number == box_number)
            .ok_or(Error::UnknownBox(box_number))
    }

    fn replace_box(&mut self, key_box: BoxResponse) {
        if let Some(existing) = self
            .boxes
            .iter_mut()
            .find(|existing| existing.box_number == key_box.box_number)
        {
            *existing = key_box;
        } else {
            self.boxes.push(key_box);
        }
    }
}
