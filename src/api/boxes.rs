//! Boxes API endpoints
//!
//! Listing, updating, resetting and unlocking boxes

use axum::Extension;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::boxes::BoxCount;
use crate::boxes::KeyBox;
use crate::boxes::MAX_TITLE_LENGTH;
use crate::boxes::MIN_PASSWORD_LENGTH;
use crate::boxes::ensure_initial_boxes;
use crate::password::hash;
use crate::password::verify;
use crate::storage::Error as StorageError;
use crate::storage::Storage;
use crate::storage::UpdateBoxValues;

use super::Error;
use super::Form;
use super::QueryParameters;
use super::Success;

/// Box response going to the user
///
/// The hashed password never leaves the service
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxResponse {
    /// Box ID
    pub id: Uuid,

    /// Slot number
    pub box_number: i32,

    /// Title of the box
    pub title: String,

    /// Content of the box, plaintext or a sealed envelope
    pub content: String,

    /// Is a password set for the box?
    pub is_used: bool,

    /// Creation date
    pub created_at: NaiveDateTime,

    /// Last updated at
    pub updated_at: NaiveDateTime,
}

impl BoxResponse {
    /// Create a response from a [`KeyBox`](KeyBox)
    fn from_box(key_box: KeyBox) -> Self {
        Self {
            id: key_box.id,
            box_number: key_box.box_number,
            title: key_box.title,
            content: key_box.content,
            is_used: key_box.is_used,
            created_at: key_box.created_at,
            updated_at: key_box.updated_at,
        }
    }

    /// Create a response from multiple [`KeyBox`](KeyBox)es
    fn from_box_multiple(boxes: Vec<KeyBox>) -> Vec<Self> {
        boxes.into_iter().map(Self::from_box).collect()
    }
}

/// List all boxes
///
/// Creates the initial boxes when there are none yet
///
/// Request:
/// ```sh
/// curl -v http://localhost:6000/api/boxes
/// ```
///
/// Response:
/// ```json
/// { "data": [ { "boxNumber": 1, "title": "", "isUsed": false ... } ] }
/// ```
pub async fn list<S: Storage>(
    Extension(storage): Extension<S>,
    Extension(box_count): Extension<BoxCount>,
) -> Result<Success<Vec<BoxResponse>>, Error> {
    let boxes = ensure_initial_boxes(&storage, box_count.0)
        .await
        .map_err(Error::internal_server_error)?;

    Ok(Success::ok(BoxResponse::from_box_multiple(boxes)))
}

/// Update box form
///
/// Fields that are left out keep their current value
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoxForm {
    /// Slot number of the box
    pub box_number: i32,

    /// New title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// New content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// New password
    ///
    /// Required to claim an unused box, leave it out to keep the current password of a used box
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Only `true` is accepted, use a reset to release a box
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_used: Option<bool>,
}

/// Update a box, claiming it when it is unused
///
/// Request:
/// ```sh
/// curl -v -XPUT -H 'Content-Type: application/json' \
///     -d '{ "boxNumber": 1, "title": "wifi", "content": "hunter2", "password": "abcd" }' \
///     http://localhost:6000/api/boxes
/// ```
///
/// Response:
/// ```json
/// { "data": { "boxNumber": 1, "title": "wifi", "isUsed": true ... } }
/// ```
pub async fn update<S: Storage>(
    Extension(storage): Extension<S>,
    Form(form): Form<UpdateBoxForm>,
) -> Result<Success<BoxResponse>, Error> {
    let key_box = fetch_box(&storage, form.box_number).await?;

    if form.is_used == Some(false) {
        return Err(Error::bad_request("Use a reset to release a box"));
    }

    let title = form.title.as_deref().unwrap_or(key_box.title.as_str());
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(Error::bad_request("Title is too long")
            .with_description(format!("At most {MAX_TITLE_LENGTH} characters")));
    }

    let content = form.content.as_deref().unwrap_or(key_box.content.as_str());

    let hashed_password = match form.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => {
            if password.chars().count() < MIN_PASSWORD_LENGTH {
                return Err(Error::bad_request("Password is too short")
                    .with_description(format!("At least {MIN_PASSWORD_LENGTH} characters")));
            }

            Some(hash(password).map_err(Error::internal_server_error)?)
        }
        None if key_box.is_used => None,
        None => return Err(Error::bad_request("Password required to claim a box")),
    };

    let values = UpdateBoxValues {
        title,
        content,
        hashed_password: hashed_password.as_deref(),
    };

    let updated_box = storage
        .update_box(&key_box, &values)
        .await
        .map_err(|err| match err {
            StorageError::ReleasedBox(_) => {
                Error::bad_request("Password required to claim a box")
                    .with_description("The box was reset in the meantime")
            }
            err => Error::internal_server_error(err),
        })?;

    tracing::debug!(
        "Box #{} updated (claimed: {}, password changed: {})",
        updated_box.box_number,
        !key_box.is_used,
        hashed_password.is_some() && key_box.is_used,
    );

    Ok(Success::ok(BoxResponse::from_box(updated_box)))
}

/// Reset box query
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetBoxQuery {
    /// Slot number of the box
    box_number: i32,
}

/// Reset a box to its empty, unused state
///
/// The box itself stays, only its title, content and password are cleared
///
/// Request:
/// ```sh
/// curl -v -XDELETE http://localhost:6000/api/boxes?boxNumber=1
/// ```
///
/// Response:
/// ```json
/// { "data": { "boxNumber": 1, "title": "", "isUsed": false ... } }
/// ```
pub async fn reset<S: Storage>(
    Extension(storage): Extension<S>,
    QueryParameters(query): QueryParameters<ResetBoxQuery>,
) -> Result<Success<BoxResponse>, Error> {
    let key_box = fetch_box(&storage, query.box_number).await?;

    let reset_box = storage
        .reset_box(&key_box)
        .await
        .map_err(Error::internal_server_error)?;

    debug_assert!(reset_box.is_unused());

    tracing::debug!("Box #{} reset", reset_box.box_number);

    Ok(Success::ok(BoxResponse::from_box(reset_box)))
}

/// Verify password form
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyBoxForm {
    /// Slot number of the box
    pub box_number: i32,

    /// Password to check
    pub password: String,
}

/// Verify password response
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct VerifyResponse {
    /// Always `true`, a mismatch is an error
    pub ok: bool,
}

/// Verify the password of a box
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "boxNumber": 1, "password": "abcd" }' \
///     http://localhost:6000/api/boxes/verify
/// ```
///
/// Response:
/// ```json
/// { "data": { "ok": true } }
/// ```
pub async fn verify_password<S: Storage>(
    Extension(storage): Extension<S>,
    Form(form): Form<VerifyBoxForm>,
) -> Result<Success<VerifyResponse>, Error> {
    let key_box = fetch_box(&storage, form.box_number).await?;

    // an unused box has no password to match
    if !key_box.is_used || !verify(&key_box.hashed_password, &form.password) {
        tracing::debug!("Invalid password for box #{}", key_box.box_number);

        return Err(Error::unauthorized("Invalid password"));
    }

    Ok(Success::ok(VerifyResponse { ok: true }))
}

/// Fetch a box from storage
async fn fetch_box<S: Storage>(storage: &S, box_number: i32) -> Result<KeyBox, Error> {
    storage
        .find_single_box_by_number(box_number)
        .await
        .map_err(Error::internal_server_error)?
        .map_or_else(|| Err(Error::not_found("Box not found")), Ok)
}
