//! Postgres storage

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::boxes::KeyBox;

use super::CreateBoxesValues;
use super::Error;
use super::Result;
use super::Storage;
use super::UpdateBoxValues;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Columns of a box, in the order of [`SqlxBox`]
const BOX_COLUMNS: &str = r"
    id,
    box_number,
    title,
    content,
    hashed_password,
    is_used,
    created_at,
    updated_at
";

/// Postgres storage
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Create Postgres storage
    ///
    /// Migrations will be run
    pub async fn new(database_connection_string: &str) -> Result<Self> {
        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_connection_string)
            .await
            .map_err(connection_error)?;

        Self::new_with_pool(connection_pool).await
    }

    /// Create Postgres storage with existing pool
    ///
    /// Migrations will be run
    pub async fn new_with_pool(connection_pool: PgPool) -> Result<Self> {
        MIGRATOR
            .run(&connection_pool)
            .await
            .map_err(|err| Error::Migration(err.to_string()))?;

        Ok(Self { connection_pool })
    }
}

/// `SQLx` version of a box
#[derive(sqlx::FromRow)]
struct SqlxBox {
    /// Box ID
    id: Uuid,

    /// Slot number
    box_number: i32,

    /// Title
    title: String,

    /// Content
    content: String,

    /// Hashed password
    hashed_password: String,

    /// Is the box used
    is_used: bool,

    /// Creation date
    created_at: NaiveDateTime,

    /// Last updated at
    updated_at: NaiveDateTime,
}

impl KeyBox {
    /// Create box from `SQLx` version
    fn from_sqlx_box(key_box: SqlxBox) -> Self {
        Self {
            id: key_box.id,
            box_number: key_box.box_number,
            title: key_box.title,
            content: key_box.content,
            hashed_password: key_box.hashed_password,
            is_used: key_box.is_used,
            created_at: key_box.created_at,
            updated_at: key_box.updated_at,
        }
    }

    /// Maybe create box from `SQLx` version
    fn from_sqlx_box_optional(key_box: Option<SqlxBox>) -> Option<Self> {
        key_box.map(Self::from_sqlx_box)
    }

    /// Create multiple boxes from `SQLx` version
    fn from_sqlx_box_multiple(boxes: Vec<SqlxBox>) -> Vec<Self> {
        boxes.into_iter().map(Self::from_sqlx_box).collect()
    }
}

#[async_trait]
impl Storage for Postgres {
    async fn find_all_boxes(&self) -> Result<Vec<KeyBox>> {
        let boxes = sqlx::query_as::<_, SqlxBox>(&format!(
            r"
            SELECT {BOX_COLUMNS}
            FROM boxes
            ORDER BY box_number ASC
            "
        ))
        .fetch_all(&self.connection_pool)
        .await
        .map(KeyBox::from_sqlx_box_multiple)
        .map_err(connection_error)?;

        Ok(boxes)
    }

    async fn find_single_box_by_number(&self, box_number: i32) -> Result<Option<KeyBox>> {
        let key_box = sqlx::query_as::<_, SqlxBox>(&format!(
            r"
            SELECT {BOX_COLUMNS}
            FROM boxes
            WHERE box_number = $1
            LIMIT 1
            "
        ))
        .bind(box_number)
        .fetch_optional(&self.connection_pool)
        .await
        .map(KeyBox::from_sqlx_box_optional)
        .map_err(connection_error)?;

        Ok(key_box)
    }

    async fn create_boxes(&self, values: &CreateBoxesValues) -> Result<Vec<KeyBox>> {
        let box_numbers = (1..=values.count).collect::<Vec<i32>>();
        let ids = box_numbers
            .iter()
            .map(|_| Uuid::new_v4())
            .collect::<Vec<Uuid>>();

        // single statement, so either all rows land or none do
        let inserted = sqlx::query(
            r"
            INSERT INTO boxes (id, box_number)
            SELECT * FROM UNNEST($1::uuid[], $2::int4[])
            ON CONFLICT (box_number) DO NOTHING
            ",
        )
        .bind(ids)
        .bind(box_numbers)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        tracing::debug!("Created {} boxes", inserted.rows_affected());

        self.find_all_boxes().await
    }

    async fn update_box(
        &self,
        key_box: &KeyBox,
        values: &UpdateBoxValues<'_>,
    ) -> Result<KeyBox> {
        let updated_box = sqlx::query_as::<_, SqlxBox>(&format!(
            r"
            UPDATE boxes
            SET title = $1,
                content = $2,
                hashed_password = COALESCE($3, hashed_password),
                is_used = TRUE,
                updated_at = CURRENT_TIMESTAMP
            WHERE box_number = $4
                AND (is_used OR $3 IS NOT NULL)
            RETURNING {BOX_COLUMNS}
            "
        ))
        .bind(values.title)
        .bind(values.content)
        .bind(values.hashed_password)
        .bind(key_box.box_number)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        // boxes are never deleted, so no row without a password means it was released
        updated_box.map(KeyBox::from_sqlx_box).ok_or_else(|| {
            if values.hashed_password.is_none() {
                Error::ReleasedBox(key_box.box_number)
            } else {
                Error::MissingBox(key_box.box_number)
            }
        })
    }

    async fn reset_box(&self, key_box: &KeyBox) -> Result<KeyBox> {
        let reset_box = sqlx::query_as::<_, SqlxBox>(&format!(
            r"
            UPDATE boxes
            SET title = '',
                content = '',
                hashed_password = '',
                is_used = FALSE,
                updated_at = CURRENT_TIMESTAMP
            WHERE box_number = $1
            RETURNING {BOX_COLUMNS}
            "
        ))
        .bind(key_box.box_number)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        reset_box
            .map(KeyBox::from_sqlx_box)
            .ok_or(Error::MissingBox(key_box.box_number))
    }
}

/// Convert `SQLx` to storage connection error
fn connection_error<E>(err: E) -> Error
where
    E: std::error::Error,
{
    Error::Connection(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = false)]
    #[ignore = "requires a Postgres database in DATABASE_URL"]
    async fn test_create_boxes_once(pool: PgPool) {
        let storage = Postgres::new_with_pool(pool).await.unwrap();

        let boxes = storage
            .create_boxes(&CreateBoxesValues { count: 5 })
            .await
            .unwrap();
        assert_eq!(5, boxes.len());
        assert!(boxes.iter().all(KeyBox::is_unused));

        let again = storage
            .create_boxes(&CreateBoxesValues { count: 5 })
            .await
            .unwrap();
        assert_eq!(boxes, again);
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires a Postgres database in DATABASE_URL"]
    async fn test_update_and_reset(pool: PgPool) {
        let storage = Postgres::new_with_pool(pool).await.unwrap();
        storage
            .create_boxes(&CreateBoxesValues { count: 2 })
            .await
            .unwrap();

        let key_box = storage.find_single_box_by_number(2).await.unwrap().unwrap();

        let values = UpdateBoxValues {
            title: "t",
            content: "c",
            hashed_password: Some("hash"),
        };
        let key_box = storage.update_box(&key_box, &values).await.unwrap();
        assert!(key_box.is_used);

        let values = UpdateBoxValues {
            title: "t",
            content: "c2",
            hashed_password: None,
        };
        let key_box = storage.update_box(&key_box, &values).await.unwrap();
        assert_eq!("hash", key_box.hashed_password);
        assert_eq!("c2", key_box.content);

        let reset_box = storage.reset_box(&key_box).await.unwrap();
        assert!(reset_box.is_unused());

        // the stale used box can not bring the old password back
        let values = UpdateBoxValues {
            title: "t3",
            content: "c3",
            hashed_password: None,
        };
        let result = storage.update_box(&key_box, &values).await;
        assert!(matches!(result, Err(Error::ReleasedBox(2))));

        let key_box = storage.find_single_box_by_number(2).await.unwrap().unwrap();
        assert!(key_box.is_unused());
    }
}
