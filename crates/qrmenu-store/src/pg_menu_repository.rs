//! `PostgreSQL` implementation of the `MenuRepository` trait.
//!
//! Each menu is one row; content and history are JSONB documents written
//! whole on every save. View counters and the saved QR reference have their
//! own single-statement writes so they never race a whole-row save. The `menus_public_token_key` unique constraint is
//! what guarantees two menus never share a token.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qrmenu_core::error::DomainError;
use qrmenu_menu::domain::aggregates::{Menu, MenuRecord};
use qrmenu_menu::domain::content::MenuContent;
use qrmenu_menu::domain::history::Version;
use qrmenu_menu::domain::repository::{ArtifactAttachment, MenuRepository};
use qrmenu_menu::domain::token::PublicToken;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

/// Name of the unique constraint on `menus.public_token`.
pub const PUBLIC_TOKEN_CONSTRAINT: &str = "menus_public_token_key";

const MENU_COLUMNS: &str = "id, public_token, current_version, content, history, \
     qr_artifact_ref, views, last_viewed_at, created_at, updated_at";

const SELECT_MENU: &str = "SELECT id, public_token, current_version, content, history, \
     qr_artifact_ref, views, last_viewed_at, created_at, updated_at FROM menus";

/// PostgreSQL-backed menu repository.
#[derive(Debug, Clone)]
pub struct PgMenuRepository {
    pool: PgPool,
}

impl PgMenuRepository {
    /// Creates a new `PgMenuRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_db_error(error: sqlx::Error) -> DomainError {
    debug!(error = %error, "database operation failed");
    DomainError::Infrastructure(error.to_string())
}

/// Like [`map_db_error`], but reports a public-token uniqueness violation as
/// `DomainError::TokenConflict` so the allocator can retry.
fn map_write_error(error: sqlx::Error, token: &PublicToken) -> DomainError {
    if let sqlx::Error::Database(db) = &error {
        if db.is_unique_violation() && db.constraint() == Some(PUBLIC_TOKEN_CONSTRAINT) {
            return DomainError::TokenConflict(token.to_string());
        }
    }
    map_db_error(error)
}

fn row_to_menu(row: &PgRow) -> Result<Menu, DomainError> {
    let raw_token: String = row.try_get("public_token").map_err(map_db_error)?;
    let public_token = PublicToken::parse(&raw_token).map_err(|_| {
        DomainError::Infrastructure(format!("stored public token {raw_token:?} is malformed"))
    })?;
    let Json(content): Json<MenuContent> = row.try_get("content").map_err(map_db_error)?;
    let Json(history): Json<Vec<Version>> = row.try_get("history").map_err(map_db_error)?;
    let last_viewed_at: Option<DateTime<Utc>> =
        row.try_get("last_viewed_at").map_err(map_db_error)?;

    Menu::from_record(MenuRecord {
        id: row.try_get("id").map_err(map_db_error)?,
        public_token,
        current_version_number: row.try_get("current_version").map_err(map_db_error)?,
        history,
        content,
        qr_artifact_ref: row.try_get("qr_artifact_ref").map_err(map_db_error)?,
        views: row.try_get("views").map_err(map_db_error)?,
        last_viewed_at,
        created_at: row.try_get("created_at").map_err(map_db_error)?,
        updated_at: row.try_get("updated_at").map_err(map_db_error)?,
    })
}

#[async_trait]
impl MenuRepository for PgMenuRepository {
    async fn load(&self, menu_id: Uuid) -> Result<Option<Menu>, DomainError> {
        let row = sqlx::query(&format!("{SELECT_MENU} WHERE id = $1"))
            .bind(menu_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        row.as_ref().map(row_to_menu).transpose()
    }

    async fn find_by_token(&self, token: &PublicToken) -> Result<Option<Menu>, DomainError> {
        let row = sqlx::query(&format!("{SELECT_MENU} WHERE public_token = $1"))
            .bind(token.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        row.as_ref().map(row_to_menu).transpose()
    }

    async fn token_exists(&self, token: &PublicToken) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM menus WHERE public_token = $1)")
            .bind(token.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    async fn list(&self) -> Result<Vec<Menu>, DomainError> {
        let rows = sqlx::query(&format!("{SELECT_MENU} ORDER BY created_at DESC"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;
        rows.iter().map(row_to_menu).collect()
    }

    async fn insert(&self, menu: &Menu) -> Result<(), DomainError> {
        let record = menu.to_record();
        sqlx::query(
            "INSERT INTO menus (id, public_token, current_version, content, history, \
             qr_artifact_ref, views, last_viewed_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(record.id)
        .bind(record.public_token.as_str())
        .bind(record.current_version_number)
        .bind(Json(&record.content))
        .bind(Json(&record.history))
        .bind(record.qr_artifact_ref.as_deref())
        .bind(record.views)
        .bind(record.last_viewed_at)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &record.public_token))?;
        Ok(())
    }

    async fn save(&self, menu: &Menu) -> Result<(), DomainError> {
        let record = menu.to_record();
        let result = sqlx::query(
            "UPDATE menus SET public_token = $2, current_version = $3, content = $4, \
             history = $5, qr_artifact_ref = $6, updated_at = $7 WHERE id = $1",
        )
        .bind(record.id)
        .bind(record.public_token.as_str())
        .bind(record.current_version_number)
        .bind(Json(&record.content))
        .bind(Json(&record.history))
        .bind(record.qr_artifact_ref.as_deref())
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &record.public_token))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::AggregateNotFound(record.id));
        }
        Ok(())
    }

    async fn record_view(
        &self,
        token: &PublicToken,
        at: DateTime<Utc>,
    ) -> Result<Option<Menu>, DomainError> {
        let row = sqlx::query(&format!(
            "UPDATE menus SET views = views + 1, last_viewed_at = $2 \
             WHERE public_token = $1 RETURNING {MENU_COLUMNS}"
        ))
        .bind(token.as_str())
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        row.as_ref().map(row_to_menu).transpose()
    }

    async fn attach_qr_artifact(
        &self,
        menu_id: Uuid,
        expected_token: &PublicToken,
        reference: &str,
        at: DateTime<Utc>,
    ) -> Result<ArtifactAttachment, DomainError> {
        let row = sqlx::query(
            "UPDATE menus AS m SET qr_artifact_ref = $3, updated_at = $4 \
             FROM (SELECT id, qr_artifact_ref FROM menus \
                   WHERE id = $1 AND public_token = $2 FOR UPDATE) AS old \
             WHERE m.id = old.id RETURNING old.qr_artifact_ref AS previous",
        )
        .bind(menu_id)
        .bind(expected_token.as_str())
        .bind(reference)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        let Some(row) = row else {
            return Ok(ArtifactAttachment::Stale);
        };
        let previous: Option<String> = row.try_get("previous").map_err(map_db_error)?;
        Ok(ArtifactAttachment::Attached {
            replaced: previous.filter(|p| p != reference),
        })
    }

    async fn delete(&self, menu_id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(menu_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }
}
