use std::time::Instant;

use chrono::{DateTime, Utc};
use pkgdoc_core::error::AppError;
use pkgdoc_core::models::{Document, Package};
use pkgdoc_core::traits::PackageCache;
use sqlx::{PgPool, Pool, Postgres};

/// Package document cache in PostgreSQL, keyed by normalized import path.
///
/// Query failures surface as [`AppError::CacheUnavailable`].
#[derive(Clone)]
pub struct PackageStore {
    pool: Pool<Postgres>,
}

impl PackageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the cached document for an import path.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Document>, AppError> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, package, raw_html, content_hash
            FROM package_documents
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::CacheUnavailable(e.to_string()))?;

        tracing::debug!(
            operation = "get_by_id",
            %id,
            hit = row.is_some(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Cache lookup"
        );
        row.map(Document::try_from).transpose()
    }

    /// Insert a document, or replace the row with the same id.
    pub async fn upsert(&self, document: &Document) -> Result<(), AppError> {
        let started = Instant::now();
        let package = serde_json::to_value(&document.package)?;

        sqlx::query(
            r#"
            INSERT INTO package_documents (id, package, raw_html, content_hash)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET package = EXCLUDED.package,
                raw_html = EXCLUDED.raw_html,
                content_hash = EXCLUDED.content_hash,
                updated_at = NOW()
            "#,
        )
        .bind(&document.id)
        .bind(&package)
        .bind(&document.raw_html)
        .bind(&document.content_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::CacheUnavailable(e.to_string()))?;

        tracing::debug!(
            operation = "upsert",
            id = %document.id,
            bytes = document.raw_html.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Cache write"
        );
        Ok(())
    }

    /// When the document for `id` was last written.
    pub async fn updated_at(&self, id: &str) -> Result<Option<DateTime<Utc>>, AppError> {
        let row: Option<(DateTime<Utc>,)> =
            sqlx::query_as("SELECT updated_at FROM package_documents WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::CacheUnavailable(e.to_string()))?;
        Ok(row.map(|(ts,)| ts))
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::CacheUnavailable(e.to_string()))?;
        Ok(())
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    package: serde_json::Value,
    raw_html: String,
    content_hash: String,
}

impl TryFrom<DocumentRow> for Document {
    type Error = AppError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        let package: Package = serde_json::from_value(row.package)?;
        Ok(Document {
            id: row.id,
            package,
            raw_html: row.raw_html,
            content_hash: row.content_hash,
        })
    }
}

// -- Trait implementation --

impl PackageCache for PackageStore {
    async fn get_by_id(&self, id: &str) -> Result<Option<Document>, AppError> {
        PackageStore::get_by_id(self, id).await
    }

    async fn upsert(&self, document: &Document) -> Result<(), AppError> {
        PackageStore::upsert(self, document).await
    }
}
