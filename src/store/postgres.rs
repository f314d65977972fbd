use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use super::{
    ensure_id, into_document, merge_patch, Collection, DeleteResult, Document, DocumentStore,
    Filter, InsertResult, Page, StoreError, UpdateResult,
};

/// Documents kept as JSONB rows of a single `documents` table.
///
/// Filters are evaluated with `body @> filter`, which is exact equality for the
/// scalar values the API filters on.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    db: PgPool,
}

impl PgDocumentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn first_match(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<(String, Document)>, StoreError> {
        let row: Option<(String, Value)> = sqlx::query_as(
            "SELECT id, body FROM documents
             WHERE collection = $1 AND body @> $2
             ORDER BY seq
             LIMIT 1",
        )
        .bind(collection.as_str())
        .bind(filter.to_json())
        .fetch_optional(&self.db)
        .await?;

        row.map(|(id, body)| into_document(body).map(|document| (id, document)))
            .transpose()
    }
}

/// `OFFSET`/`LIMIT` binds for a page; values past `i64::MAX` saturate.
fn sql_window(page: Page) -> (i64, Option<i64>) {
    let clamp = |value: u64| i64::try_from(value).unwrap_or(i64::MAX);
    (page.skip.map(clamp).unwrap_or(0), page.limit.map(clamp))
}

fn insert_error(collection: Collection, err: sqlx::Error) -> StoreError {
    let unique_violation =
        matches!(&err, sqlx::Error::Database(db_err) if db_err.is_unique_violation());
    match collection.unique_field() {
        Some(field) if unique_violation => StoreError::UniqueViolation(field),
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        page: Page,
    ) -> Result<Vec<Document>, StoreError> {
        let (offset, limit) = sql_window(page);
        let bodies: Vec<Value> = sqlx::query_scalar(
            "SELECT body FROM documents
             WHERE collection = $1 AND body @> $2
             ORDER BY seq
             OFFSET $3
             LIMIT $4",
        )
        .bind(collection.as_str())
        .bind(filter.to_json())
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        bodies.into_iter().map(into_document).collect()
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .first_match(collection, filter)
            .await?
            .map(|(_, document)| document))
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut document: Document,
    ) -> Result<InsertResult, StoreError> {
        let id = ensure_id(&mut document)?;

        let result = sqlx::query(
            "INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)
             ON CONFLICT (collection, id) DO NOTHING",
        )
        .bind(collection.as_str())
        .bind(&id)
        .bind(Value::Object(document))
        .execute(&self.db)
        .await
        .map_err(|err| insert_error(collection, err))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::DuplicateId(id));
        }

        Ok(InsertResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: Document,
    ) -> Result<UpdateResult, StoreError> {
        let (id, mut document) = match self.first_match(collection, filter).await? {
            Some(found) => found,
            None => {
                return Ok(UpdateResult {
                    acknowledged: true,
                    matched_count: 0,
                    modified_count: 0,
                })
            }
        };

        if !merge_patch(&mut document, patch) {
            return Ok(UpdateResult {
                acknowledged: true,
                matched_count: 1,
                modified_count: 0,
            });
        }

        let result = sqlx::query("UPDATE documents SET body = $3 WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(&id)
            .bind(Value::Object(document))
            .execute(&self.db)
            .await?;

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: result.rows_affected(),
            modified_count: result.rows_affected(),
        })
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<DeleteResult, StoreError> {
        let result = sqlx::query(
            "DELETE FROM documents
             WHERE collection = $1 AND id = (
                 SELECT id FROM documents
                 WHERE collection = $1 AND body @> $2
                 ORDER BY seq
                 LIMIT 1
             )",
        )
        .bind(collection.as_str())
        .bind(filter.to_json())
        .execute(&self.db)
        .await?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: result.rows_affected(),
        })
    }

    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM documents WHERE collection = $1 AND body @> $2",
        )
        .bind(collection.as_str())
        .bind(filter.to_json())
        .fetch_one(&self.db)
        .await?;

        Ok(count as u64)
    }

    async fn sum(
        &self,
        collection: Collection,
        filter: &Filter,
        field: &str,
    ) -> Result<f64, StoreError> {
        let total: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM((body->>$3)::float8), 0)::float8 FROM documents
             WHERE collection = $1 AND body @> $2 AND jsonb_typeof(body->$3) = 'number'",
        )
        .bind(collection.as_str())
        .bind(filter.to_json())
        .bind(field)
        .fetch_one(&self.db)
        .await?;

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_window_saturates_out_of_range_values() {
        assert_eq!(sql_window(Page::default()), (0, None));
        assert_eq!(sql_window(Page::new(10, 5)), (10, Some(5)));
        assert_eq!(
            sql_window(Page::new(u64::MAX, u64::MAX)),
            (i64::MAX, Some(i64::MAX))
        );
        assert_eq!(
            sql_window(Page { skip: Some(1 << 63), limit: None }),
            (i64::MAX, None)
        );
    }

    #[test]
    fn test_non_database_insert_errors_pass_through() {
        let err = insert_error(Collection::Users, sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
    }
}
