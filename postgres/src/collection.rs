//! [`Collection`] over the shared `documents` table.

use clientdesk_core::store::{Collection, Document, Filter, StoreError, StoreFuture};
use serde_json::Value;
use sqlx::PgPool;
use std::marker::PhantomData;

/// Documents of type `T`, stored as JSONB rows tagged with `T::COLLECTION`.
pub struct PostgresCollection<T> {
    pool: PgPool,
    _document: PhantomData<fn() -> T>,
}

impl<T> Clone for PostgresCollection<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _document: PhantomData,
        }
    }
}

impl<T: Document> PostgresCollection<T> {
    /// Create a collection on an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _document: PhantomData,
        }
    }
}

fn backend(err: &sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn encode<T: Document>(document: &T) -> Result<Value, StoreError> {
    serde_json::to_value(document).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode<T: Document>(body: Value) -> Result<T, StoreError> {
    serde_json::from_value(body).map_err(|e| StoreError::Serialization(e.to_string()))
}

impl<T: Document> Collection<T> for PostgresCollection<T> {
    fn get<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<T>> {
        Box::pin(async move {
            let row: Option<(Value,)> =
                sqlx::query_as("SELECT body FROM documents WHERE collection = $1 AND id = $2")
                    .bind(T::COLLECTION)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| backend(&e))?;
            row.map(|(body,)| decode(body)).transpose()
        })
    }

    fn find<'a>(&'a self, filter: &'a Filter) -> StoreFuture<'a, Vec<T>> {
        Box::pin(async move {
            let rows: Vec<(Value,)> = sqlx::query_as(
                r"
                SELECT body FROM documents
                WHERE collection = $1 AND body @> $2
                ORDER BY created_at ASC
                ",
            )
            .bind(T::COLLECTION)
            .bind(filter.to_json())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| backend(&e))?;
            rows.into_iter().map(|(body,)| decode(body)).collect()
        })
    }

    fn insert<'a>(&'a self, document: &'a T) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let result = sqlx::query(
                r"
                INSERT INTO documents (collection, id, body)
                VALUES ($1, $2, $3)
                ON CONFLICT (collection, id) DO NOTHING
                ",
            )
            .bind(T::COLLECTION)
            .bind(document.id())
            .bind(encode(document)?)
            .execute(&self.pool)
            .await
            .map_err(|e| backend(&e))?;

            if result.rows_affected() == 0 {
                return Err(StoreError::Conflict {
                    collection: T::COLLECTION,
                    id: document.id().to_string(),
                });
            }
            Ok(())
        })
    }

    fn replace<'a>(&'a self, document: &'a T) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let result = sqlx::query(
                r"
                UPDATE documents SET body = $3, updated_at = now()
                WHERE collection = $1 AND id = $2
                ",
            )
            .bind(T::COLLECTION)
            .bind(document.id())
            .bind(encode(document)?)
            .execute(&self.pool)
            .await
            .map_err(|e| backend(&e))?;

            if result.rows_affected() == 0 {
                return Err(StoreError::NotFound {
                    collection: T::COLLECTION,
                    id: document.id().to_string(),
                });
            }
            Ok(())
        })
    }

    fn replace_if<'a>(&'a self, document: &'a T, guard: &'a Filter) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            // Single statement: the containment check and the write happen
            // under the same row lock.
            let result = sqlx::query(
                r"
                UPDATE documents SET body = $3, updated_at = now()
                WHERE collection = $1 AND id = $2 AND body @> $4
                ",
            )
            .bind(T::COLLECTION)
            .bind(document.id())
            .bind(encode(document)?)
            .bind(guard.to_json())
            .execute(&self.pool)
            .await
            .map_err(|e| backend(&e))?;

            let applied = result.rows_affected() > 0;
            if !applied {
                tracing::debug!(
                    collection = T::COLLECTION,
                    id = document.id(),
                    "Conditional update lost"
                );
            }
            Ok(applied)
        })
    }

    fn delete<'a>(&'a self, id: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
                .bind(T::COLLECTION)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| backend(&e))?;
            Ok(result.rows_affected() > 0)
        })
    }
}
