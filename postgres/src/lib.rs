//! `PostgreSQL` document store for ClientDesk.
//!
//! Implements [`clientdesk_core::store::Collection`] over a single table:
//!
//! ```sql
//! documents(collection TEXT, id TEXT, body JSONB, created_at, updated_at)
//! ```
//!
//! Filters are answered with JSONB containment (`body @> $filter`), and
//! conditional updates add the same containment test to the `UPDATE`, so a
//! claim either applies atomically or affects no rows.
//!
//! # Example
//!
//! ```ignore
//! use clientdesk_postgres::PostgresStore;
//! use clientdesk_core::Appointment;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PostgresStore::connect("postgres://localhost/clientdesk", 10).await?;
//!     store.migrate().await?;
//!     let appointments = store.collection::<Appointment>();
//!     Ok(())
//! }
//! ```

mod collection;

pub use collection::PostgresCollection;

use clientdesk_core::store::{Document, StoreError};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Connection pool plus collection factory.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect with a bounded pool.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the database cannot be reached.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        tracing::info!(max_connections, "Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Check connectivity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the round trip fails.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    /// Typed view of one collection.
    #[must_use]
    pub fn collection<T: Document>(&self) -> PostgresCollection<T> {
        PostgresCollection::new(self.pool.clone())
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}
