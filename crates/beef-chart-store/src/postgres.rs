//! `PostgreSQL` storage implementation.
//!
//! The cut table is a plain SQL table. `TRUNCATE` does not restart the
//! identity sequence, so ids are never reused. Prices are exchanged with the
//! database as integer cents and stored as `NUMERIC(10,2)`.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use beef_chart_core::{CutId, CutRecord, CutUpdate, NewCut, Price};

use crate::error::{Result, StoreError};
use crate::schema;
use crate::Store;

/// `undefined_table` SQLSTATE.
const UNDEFINED_TABLE: &str = "42P01";

/// PostgreSQL-backed storage implementation.
pub struct PgStore {
    pool: PgPool,
    table_name: String,
}

impl PgStore {
    /// Connect to the database.
    ///
    /// The table name must come from [`schema::table_name`], which restricts
    /// it to characters that are safe to interpolate as an identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection pool cannot be created.
    pub async fn connect(database_url: &str, table_name: impl Into<String>) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self::from_pool(pool, table_name))
    }

    /// Wrap an existing pool.
    #[must_use]
    pub fn from_pool(pool: PgPool, table_name: impl Into<String>) -> Self {
        Self {
            pool,
            table_name: table_name.into(),
        }
    }

    fn map_err(&self, err: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(db) = &err {
            if db.code().as_deref() == Some(UNDEFINED_TABLE) {
                return StoreError::TableMissing(self.table_name.clone());
            }
        }
        StoreError::Database(err.to_string())
    }

    fn row_to_record(row: &PgRow) -> Result<CutRecord> {
        let raw_id: i64 = row
            .try_get("id")
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let id = u64::try_from(raw_id)
            .ok()
            .and_then(CutId::new)
            .ok_or_else(|| StoreError::Serialization(format!("invalid id: {raw_id}")))?;

        Ok(CutRecord {
            id,
            name: row
                .try_get("name")
                .map_err(|e| StoreError::Serialization(e.to_string()))?,
            price: Price::from_cents(
                row.try_get("price_cents")
                    .map_err(|e| StoreError::Serialization(e.to_string()))?,
            ),
            available: row
                .try_get("available")
                .map_err(|e| StoreError::Serialization(e.to_string()))?,
        })
    }

    fn db_id(id: CutId) -> Result<i64> {
        i64::try_from(id.get()).map_err(|_| StoreError::NotFound)
    }
}

#[async_trait]
impl Store for PgStore {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn table_exists(&self) -> Result<bool> {
        // Quoted, so the lookup matches the case-sensitive name the DDL creates
        sqlx::query_scalar::<_, bool>("SELECT to_regclass($1) IS NOT NULL")
            .bind(schema::quoted_identifier(&self.table_name))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| self.map_err(e))
    }

    async fn create_table(&self) -> Result<()> {
        let sql = format!(
            r#"CREATE TABLE IF NOT EXISTS "{}" (
                id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
                name VARCHAR(100) NOT NULL,
                price NUMERIC(10, 2) NOT NULL,
                available BOOLEAN NOT NULL DEFAULT TRUE
            )"#,
            self.table_name
        );

        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| self.map_err(e))?;

        tracing::info!(table = %self.table_name, "Ensured cut table exists");
        Ok(())
    }

    async fn truncate(&self) -> Result<()> {
        let sql = format!(r#"TRUNCATE TABLE "{}""#, self.table_name);
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| self.map_err(e))?;
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        let sql = format!(r#"SELECT COUNT(*) FROM "{}""#, self.table_name);
        let count: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| self.map_err(e))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn list(&self) -> Result<Vec<CutRecord>> {
        let sql = format!(
            r#"SELECT id, name, (price * 100)::BIGINT AS price_cents, available
               FROM "{}" ORDER BY id"#,
            self.table_name
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| self.map_err(e))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn get(&self, id: CutId) -> Result<Option<CutRecord>> {
        let sql = format!(
            r#"SELECT id, name, (price * 100)::BIGINT AS price_cents, available
               FROM "{}" WHERE id = $1"#,
            self.table_name
        );
        let row = sqlx::query(&sql)
            .bind(Self::db_id(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| self.map_err(e))?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn insert(&self, cut: &NewCut) -> Result<CutRecord> {
        schema::check_new_cut(cut)?;

        let sql = format!(
            r#"INSERT INTO "{}" (name, price, available)
               VALUES ($1, $2::BIGINT::NUMERIC / 100, $3)
               RETURNING id, name, (price * 100)::BIGINT AS price_cents, available"#,
            self.table_name
        );
        let row = sqlx::query(&sql)
            .bind(&cut.name)
            .bind(cut.price.cents())
            .bind(cut.available)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| self.map_err(e))?;

        Self::row_to_record(&row)
    }

    async fn update(&self, id: CutId, update: &CutUpdate) -> Result<()> {
        schema::check_update(update)?;

        let sql = format!(
            r#"UPDATE "{}" SET price = $1::BIGINT::NUMERIC / 100, available = $2
               WHERE id = $3"#,
            self.table_name
        );
        let result = sqlx::query(&sql)
            .bind(update.price.cents())
            .bind(update.available)
            .bind(Self::db_id(id)?)
            .execute(&self.pool)
            .await
            .map_err(|e| self.map_err(e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
