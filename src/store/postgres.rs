use super::{BoxFuture, PasswordRecord, Repository, ValidationRecord};
use crate::generator::GenerationOptions;
use anyhow::{Context, Result};
use sqlx::{Connection, PgPool};
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

pub const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

const INSERT_REQUEST: &str = "INSERT INTO password_requests \
    (id, length, include_uppercase, include_lowercase, include_numbers, include_symbols, \
    exclude_ambiguous, exclude_chars, require_each, count) \
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)";

const INSERT_PASSWORD: &str = "INSERT INTO generated_passwords \
    (request_id, password_hash, strength_score) VALUES ($1, $2, $3)";

const INSERT_VALIDATION: &str = "INSERT INTO password_validations \
    (password_hash, requirements_json, result) VALUES ($1, $2::jsonb, $3)";

#[derive(Clone, Debug)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error if any statement of the schema fails.
    pub async fn apply_schema(&self) -> Result<()> {
        let span = info_span!("db.query", db.system = "postgresql", db.operation = "DDL");
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("Failed to apply database schema")?;
        debug!("Database schema applied");
        Ok(())
    }

    async fn insert_generation(
        &self,
        options: &GenerationOptions,
        records: &[PasswordRecord],
    ) -> Result<Uuid> {
        let id = Uuid::now_v7();
        let length = i16::try_from(options.length).context("length does not fit SMALLINT")?;
        let count = i32::try_from(records.len()).context("count does not fit INTEGER")?;

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin password request transaction")?;

        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = INSERT_REQUEST
        );
        sqlx::query(INSERT_REQUEST)
            .bind(id)
            .bind(length)
            .bind(options.include_upper)
            .bind(options.include_lower)
            .bind(options.include_digits)
            .bind(options.include_symbols)
            .bind(options.avoid_ambiguous)
            .bind(options.exclude_chars.as_str())
            .bind(options.require_each_category)
            .bind(count)
            .execute(&mut *tx)
            .instrument(span)
            .await
            .context("Failed to insert password request")?;

        for record in records {
            let span = info_span!(
                "db.query",
                db.system = "postgresql",
                db.operation = "INSERT",
                db.statement = INSERT_PASSWORD
            );
            sqlx::query(INSERT_PASSWORD)
                .bind(id)
                .bind(record.password_hash.as_str())
                .bind(i16::from(record.strength_score))
                .execute(&mut *tx)
                .instrument(span)
                .await
                .context("Failed to insert generated password")?;
        }

        // Dropping `tx` on an early return rolls the request row back.
        tx.commit()
            .await
            .context("Failed to commit password request")?;

        Ok(id)
    }

    async fn insert_validation(&self, record: &ValidationRecord) -> Result<()> {
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = INSERT_VALIDATION
        );
        sqlx::query(INSERT_VALIDATION)
            .bind(record.password_hash.as_str())
            .bind(record.requirements.to_string())
            .bind(record.result)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("Failed to insert password validation")?;

        Ok(())
    }

    async fn ping_database(&self) -> Result<()> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .context("Failed to acquire database connection")?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .context("Failed to ping database")
    }
}

impl Repository for PgRepository {
    fn log_generation<'a>(
        &'a self,
        options: &'a GenerationOptions,
        records: &'a [PasswordRecord],
    ) -> BoxFuture<'a, Result<Uuid>> {
        Box::pin(self.insert_generation(options, records))
    }

    fn log_validation<'a>(&'a self, record: &'a ValidationRecord) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.insert_validation(record))
    }

    fn ping(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.ping_database())
    }
}
