//! `PostgreSQL` implementation of the `EventRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::migrate::MigrateError;
use sqlx::{FromRow, PgPool};
use tracing::{debug, instrument};
use uuid::Uuid;

use catalog_core::error::DomainError;
use catalog_core::repository::{CommittedEvent, EventRepository, StoredEvent};

const SELECT_COLUMNS: &str = "event_id, aggregate_id, event_type, payload, sequence_number, \
     correlation_id, causation_id, occurred_at";

/// PostgreSQL-backed event repository.
#[derive(Debug, Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct EventRow {
    event_id: Uuid,
    aggregate_id: Uuid,
    event_type: String,
    payload: serde_json::Value,
    sequence_number: i64,
    correlation_id: Uuid,
    causation_id: Uuid,
    occurred_at: DateTime<Utc>,
}

impl From<EventRow> for StoredEvent {
    fn from(row: EventRow) -> Self {
        Self {
            event_id: row.event_id,
            aggregate_id: row.aggregate_id,
            event_type: row.event_type,
            payload: row.payload,
            sequence_number: row.sequence_number,
            correlation_id: row.correlation_id,
            causation_id: row.causation_id,
            occurred_at: row.occurred_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct CommittedRow {
    position: i64,
    #[sqlx(flatten)]
    event: EventRow,
}

impl PgEventRepository {
    /// Creates a new `PgEventRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled schema migrations.
    ///
    /// # Errors
    ///
    /// Returns `MigrateError` if a migration fails or the recorded history
    /// does not match the bundled files.
    pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
        sqlx::migrate!("../../migrations").run(pool).await
    }
}

fn database_error(err: &sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("database error: {err}"))
}

#[async_trait]
impl EventRepository for PgEventRepository {
    #[instrument(skip(self))]
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM domain_events \
             WHERE aggregate_id = $1 ORDER BY sequence_number"
        );
        let rows: Vec<EventRow> = sqlx::query_as(&sql)
            .bind(aggregate_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error(&e))?;
        Ok(rows.into_iter().map(StoredEvent::from).collect())
    }

    #[instrument(skip(self, events), fields(count = events.len()))]
    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(|e| database_error(&e))?;

        let actual: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(sequence_number), 0) FROM domain_events WHERE aggregate_id = $1",
        )
        .bind(aggregate_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| database_error(&e))?;

        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }

        for event in events {
            sqlx::query(
                "INSERT INTO domain_events \
                 (event_id, aggregate_id, event_type, payload, sequence_number, \
                  correlation_id, causation_id, occurred_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(event.event_id)
            .bind(event.aggregate_id)
            .bind(&event.event_type)
            .bind(&event.payload)
            .bind(event.sequence_number)
            .bind(event.correlation_id)
            .bind(event.causation_id)
            .bind(event.occurred_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                // A concurrent writer committed the same sequence number
                // between our version read and this insert.
                if e.as_database_error()
                    .is_some_and(|db| db.is_unique_violation())
                {
                    DomainError::ConcurrencyConflict {
                        aggregate_id,
                        expected: expected_version,
                        actual: expected_version + 1,
                    }
                } else {
                    database_error(&e)
                }
            })?;
        }

        tx.commit().await.map_err(|e| database_error(&e))?;
        debug!(%aggregate_id, expected_version, "appended events");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn load_committed_after(
        &self,
        after: i64,
        limit: usize,
    ) -> Result<Vec<CommittedEvent>, DomainError> {
        // Rows written by transactions still in flight may hold lower
        // positions than rows already visible; hold back everything at or
        // above the oldest open transaction so the checkpoint never skips.
        let sql = format!(
            "SELECT position, {SELECT_COLUMNS} FROM domain_events \
             WHERE position > $1 \
               AND transaction_id < pg_snapshot_xmin(pg_current_snapshot()) \
             ORDER BY position LIMIT $2"
        );
        let rows: Vec<CommittedRow> = sqlx::query_as(&sql)
            .bind(after)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database_error(&e))?;
        Ok(rows
            .into_iter()
            .map(|row| CommittedEvent {
                position: row.position,
                event: row.event.into(),
            })
            .collect())
    }
}
