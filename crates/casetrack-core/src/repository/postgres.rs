use async_trait::async_trait;
use casetrack_import::CaseRecord;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use super::{parse_status, CaseRepository, RepositoryError, StoredCase};
use crate::timeline::{parse_stage, NewTimelineEvent, TimelineEvent};

#[derive(Clone)]
pub struct PostgresCaseRepository {
    pool: PgPool,
}

impl PostgresCaseRepository {
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
    ) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn ensure_owned(&self, owner_id: Uuid, case_id: Uuid) -> Result<(), RepositoryError> {
        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM litigation_cases WHERE id = $1 AND user_id = $2)",
        )
        .bind(case_id)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        if owned {
            Ok(())
        } else {
            Err(RepositoryError::NotFound(case_id))
        }
    }
}

fn timeline_event_from_row(row: &PgRow) -> Result<TimelineEvent, RepositoryError> {
    let stage_type: String = row.try_get("stage_type")?;
    Ok(TimelineEvent {
        id: row.try_get("id")?,
        case_id: row.try_get("case_id")?,
        stage_type: parse_stage(&stage_type)?,
        event_title: row.try_get("event_title")?,
        event_date: row.try_get("event_date")?,
        summary: row.try_get("summary")?,
        hearing_number: row.try_get("hearing_number")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn stored_case_from_row(row: &PgRow) -> Result<StoredCase, RepositoryError> {
    let status: String = row.try_get("status")?;
    Ok(StoredCase {
        id: row.try_get("id")?,
        owner_id: row.try_get("user_id")?,
        record: CaseRecord {
            serial_number: row.try_get::<Option<i32>, _>("sr_no")?.unwrap_or_default(),
            parties: row.try_get("parties")?,
            forum: row.try_get("forum")?,
            particulars: row.try_get("particular")?,
            start_date: row.try_get("start_date")?,
            last_hearing_date: row.try_get("last_hearing_date")?,
            next_hearing_date: row.try_get("next_hearing_date")?,
            amount_involved: row.try_get("amount_involved")?,
            treatment_resolution: row.try_get("treatment_resolution")?,
            remarks: row.try_get("remarks")?,
            status: parse_status(&status)?,
        },
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl CaseRepository for PostgresCaseRepository {
    async fn bulk_insert(
        &self,
        owner_id: Uuid,
        records: &[CaseRecord],
    ) -> Result<Vec<StoredCase>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(records.len());

        for record in records {
            let case = StoredCase::new(owner_id, record.clone());
            sqlx::query(
                r#"
                INSERT INTO litigation_cases (
                    id,
                    user_id,
                    sr_no,
                    parties,
                    forum,
                    particular,
                    start_date,
                    last_hearing_date,
                    next_hearing_date,
                    amount_involved,
                    treatment_resolution,
                    remarks,
                    status,
                    created_at,
                    updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
                "#,
            )
            .bind(case.id)
            .bind(case.owner_id)
            .bind(case.record.serial_number)
            .bind(&case.record.parties)
            .bind(&case.record.forum)
            .bind(&case.record.particulars)
            .bind(case.record.start_date)
            .bind(case.record.last_hearing_date)
            .bind(case.record.next_hearing_date)
            .bind(case.record.amount_involved)
            .bind(&case.record.treatment_resolution)
            .bind(&case.record.remarks)
            .bind(case.record.status.as_str())
            .bind(case.created_at)
            .bind(case.updated_at)
            .execute(&mut *tx)
            .await?;
            stored.push(case);
        }

        tx.commit().await?;
        info!(owner = %owner_id, inserted = stored.len(), "stored litigation cases");
        Ok(stored)
    }

    async fn list_cases(&self, owner_id: Uuid) -> Result<Vec<StoredCase>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT
                id,
                user_id,
                sr_no,
                parties,
                forum,
                particular,
                start_date,
                last_hearing_date,
                next_hearing_date,
                amount_involved,
                treatment_resolution,
                remarks,
                status,
                created_at,
                updated_at
            FROM litigation_cases
            WHERE user_id = $1
            ORDER BY created_at DESC, sr_no DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(stored_case_from_row).collect()
    }

    async fn delete_case(&self, owner_id: Uuid, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM litigation_cases WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }

        Ok(())
    }

    async fn add_event(
        &self,
        owner_id: Uuid,
        case_id: Uuid,
        event: NewTimelineEvent,
    ) -> Result<TimelineEvent, RepositoryError> {
        let event = TimelineEvent::new(case_id, event.validated()?);
        let result = sqlx::query(
            r#"
            INSERT INTO litigation_timeline_events (
                id,
                case_id,
                stage_type,
                event_title,
                event_date,
                summary,
                hearing_number,
                created_at,
                updated_at
            )
            SELECT $1, c.id, $3, $4, $5, $6, $7, $8, $9
            FROM litigation_cases c
            WHERE c.id = $2 AND c.user_id = $10
            "#,
        )
        .bind(event.id)
        .bind(case_id)
        .bind(event.stage_type.as_str())
        .bind(&event.event_title)
        .bind(event.event_date)
        .bind(&event.summary)
        .bind(event.hearing_number)
        .bind(event.created_at)
        .bind(event.updated_at)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(case_id));
        }

        info!(
            case = %case_id,
            event = %event.id,
            stage = event.stage_type.as_str(),
            "added timeline event"
        );
        Ok(event)
    }

    async fn list_events(
        &self,
        owner_id: Uuid,
        case_id: Uuid,
    ) -> Result<Vec<TimelineEvent>, RepositoryError> {
        self.ensure_owned(owner_id, case_id).await?;

        let rows = sqlx::query(
            r#"
            SELECT
                id,
                case_id,
                stage_type,
                event_title,
                event_date,
                summary,
                hearing_number,
                created_at,
                updated_at
            FROM litigation_timeline_events
            WHERE case_id = $1
            ORDER BY event_date ASC, created_at ASC
            "#,
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(timeline_event_from_row).collect()
    }

    async fn delete_event(
        &self,
        owner_id: Uuid,
        case_id: Uuid,
        event_id: Uuid,
    ) -> Result<(), RepositoryError> {
        self.ensure_owned(owner_id, case_id).await?;

        let result =
            sqlx::query("DELETE FROM litigation_timeline_events WHERE id = $1 AND case_id = $2")
                .bind(event_id)
                .bind(case_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::EventNotFound(event_id));
        }

        Ok(())
    }
}
