//! Storage for imported litigation cases.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use casetrack_import::{CaseRecord, CaseStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::migrate::MigrateError;
use thiserror::Error;
use uuid::Uuid;

use crate::timeline::{NewTimelineEvent, TimelineEvent};

mod postgres;

pub use postgres::PostgresCaseRepository;

/// A case as persisted, with identity and ownership assigned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCase {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[serde(flatten)]
    pub record: CaseRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredCase {
    pub fn new(owner_id: Uuid, record: CaseRecord) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            record,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] MigrateError),

    #[error("invalid status value '{0}'")]
    InvalidStatus(String),

    #[error("invalid stage type '{0}'")]
    InvalidStage(String),

    #[error("invalid timeline event: {0}")]
    InvalidEvent(String),

    #[error("case {0} not found")]
    NotFound(Uuid),

    #[error("timeline event {0} not found")]
    EventNotFound(Uuid),
}

pub(crate) fn parse_status(value: &str) -> Result<CaseStatus, RepositoryError> {
    match value {
        "Active" => Ok(CaseStatus::Active),
        other => Err(RepositoryError::InvalidStatus(other.to_string())),
    }
}

#[async_trait]
pub trait CaseRepository: Send + Sync {
    /// Stores every record for `owner_id`, all or nothing.
    async fn bulk_insert(
        &self,
        owner_id: Uuid,
        records: &[CaseRecord],
    ) -> Result<Vec<StoredCase>, RepositoryError>;

    /// The owner's cases, newest first.
    async fn list_cases(&self, owner_id: Uuid) -> Result<Vec<StoredCase>, RepositoryError>;

    /// Removes the case together with its timeline.
    async fn delete_case(&self, owner_id: Uuid, id: Uuid) -> Result<(), RepositoryError>;

    async fn add_event(
        &self,
        owner_id: Uuid,
        case_id: Uuid,
        event: NewTimelineEvent,
    ) -> Result<TimelineEvent, RepositoryError>;

    /// Events of one case, earliest `event_date` first.
    async fn list_events(
        &self,
        owner_id: Uuid,
        case_id: Uuid,
    ) -> Result<Vec<TimelineEvent>, RepositoryError>;

    async fn delete_event(
        &self,
        owner_id: Uuid,
        case_id: Uuid,
        event_id: Uuid,
    ) -> Result<(), RepositoryError>;
}

/// Process-local repository used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryCaseRepository {
    cases: Mutex<Vec<StoredCase>>,
    events: Mutex<Vec<TimelineEvent>>,
}

impl MemoryCaseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.cases).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn event_count(&self) -> usize {
        lock(&self.events).len()
    }

    fn ensure_owned(&self, owner_id: Uuid, case_id: Uuid) -> Result<(), RepositoryError> {
        let owned = lock(&self.cases)
            .iter()
            .any(|case| case.id == case_id && case.owner_id == owner_id);
        if owned {
            Ok(())
        } else {
            Err(RepositoryError::NotFound(case_id))
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl CaseRepository for MemoryCaseRepository {
    async fn bulk_insert(
        &self,
        owner_id: Uuid,
        records: &[CaseRecord],
    ) -> Result<Vec<StoredCase>, RepositoryError> {
        let stored: Vec<StoredCase> = records
            .iter()
            .cloned()
            .map(|record| StoredCase::new(owner_id, record))
            .collect();
        lock(&self.cases).extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn list_cases(&self, owner_id: Uuid) -> Result<Vec<StoredCase>, RepositoryError> {
        let mut cases: Vec<StoredCase> = lock(&self.cases)
            .iter()
            .filter(|case| case.owner_id == owner_id)
            .cloned()
            .collect();
        cases.reverse();
        cases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(cases)
    }

    async fn delete_case(&self, owner_id: Uuid, id: Uuid) -> Result<(), RepositoryError> {
        let mut cases = lock(&self.cases);
        let before = cases.len();
        cases.retain(|case| !(case.id == id && case.owner_id == owner_id));
        if cases.len() == before {
            return Err(RepositoryError::NotFound(id));
        }
        lock(&self.events).retain(|event| event.case_id != id);
        Ok(())
    }

    async fn add_event(
        &self,
        owner_id: Uuid,
        case_id: Uuid,
        event: NewTimelineEvent,
    ) -> Result<TimelineEvent, RepositoryError> {
        let event = event.validated()?;
        self.ensure_owned(owner_id, case_id)?;
        let stored = TimelineEvent::new(case_id, event);
        lock(&self.events).push(stored.clone());
        Ok(stored)
    }

    async fn list_events(
        &self,
        owner_id: Uuid,
        case_id: Uuid,
    ) -> Result<Vec<TimelineEvent>, RepositoryError> {
        self.ensure_owned(owner_id, case_id)?;
        let mut events: Vec<TimelineEvent> = lock(&self.events)
            .iter()
            .filter(|event| event.case_id == case_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| {
            a.event_date
                .cmp(&b.event_date)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(events)
    }

    async fn delete_event(
        &self,
        owner_id: Uuid,
        case_id: Uuid,
        event_id: Uuid,
    ) -> Result<(), RepositoryError> {
        self.ensure_owned(owner_id, case_id)?;
        let mut events = lock(&self.events);
        let before = events.len();
        events.retain(|event| !(event.id == event_id && event.case_id == case_id));
        if events.len() == before {
            return Err(RepositoryError::EventNotFound(event_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::StageType;
    use chrono::NaiveDate;

    fn record(parties: &str) -> CaseRecord {
        CaseRecord {
            serial_number: 1,
            parties: parties.to_string(),
            forum: "High Court".to_string(),
            particulars: None,
            start_date: None,
            last_hearing_date: None,
            next_hearing_date: None,
            amount_involved: None,
            treatment_resolution: None,
            remarks: None,
            status: CaseStatus::Active,
        }
    }

    #[tokio::test]
    async fn memory_repository_scopes_cases_by_owner() {
        let repo = MemoryCaseRepository::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let stored = repo
            .bulk_insert(alice, &[record("A v. B"), record("C v. D")])
            .await
            .unwrap();
        repo.bulk_insert(bob, &[record("E v. F")]).await.unwrap();

        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|case| case.owner_id == alice));
        assert_ne!(stored[0].id, stored[1].id);
        assert_eq!(repo.list_cases(alice).await.unwrap().len(), 2);
        assert_eq!(repo.list_cases(bob).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_requires_matching_owner() {
        let repo = MemoryCaseRepository::new();
        let owner = Uuid::new_v4();
        let stored = repo.bulk_insert(owner, &[record("A v. B")]).await.unwrap();
        let id = stored[0].id;

        assert!(matches!(
            repo.delete_case(Uuid::new_v4(), id).await,
            Err(RepositoryError::NotFound(_))
        ));
        repo.delete_case(owner, id).await.unwrap();
        assert!(repo.is_empty());
    }

    fn event(stage_type: StageType, title: &str, date: (i32, u32, u32)) -> NewTimelineEvent {
        NewTimelineEvent {
            stage_type,
            event_title: title.to_string(),
            event_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            summary: None,
            hearing_number: None,
        }
    }

    #[tokio::test]
    async fn timeline_lists_events_by_date() {
        let repo = MemoryCaseRepository::new();
        let owner = Uuid::new_v4();
        let case_id = repo.bulk_insert(owner, &[record("A v. B")]).await.unwrap()[0].id;

        repo.add_event(owner, case_id, event(StageType::Hearing, "Second hearing", (2024, 9, 1)))
            .await
            .unwrap();
        repo.add_event(owner, case_id, event(StageType::Filed, "Plaint filed", (2024, 1, 15)))
            .await
            .unwrap();
        let judgment = repo
            .add_event(owner, case_id, event(StageType::Judgment, "Decree", (2024, 12, 2)))
            .await
            .unwrap();
        assert_eq!(judgment.case_id, case_id);

        let titles: Vec<String> = repo
            .list_events(owner, case_id)
            .await
            .unwrap()
            .into_iter()
            .map(|event| event.event_title)
            .collect();
        assert_eq!(titles, ["Plaint filed", "Second hearing", "Decree"]);

        repo.delete_event(owner, case_id, judgment.id).await.unwrap();
        assert_eq!(repo.list_events(owner, case_id).await.unwrap().len(), 2);
        assert!(matches!(
            repo.delete_event(owner, case_id, judgment.id).await,
            Err(RepositoryError::EventNotFound(_))
        ));
    }

    #[tokio::test]
    async fn timeline_is_scoped_to_the_case_owner() {
        let repo = MemoryCaseRepository::new();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let case_id = repo.bulk_insert(owner, &[record("A v. B")]).await.unwrap()[0].id;
        let filed = repo
            .add_event(owner, case_id, event(StageType::Filed, "Plaint filed", (2024, 1, 15)))
            .await
            .unwrap();

        assert!(matches!(
            repo.add_event(stranger, case_id, event(StageType::Appeal, "Appeal", (2025, 1, 1)))
                .await,
            Err(RepositoryError::NotFound(_))
        ));
        assert!(matches!(
            repo.list_events(stranger, case_id).await,
            Err(RepositoryError::NotFound(_))
        ));
        assert!(matches!(
            repo.delete_event(stranger, case_id, filed.id).await,
            Err(RepositoryError::NotFound(_))
        ));
        assert!(matches!(
            repo.add_event(owner, Uuid::new_v4(), event(StageType::Filed, "x", (2024, 1, 1)))
                .await,
            Err(RepositoryError::NotFound(_))
        ));
        assert_eq!(repo.event_count(), 1);
    }

    #[tokio::test]
    async fn deleting_a_case_removes_its_timeline() {
        let repo = MemoryCaseRepository::new();
        let owner = Uuid::new_v4();
        let stored = repo
            .bulk_insert(owner, &[record("A v. B"), record("C v. D")])
            .await
            .unwrap();
        for case in &stored {
            repo.add_event(owner, case.id, event(StageType::Filed, "Filed", (2024, 1, 1)))
                .await
                .unwrap();
        }

        repo.delete_case(owner, stored[0].id).await.unwrap();
        assert_eq!(repo.event_count(), 1);
        assert_eq!(repo.list_events(owner, stored[1].id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_events_are_rejected_before_storage() {
        let repo = MemoryCaseRepository::new();
        let owner = Uuid::new_v4();
        let case_id = repo.bulk_insert(owner, &[record("A v. B")]).await.unwrap()[0].id;

        assert!(matches!(
            repo.add_event(owner, case_id, event(StageType::Hearing, "  ", (2024, 1, 1)))
                .await,
            Err(RepositoryError::InvalidEvent(_))
        ));
        assert_eq!(repo.event_count(), 0);
    }

    #[test]
    fn stored_case_serializes_flat() {
        let case = StoredCase::new(Uuid::nil(), record("A v. B"));
        let json = serde_json::to_value(&case).unwrap();
        assert_eq!(json["ownerId"], Uuid::nil().to_string());
        assert_eq!(json["parties"], "A v. B");
        assert_eq!(json["status"], "Active");
    }

    #[test]
    fn status_round_trips_through_text() {
        assert_eq!(parse_status("Active").unwrap(), CaseStatus::Active);
        assert!(matches!(
            parse_status("Closed"),
            Err(RepositoryError::InvalidStatus(_))
        ));
    }
}
