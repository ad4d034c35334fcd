//! Hearing history recorded against a stored litigation case.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::RepositoryError;

pub const EVENT_TITLE_MAX_CHARS: usize = 200;
pub const EVENT_SUMMARY_MAX_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageType {
    Filed,
    Hearing,
    Judgment,
    Appeal,
}

impl StageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageType::Filed => "filed",
            StageType::Hearing => "hearing",
            StageType::Judgment => "judgment",
            StageType::Appeal => "appeal",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "filed" => Some(Self::Filed),
            "hearing" => Some(Self::Hearing),
            "judgment" => Some(Self::Judgment),
            "appeal" => Some(Self::Appeal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimelineEvent {
    pub stage_type: StageType,
    pub event_title: String,
    pub event_date: NaiveDate,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub hearing_number: Option<i32>,
}

impl NewTimelineEvent {
    /// Trims text fields, dropping a blank summary. The title must be
    /// non-blank and a hearing number, when given, must be positive.
    pub fn validated(self) -> Result<Self, RepositoryError> {
        let event_title = self.event_title.trim().to_string();
        if event_title.is_empty() {
            return Err(RepositoryError::InvalidEvent(
                "event title must not be blank".to_string(),
            ));
        }
        if event_title.chars().count() > EVENT_TITLE_MAX_CHARS {
            return Err(RepositoryError::InvalidEvent(format!(
                "event title exceeds {EVENT_TITLE_MAX_CHARS} characters"
            )));
        }

        let summary = self
            .summary
            .map(|summary| summary.trim().to_string())
            .filter(|summary| !summary.is_empty());
        if let Some(summary) = &summary {
            if summary.chars().count() > EVENT_SUMMARY_MAX_CHARS {
                return Err(RepositoryError::InvalidEvent(format!(
                    "event summary exceeds {EVENT_SUMMARY_MAX_CHARS} characters"
                )));
            }
        }

        if let Some(number) = self.hearing_number {
            if number < 1 {
                return Err(RepositoryError::InvalidEvent(format!(
                    "hearing number must be positive, got {number}"
                )));
            }
        }

        Ok(Self {
            stage_type: self.stage_type,
            event_title,
            event_date: self.event_date,
            summary,
            hearing_number: self.hearing_number,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub id: Uuid,
    pub case_id: Uuid,
    pub stage_type: StageType,
    pub event_title: String,
    pub event_date: NaiveDate,
    pub summary: Option<String>,
    pub hearing_number: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TimelineEvent {
    pub fn new(case_id: Uuid, event: NewTimelineEvent) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            case_id,
            stage_type: event.stage_type,
            event_title: event.event_title,
            event_date: event.event_date,
            summary: event.summary,
            hearing_number: event.hearing_number,
            created_at: now,
            updated_at: now,
        }
    }
}

pub(crate) fn parse_stage(value: &str) -> Result<StageType, RepositoryError> {
    StageType::parse(value).ok_or_else(|| RepositoryError::InvalidStage(value.to_string()))
}
