use axum::extract::{FromRequestParts, Multipart, Path, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use casetrack_core::ingestion::{run_import, FileUpload, ImportReport};
use casetrack_core::{CoreError, NewTimelineEvent, RepositoryError, StoredCase, TimelineEvent};
use casetrack_import::ImportError;
use serde_json::json;
use uuid::Uuid;

use crate::state::AppState;

pub const OWNER_HEADER: &str = "x-user-id";

/// Identity of the caller, as resolved by the authentication layer in front
/// of this service.
#[derive(Debug, Clone, Copy)]
pub struct Owner(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for Owner {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(Owner)
            .ok_or(ApiError::Unauthorized)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    BadRequest(String),
    Core(CoreError),
    Multipart(axum::extract::multipart::MultipartError),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Core(err)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::Core(CoreError::Repository(err))
    }
}

fn import_status(err: &ImportError) -> StatusCode {
    match err {
        ImportError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        ImportError::TooManyRows { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ImportError::UnsupportedExtension { .. }
        | ImportError::TooManyFiles { .. }
        | ImportError::Parse { .. }
        | ImportError::NoValidRows { .. } => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                format!("missing or invalid {OWNER_HEADER} header"),
            ),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Multipart(err) => (err.status(), err.body_text()),
            ApiError::Core(CoreError::Import(err)) => (import_status(&err), err.to_string()),
            ApiError::Core(CoreError::Repository(
                err @ (RepositoryError::NotFound(_) | RepositoryError::EventNotFound(_)),
            )) => (StatusCode::NOT_FOUND, err.to_string()),
            ApiError::Core(CoreError::Repository(err @ RepositoryError::InvalidEvent(_))) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::Core(err) => {
                tracing::error!("request failed: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub async fn import_cases(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    mut multipart: Multipart,
) -> Result<Json<ImportReport>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(ApiError::Multipart)? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::BadRequest("file field has no file name".to_string()))?;
        let contents = field.bytes().await.map_err(ApiError::Multipart)?;

        let report = run_import(
            FileUpload {
                file_name: &file_name,
                contents: &contents,
            },
            owner_id,
            state.repository.as_ref(),
            &state.parse_options,
        )
        .await?;
        return Ok(Json(report));
    }

    Err(ApiError::BadRequest(
        "multipart body has no 'file' field".to_string(),
    ))
}

pub async fn list_cases(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
) -> Result<Json<Vec<StoredCase>>, ApiError> {
    let cases = state.repository.list_cases(owner_id).await?;
    Ok(Json(cases))
}

pub async fn delete_case(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.repository.delete_case(owner_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_event(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    Path(case_id): Path<Uuid>,
    Json(event): Json<NewTimelineEvent>,
) -> Result<(StatusCode, Json<TimelineEvent>), ApiError> {
    let event = state
        .repository
        .add_event(owner_id, case_id, event)
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn list_events(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    Path(case_id): Path<Uuid>,
) -> Result<Json<Vec<TimelineEvent>>, ApiError> {
    let events = state.repository.list_events(owner_id, case_id).await?;
    Ok(Json(events))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    Path((case_id, event_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state
        .repository
        .delete_event(owner_id, case_id, event_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
