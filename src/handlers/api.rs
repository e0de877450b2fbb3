use axum::{
    extract::{rejection::JsonRejection, Json as ExtractJson, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::{ConflictError, ProviderError};
use crate::models::api::{
    ApiCreatedMeeting, ApiMeeting, ErrorResponse, ListMeetingsResponse, MeetingCreateRequest,
    ValidationError,
};
use crate::services::booking::{BookingCoordinator, BookingOutcome};

// AppState struct containing shared resources
pub struct AppState {
    pub coordinator: BookingCoordinator,
}

/// Failure responses of the meetings API. Every variant renders as
/// `{"message": ...}`.
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    Conflict(ConflictError),
    Provider(ProviderError),
    Internal(String),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        ApiError::Provider(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            ApiError::Conflict(conflict) => (StatusCode::CONFLICT, conflict.to_string()),
            ApiError::Provider(err) => (StatusCode::BAD_GATEWAY, err.to_string()),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// List meetings endpoint
pub async fn list_meetings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListMeetingsResponse>, ApiError> {
    info!("Received request to list meetings");

    match state.coordinator.list_meetings().await {
        Ok(meetings) => {
            info!("Successfully retrieved {} meetings", meetings.len());
            Ok(Json(ListMeetingsResponse {
                meetings: meetings.iter().map(ApiMeeting::from).collect(),
            }))
        }
        Err(err) => {
            error!("Failed to retrieve meetings: {}", err);
            Err(err.into())
        }
    }
}

// Create meeting endpoint
pub async fn create_meeting(
    State(state): State<Arc<AppState>>,
    payload: Result<ExtractJson<MeetingCreateRequest>, JsonRejection>,
) -> Result<Json<ApiCreatedMeeting>, ApiError> {
    let ExtractJson(request) = payload.map_err(|rejection| {
        warn!("Rejected malformed meeting request: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;
    info!("Received request to create meeting: {}", request.topic);

    let candidate = request.into_domain().map_err(|err| {
        warn!("Rejected invalid meeting request: {}", err);
        ApiError::from(err)
    })?;

    // Booking runs on its own task so a dropped connection cannot cancel it
    // between the overlap check and the provider write.
    let booking_state = Arc::clone(&state);
    let outcome = tokio::spawn(async move {
        booking_state.coordinator.create_meeting(candidate).await
    })
    .await
    .map_err(|err| {
        error!("Booking task failed: {}", err);
        ApiError::Internal("Booking task failed".to_string())
    })??;

    match outcome {
        BookingOutcome::Created(created) => {
            info!("Successfully created meeting {}", created.meeting.id);
            Ok(Json(ApiCreatedMeeting::from(&created)))
        }
        BookingOutcome::Conflict(conflict) => Err(ApiError::Conflict(conflict)),
    }
}
