use crate::error::{ApiError, EVENT_NOT_FOUND};
use crate::extract::{path_id, JsonBody};
use crate::schemas::AppState;
use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, FixedOffset};
use model::entities::event;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating an event
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateEventRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    /// RFC 3339 timestamp with offset
    pub start: Option<DateTime<FixedOffset>>,
    /// RFC 3339 timestamp with offset
    pub end: Option<DateTime<FixedOffset>>,
}

/// Event response model
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    pub id: i32,
    pub name: String,
    pub location: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub host_id: Option<i32>,
}

impl From<event::Model> for EventResponse {
    fn from(model: event::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            location: model.location,
            start: model.start,
            end: model.end,
            host_id: model.host_id,
        }
    }
}

/// All events
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventListResponse {
    pub events: Vec<EventResponse>,
}

/// Look up an event or fail with "Event not found".
pub(crate) async fn find_event(
    db: &DatabaseConnection,
    event_id: i32,
) -> Result<event::Model, ApiError> {
    event::Entity::find_by_id(event_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            warn!("Event with ID {} not found", event_id);
            ApiError::NotFound(EVENT_NOT_FOUND)
        })
}

/// Get all events
#[utoipa::path(
    get,
    path = "/api/events/",
    tag = "events",
    responses(
        (status = 200, description = "Events retrieved successfully", body = EventListResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_events(State(state): State<AppState>) -> Result<Json<EventListResponse>, ApiError> {
    trace!("Entering get_events function");

    let events = event::Entity::find()
        .order_by_asc(event::Column::Id)
        .all(&state.db)
        .await?;
    debug!("Retrieved {} events from database", events.len());

    Ok(Json(EventListResponse {
        events: events.into_iter().map(EventResponse::from).collect(),
    }))
}

/// Get a specific event by ID
#[utoipa::path(
    get,
    path = "/api/events/{event_id}/",
    tag = "events",
    params(
        ("event_id" = i32, Path, description = "Event ID"),
    ),
    responses(
        (status = 200, description = "Event retrieved successfully", body = EventResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_event(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<EventResponse>, ApiError> {
    let event_id = path_id(path, EVENT_NOT_FOUND)?;
    let event = find_event(&state.db, event_id).await?;
    Ok(Json(EventResponse::from(event)))
}

/// Create a new event from the caller's name, location and times
#[utoipa::path(
    post,
    path = "/api/events/",
    tag = "events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created successfully", body = EventResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_event(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    trace!("Entering create_event function");

    let (Some(name), Some(location), Some(start), Some(end)) =
        (request.name, request.location, request.start, request.end)
    else {
        warn!("Rejected event creation with incomplete body");
        return Err(ApiError::invalid_body());
    };

    debug!("Creating event '{}' at {} from {} to {}", name, location, start, end);
    let event = event::ActiveModel {
        name: Set(name),
        location: Set(location),
        start: Set(start),
        end: Set(end),
        host_id: Set(None),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!("Event created successfully with ID: {}", event.id);
    Ok((StatusCode::CREATED, Json(EventResponse::from(event))))
}

/// Delete an event
#[utoipa::path(
    delete,
    path = "/api/events/{event_id}/",
    tag = "events",
    params(
        ("event_id" = i32, Path, description = "Event ID"),
    ),
    responses(
        (status = 200, description = "Event deleted, returns the deleted event", body = EventResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_event(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<EventResponse>, ApiError> {
    let event_id = path_id(path, EVENT_NOT_FOUND)?;
    let event = find_event(&state.db, event_id).await?;
    let response = EventResponse::from(event.clone());

    let txn = state.db.begin().await?;
    event.delete_with_relations(&txn).await?;
    txn.commit().await?;

    info!("Event with ID {} deleted successfully", event_id);
    Ok(Json(response))
}
