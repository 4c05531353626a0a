use crate::error::{ApiError, USER_NOT_FOUND};
use crate::extract::{path_id, JsonBody};
use crate::handlers::events::{find_event, EventResponse};
use crate::handlers::movies::{find_movie, MovieResponse};
use crate::schemas::AppState;
use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::{event::EventRole, user, user_movie::MovieListKind};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating a new user
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    /// Stored as given
    pub password: Option<String>,
}

/// Request body for changing a username
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct EditUsernameRequest {
    pub username: Option<String>,
}

/// Request body for changing a password
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct EditPasswordRequest {
    pub password: Option<String>,
}

/// Request body for putting a movie on one of a user's lists
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddMovieRequest {
    pub movie_id: Option<i32>,
    /// Either "watched" or "interested"
    pub movie_type: Option<String>,
}

/// Request body for linking a user to an event
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddEventRequest {
    pub event_id: Option<i32>,
    /// Either "host" or "interested"
    pub event_type: Option<String>,
}

/// User response model. The password is never included.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub movies_watched: Vec<MovieResponse>,
    pub movies_interested: Vec<MovieResponse>,
    pub events_hosted: Vec<EventResponse>,
    pub events_interested: Vec<EventResponse>,
}

impl UserResponse {
    /// Serialize a user together with its four collections.
    pub async fn load<C: ConnectionTrait>(db: &C, model: user::Model) -> Result<Self, DbErr> {
        let movies_watched = model.movies(db, MovieListKind::Watched).await?;
        let movies_interested = model.movies(db, MovieListKind::Interested).await?;
        let events_hosted = model.hosted_events(db).await?;
        let events_interested = model.interested_events(db).await?;

        Ok(Self {
            id: model.id,
            username: model.username,
            movies_watched: movies_watched.into_iter().map(MovieResponse::from).collect(),
            movies_interested: movies_interested.into_iter().map(MovieResponse::from).collect(),
            events_hosted: events_hosted.into_iter().map(EventResponse::from).collect(),
            events_interested: events_interested.into_iter().map(EventResponse::from).collect(),
        })
    }
}

/// All users
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
}

/// Single-field user edits
#[derive(Debug, Clone, Copy)]
enum UserField {
    Username,
    Password,
}

/// Look up a user or fail with "User not found".
pub(crate) async fn find_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<user::Model, ApiError> {
    user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            warn!("User with ID {} not found", user_id);
            ApiError::NotFound(USER_NOT_FOUND)
        })
}

/// Get all users
#[utoipa::path(
    get,
    path = "/api/users/",
    tag = "users",
    responses(
        (status = 200, description = "Users retrieved successfully", body = UserListResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_users(State(state): State<AppState>) -> Result<Json<UserListResponse>, ApiError> {
    trace!("Entering get_users function");

    let models = user::Entity::find()
        .order_by_asc(user::Column::Id)
        .all(&state.db)
        .await?;
    debug!("Retrieved {} users from database", models.len());

    let mut users = Vec::with_capacity(models.len());
    for model in models {
        users.push(UserResponse::load(&state.db, model).await?);
    }

    Ok(Json(UserListResponse { users }))
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = path_id(path, USER_NOT_FOUND)?;
    trace!("Entering get_user function for user_id: {}", user_id);

    let user = find_user(&state.db, user_id).await?;
    Ok(Json(UserResponse::load(&state.db, user).await?))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/users/",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, description = "Username or password wasn't provided", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    trace!("Entering create_user function");

    let (Some(username), Some(password)) = (request.username, request.password) else {
        warn!("Rejected user creation without username or password");
        return Err(ApiError::InvalidBody(
            "Username or password wasn't provided".to_string(),
        ));
    };

    debug!("Creating user with username: {}", username);
    let user = user::ActiveModel {
        username: Set(username),
        password: Set(password),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!("User created successfully with ID: {}, username: {}", user.id, user.username);
    let response = UserResponse::load(&state.db, user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Change a user's username
#[utoipa::path(
    post,
    path = "/api/users/{user_id}/username/",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = EditUsernameRequest,
    responses(
        (status = 200, description = "Username updated", body = UserResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn edit_username(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<EditUsernameRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = path_id(path, USER_NOT_FOUND)?;
    let username = request.username.ok_or_else(ApiError::invalid_body)?;
    edit_user_field(&state.db, user_id, UserField::Username, username).await
}

/// Change a user's password
#[utoipa::path(
    post,
    path = "/api/users/{user_id}/password/",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = EditPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = UserResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn edit_password(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<EditPasswordRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = path_id(path, USER_NOT_FOUND)?;
    let password = request.password.ok_or_else(ApiError::invalid_body)?;
    edit_user_field(&state.db, user_id, UserField::Password, password).await
}

async fn edit_user_field(
    db: &DatabaseConnection,
    user_id: i32,
    field: UserField,
    value: String,
) -> Result<Json<UserResponse>, ApiError> {
    let user = find_user(db, user_id).await?;

    let mut active: user::ActiveModel = user.into();
    match field {
        UserField::Username => {
            debug!("Updating username to: {}", value);
            active.username = Set(value);
        }
        UserField::Password => active.password = Set(value),
    }
    let user = active.update(db).await?;

    info!("User with ID {} updated {:?}", user_id, field);
    Ok(Json(UserResponse::load(db, user).await?))
}

/// Put a movie on a user's watched or interested list
#[utoipa::path(
    post,
    path = "/api/users/{user_id}/add_movie/",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = AddMovieRequest,
    responses(
        (status = 200, description = "Movie added", body = UserResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 404, description = "User or movie not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn add_movie_to_user(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AddMovieRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = path_id(path, USER_NOT_FOUND)?;
    let movie_id = request.movie_id.ok_or_else(ApiError::invalid_body)?;
    let kind = request
        .movie_type
        .as_deref()
        .ok_or_else(ApiError::invalid_body)?
        .parse::<MovieListKind>()
        .map_err(|e| {
            warn!("{}", e);
            ApiError::invalid_body()
        })?;

    let movie = find_movie(&state.db, movie_id).await?;
    let user = find_user(&state.db, user_id).await?;

    user.add_movie(&state.db, movie.id, kind).await?;
    info!("Movie {} added to user {} as {:?}", movie.id, user_id, kind);

    Ok(Json(UserResponse::load(&state.db, user).await?))
}

/// Make a user the host of an event or mark them as interested
#[utoipa::path(
    post,
    path = "/api/user/{user_id}/add_event/",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = AddEventRequest,
    responses(
        (status = 200, description = "Event added", body = UserResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 404, description = "User or event not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn add_event_to_user(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AddEventRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = path_id(path, USER_NOT_FOUND)?;
    let event_id = request.event_id.ok_or_else(ApiError::invalid_body)?;
    let role = request
        .event_type
        .as_deref()
        .ok_or_else(ApiError::invalid_body)?
        .parse::<EventRole>()
        .map_err(|e| {
            warn!("{}", e);
            ApiError::invalid_body()
        })?;

    let event = find_event(&state.db, event_id).await?;
    let user = find_user(&state.db, user_id).await?;

    match role {
        EventRole::Host => {
            user.host_event(&state.db, event).await?;
        }
        EventRole::Interested => {
            user.add_interested_event(&state.db, event.id).await?;
        }
    }
    info!("Event {} added to user {} as {:?}", event_id, user_id, role);

    Ok(Json(UserResponse::load(&state.db, user).await?))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/users/{user_id}/",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User deleted, returns the deleted user", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_user(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = path_id(path, USER_NOT_FOUND)?;
    trace!("Entering delete_user function for user_id: {}", user_id);

    let user = find_user(&state.db, user_id).await?;

    let txn = state.db.begin().await?;
    let response = UserResponse::load(&txn, user.clone()).await?;
    let result = user.delete_with_relations(&txn).await?;
    txn.commit().await?;

    debug!("Delete operation completed. Rows affected: {}", result.rows_affected);
    info!("User with ID {} deleted successfully", user_id);
    Ok(Json(response))
}
