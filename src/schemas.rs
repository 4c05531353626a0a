use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::handlers::{
    events::{CreateEventRequest, EventListResponse, EventResponse},
    movies::{
        CreateMovieRequest, EditDescriptionRequest, EditRatingRequest, MovieListResponse,
        MovieResponse, MovieUsersResponse, UserSummary,
    },
    users::{
        AddEventRequest, AddMovieRequest, CreateUserRequest, EditPasswordRequest,
        EditUsernameRequest, UserListResponse, UserResponse,
    },
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::users::create_user,
        crate::handlers::users::edit_username,
        crate::handlers::users::edit_password,
        crate::handlers::users::add_movie_to_user,
        crate::handlers::users::add_event_to_user,
        crate::handlers::users::delete_user,
        crate::handlers::movies::get_movies,
        crate::handlers::movies::get_movie,
        crate::handlers::movies::create_movie,
        crate::handlers::movies::edit_movie_rating,
        crate::handlers::movies::edit_movie_description,
        crate::handlers::movies::get_movie_users,
        crate::handlers::movies::delete_movie,
        crate::handlers::events::get_events,
        crate::handlers::events::get_event,
        crate::handlers::events::create_event,
        crate::handlers::events::delete_event,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            CreateUserRequest,
            EditUsernameRequest,
            EditPasswordRequest,
            AddMovieRequest,
            AddEventRequest,
            UserResponse,
            UserListResponse,
            CreateMovieRequest,
            EditRatingRequest,
            EditDescriptionRequest,
            MovieResponse,
            MovieListResponse,
            MovieUsersResponse,
            UserSummary,
            CreateEventRequest,
            EventResponse,
            EventListResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Users and their movie and event lists"),
        (name = "movies", description = "Movie catalog"),
        (name = "events", description = "Event catalog"),
    ),
    info(
        title = "Cinetrack API",
        description = "Campus movie and event tracker",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
