use crate::handlers::{
    events::{create_event, delete_event, get_event, get_events},
    health::health_check,
    movies::{
        create_movie, delete_movie, edit_movie_description, edit_movie_rating, get_movie,
        get_movie_users, get_movies,
    },
    users::{
        add_event_to_user, add_movie_to_user, create_user, delete_user, edit_password,
        edit_username, get_user, get_users,
    },
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // User routes
        .route("/api/users/", get(get_users))
        .route("/api/users/", post(create_user))
        .route("/api/users/:user_id/", get(get_user))
        .route("/api/users/:user_id/", delete(delete_user))
        .route("/api/users/:user_id/username/", post(edit_username))
        .route("/api/users/:user_id/password/", post(edit_password))
        .route("/api/users/:user_id/add_movie/", post(add_movie_to_user))
        // Clients use the singular prefix for this one route
        .route("/api/user/:user_id/add_event/", post(add_event_to_user))
        .route("/api/users/:user_id/add_event/", post(add_event_to_user))
        // Movie routes
        .route("/api/movies/", get(get_movies))
        .route("/api/movies/", post(create_movie))
        .route("/api/movies/:movie_id/", get(get_movie))
        .route("/api/movies/:movie_id/", delete(delete_movie))
        .route("/api/movies/:movie_id/rating/", post(edit_movie_rating))
        .route("/api/movies/:movie_id/description/", post(edit_movie_description))
        .route("/api/movies/:movie_id/users/", get(get_movie_users))
        // Event routes
        .route("/api/events/", get(get_events))
        .route("/api/events/", post(create_event))
        .route("/api/events/:event_id/", get(get_event))
        .route("/api/events/:event_id/", delete(delete_event))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
