use crate::error::{ApiError, MOVIE_NOT_FOUND};
use crate::extract::{path_id, JsonBody};
use crate::schemas::AppState;
use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use model::entities::{movie, user, user_movie::MovieListKind};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating a movie
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateMovieRequest {
    pub name: Option<String>,
    /// Number between 0 and 5 inclusive
    #[schema(value_type = Option<f64>)]
    pub rating: Option<Value>,
    pub description: Option<String>,
}

/// Request body for changing a movie's rating
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct EditRatingRequest {
    /// Number between 0 and 5 inclusive
    #[schema(value_type = Option<f64>)]
    pub rating: Option<Value>,
}

/// Request body for changing a movie's description
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct EditDescriptionRequest {
    pub description: Option<String>,
}

/// Movie response model
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MovieResponse {
    pub id: i32,
    pub name: String,
    #[serde(serialize_with = "serialize_rating")]
    pub rating: f64,
    pub description: String,
}

impl From<movie::Model> for MovieResponse {
    fn from(model: movie::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            rating: model.rating,
            description: model.description,
        }
    }
}

/// Whole ratings are written as integers: `4`, not `4.0`.
fn serialize_rating<S: Serializer>(rating: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if rating.fract() == 0.0 {
        serializer.serialize_i64(*rating as i64)
    } else {
        serializer.serialize_f64(*rating)
    }
}

/// All movies
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MovieListResponse {
    pub movies: Vec<MovieResponse>,
}

/// A user as listed on a movie
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
}

impl From<user::Model> for UserSummary {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
        }
    }
}

/// Users that have a movie on their lists
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MovieUsersResponse {
    pub watched: Vec<UserSummary>,
    pub interested: Vec<UserSummary>,
}

/// True iff `rating` is a JSON number between 0 and 5 inclusive.
/// Numeric strings such as `"3"` are not ratings.
pub fn valid_rating(rating: &Value) -> bool {
    rating.as_f64().is_some_and(movie::rating_in_range)
}

fn rating_from(rating: Option<Value>) -> Option<f64> {
    rating.filter(valid_rating).and_then(|value| value.as_f64())
}

/// Look up a movie or fail with "Movie not found".
pub(crate) async fn find_movie(
    db: &DatabaseConnection,
    movie_id: i32,
) -> Result<movie::Model, ApiError> {
    movie::Entity::find_by_id(movie_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            warn!("Movie with ID {} not found", movie_id);
            ApiError::NotFound(MOVIE_NOT_FOUND)
        })
}

/// Get all movies
#[utoipa::path(
    get,
    path = "/api/movies/",
    tag = "movies",
    responses(
        (status = 200, description = "Movies retrieved successfully", body = MovieListResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_movies(State(state): State<AppState>) -> Result<Json<MovieListResponse>, ApiError> {
    trace!("Entering get_movies function");

    let movies = movie::Entity::find()
        .order_by_asc(movie::Column::Id)
        .all(&state.db)
        .await?;
    debug!("Retrieved {} movies from database", movies.len());

    Ok(Json(MovieListResponse {
        movies: movies.into_iter().map(MovieResponse::from).collect(),
    }))
}

/// Get a specific movie by ID
#[utoipa::path(
    get,
    path = "/api/movies/{movie_id}/",
    tag = "movies",
    params(
        ("movie_id" = i32, Path, description = "Movie ID"),
    ),
    responses(
        (status = 200, description = "Movie retrieved successfully", body = MovieResponse),
        (status = 404, description = "Movie not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_movie(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<MovieResponse>, ApiError> {
    let movie_id = path_id(path, MOVIE_NOT_FOUND)?;
    trace!("Entering get_movie function for movie_id: {}", movie_id);

    let movie = find_movie(&state.db, movie_id).await?;
    Ok(Json(MovieResponse::from(movie)))
}

/// Create a new movie
#[utoipa::path(
    post,
    path = "/api/movies/",
    tag = "movies",
    request_body = CreateMovieRequest,
    responses(
        (status = 201, description = "Movie created successfully", body = MovieResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_movie(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateMovieRequest>,
) -> Result<(StatusCode, Json<MovieResponse>), ApiError> {
    trace!("Entering create_movie function");

    let (Some(name), Some(rating), Some(description)) =
        (request.name, rating_from(request.rating), request.description)
    else {
        warn!("Rejected movie creation with incomplete or invalid body");
        return Err(ApiError::invalid_body());
    };

    debug!("Creating movie '{}' rated {}", name, rating);
    let movie = movie::ActiveModel {
        name: Set(name),
        rating: Set(rating),
        description: Set(description),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!("Movie created successfully with ID: {}", movie.id);
    Ok((StatusCode::CREATED, Json(MovieResponse::from(movie))))
}

/// Change a movie's rating
#[utoipa::path(
    post,
    path = "/api/movies/{movie_id}/rating/",
    tag = "movies",
    params(
        ("movie_id" = i32, Path, description = "Movie ID"),
    ),
    request_body = EditRatingRequest,
    responses(
        (status = 201, description = "Rating updated", body = MovieResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 404, description = "Movie not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn edit_movie_rating(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<EditRatingRequest>,
) -> Result<(StatusCode, Json<MovieResponse>), ApiError> {
    let movie_id = path_id(path, MOVIE_NOT_FOUND)?;
    trace!("Entering edit_movie_rating function for movie_id: {}", movie_id);
    let rating = rating_from(request.rating).ok_or_else(ApiError::invalid_body)?;

    let movie = find_movie(&state.db, movie_id).await?;
    let mut active: movie::ActiveModel = movie.into();
    active.rating = Set(rating);
    let movie = active.update(&state.db).await?;

    info!("Movie with ID {} rated {}", movie_id, rating);
    Ok((StatusCode::CREATED, Json(MovieResponse::from(movie))))
}

/// Change a movie's description
#[utoipa::path(
    post,
    path = "/api/movies/{movie_id}/description/",
    tag = "movies",
    params(
        ("movie_id" = i32, Path, description = "Movie ID"),
    ),
    request_body = EditDescriptionRequest,
    responses(
        (status = 201, description = "Description updated", body = MovieResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 404, description = "Movie not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn edit_movie_description(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<EditDescriptionRequest>,
) -> Result<(StatusCode, Json<MovieResponse>), ApiError> {
    let movie_id = path_id(path, MOVIE_NOT_FOUND)?;
    trace!("Entering edit_movie_description function for movie_id: {}", movie_id);
    let description = request.description.ok_or_else(ApiError::invalid_body)?;

    let movie = find_movie(&state.db, movie_id).await?;
    let mut active: movie::ActiveModel = movie.into();
    active.description = Set(description);
    let movie = active.update(&state.db).await?;

    info!("Movie with ID {} description updated", movie_id);
    Ok((StatusCode::CREATED, Json(MovieResponse::from(movie))))
}

/// List the users that watched or want to watch a movie
#[utoipa::path(
    get,
    path = "/api/movies/{movie_id}/users/",
    tag = "movies",
    params(
        ("movie_id" = i32, Path, description = "Movie ID"),
    ),
    responses(
        (status = 200, description = "Users retrieved successfully", body = MovieUsersResponse),
        (status = 404, description = "Movie not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_movie_users(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<MovieUsersResponse>, ApiError> {
    let movie_id = path_id(path, MOVIE_NOT_FOUND)?;
    let movie = find_movie(&state.db, movie_id).await?;

    let watched = movie.users(&state.db, MovieListKind::Watched).await?;
    let interested = movie.users(&state.db, MovieListKind::Interested).await?;

    Ok(Json(MovieUsersResponse {
        watched: watched.into_iter().map(UserSummary::from).collect(),
        interested: interested.into_iter().map(UserSummary::from).collect(),
    }))
}

/// Delete a movie
#[utoipa::path(
    delete,
    path = "/api/movies/{movie_id}/",
    tag = "movies",
    params(
        ("movie_id" = i32, Path, description = "Movie ID"),
    ),
    responses(
        (status = 200, description = "Movie deleted, returns the deleted movie", body = MovieResponse),
        (status = 404, description = "Movie not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_movie(
    path: Result<Path<i32>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<MovieResponse>, ApiError> {
    let movie_id = path_id(path, MOVIE_NOT_FOUND)?;
    trace!("Entering delete_movie function for movie_id: {}", movie_id);

    let movie = find_movie(&state.db, movie_id).await?;
    let response = MovieResponse::from(movie.clone());

    let txn = state.db.begin().await?;
    movie.delete_with_relations(&txn).await?;
    txn.commit().await?;

    info!("Movie with ID {} deleted successfully", movie_id);
    Ok(Json(response))
}
