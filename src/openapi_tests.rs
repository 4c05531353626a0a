#[cfg(test)]
mod tests {
    use crate::schemas::ApiDoc;
    use utoipa::OpenApi;

    #[test]
    fn test_openapi_schema_generation() {
        let openapi = ApiDoc::openapi();

        assert!(openapi.components.is_some());
        let components = openapi.components.as_ref().unwrap();

        for name in [
            "ErrorResponse",
            "HealthResponse",
            "UserResponse",
            "MovieResponse",
            "EventResponse",
            "AddMovieRequest",
            "AddEventRequest",
        ] {
            assert!(components.schemas.contains_key(name), "missing schema {}", name);
        }

        let json_result = serde_json::to_string(&openapi);
        assert!(json_result.is_ok());
    }

    #[test]
    fn test_error_response_schema_structure() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().unwrap();
        let error_response_schema = components.schemas.get("ErrorResponse").unwrap();

        if let utoipa::openapi::RefOr::T(utoipa::openapi::schema::Schema::Object(obj)) = error_response_schema {
            assert!(obj.properties.contains_key("error"));
            assert_eq!(obj.properties.len(), 1);
        } else {
            panic!("ErrorResponse should be an object schema");
        }
    }

    #[test]
    fn test_health_response_schema_structure() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().unwrap();
        let health_response_schema = components.schemas.get("HealthResponse").unwrap();

        if let utoipa::openapi::RefOr::T(utoipa::openapi::schema::Schema::Object(obj)) = health_response_schema {
            let properties = &obj.properties;
            assert!(properties.contains_key("status"));
            assert!(properties.contains_key("version"));
            assert!(properties.contains_key("database"));
        } else {
            panic!("HealthResponse should be an object schema");
        }
    }

    #[test]
    fn test_user_response_hides_password() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().unwrap();
        let user_schema = components.schemas.get("UserResponse").unwrap();

        if let utoipa::openapi::RefOr::T(utoipa::openapi::schema::Schema::Object(obj)) = user_schema {
            let properties = &obj.properties;
            assert!(!properties.contains_key("password"));
            for field in ["id", "username", "movies_watched", "movies_interested", "events_hosted", "events_interested"] {
                assert!(properties.contains_key(field), "missing field {}", field);
            }
        } else {
            panic!("UserResponse should be an object schema");
        }
    }

    #[test]
    fn test_all_routes_documented() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        for path in [
            "/health",
            "/api/users/",
            "/api/users/{user_id}/",
            "/api/users/{user_id}/username/",
            "/api/users/{user_id}/password/",
            "/api/users/{user_id}/add_movie/",
            "/api/user/{user_id}/add_event/",
            "/api/movies/",
            "/api/movies/{movie_id}/",
            "/api/movies/{movie_id}/rating/",
            "/api/movies/{movie_id}/description/",
            "/api/movies/{movie_id}/users/",
            "/api/events/",
            "/api/events/{event_id}/",
        ] {
            assert!(paths.contains_key(path), "undocumented path {}", path);
        }
    }
}
