pub mod feed;
pub mod health;
pub mod pages;
pub mod users;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

/// `302 Found` to `location`
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
