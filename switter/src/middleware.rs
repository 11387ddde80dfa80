use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    session::{read_cookie, SESSION_COOKIE},
    AppState,
};

/// Username of the session behind an `/auth` request
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser(pub String);

/// Gate for `/auth/*`: a request without a valid session cookie is sent to `/register`
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = read_cookie(request.headers(), SESSION_COOKIE) else {
        tracing::debug!(path = %request.uri().path(), "no session cookie");
        return Redirect::temporary("/register").into_response();
    };

    match state.auth_service.verify_session(&token) {
        Ok(username) => {
            request.extensions_mut().insert(CurrentUser(username));
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "rejected session cookie");
            Redirect::temporary("/register").into_response()
        }
    }
}
