use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use super::found;
use crate::{
    error::AppResult,
    models::NewUser,
    session::{clear_session_cookie, session_cookie},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Form(user): Form<NewUser>,
) -> AppResult<Redirect> {
    state.auth_service.register(user).await?;
    Ok(Redirect::to("/login"))
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let token = state
        .auth_service
        .login(&form.username, &form.password)
        .await?;
    let cookie = session_cookie(&token, state.auth_service.session_ttl());

    Ok(([(header::SET_COOKIE, cookie)], found("/auth/feed")).into_response())
}

pub async fn logout() -> Response {
    ([(header::SET_COOKIE, clear_session_cookie())], found("/")).into_response()
}
