//! Static pages

use askama::Template;
use axum::response::Html;

use crate::error::AppResult;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: &'static str,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub title: &'static str,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub title: &'static str,
}

pub async fn index() -> AppResult<Html<String>> {
    Ok(Html(IndexTemplate { title: "Home" }.render()?))
}

pub async fn login_page() -> AppResult<Html<String>> {
    Ok(Html(LoginTemplate { title: "Log in" }.render()?))
}

pub async fn register_page() -> AppResult<Html<String>> {
    Ok(Html(RegisterTemplate { title: "Register" }.render()?))
}
