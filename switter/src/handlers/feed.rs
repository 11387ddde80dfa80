use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, Response},
    Extension, Form,
};
use serde::Deserialize;

use super::found;
use crate::{
    error::AppResult,
    middleware::CurrentUser,
    models::{FeedPage, Post},
    AppState,
};

#[derive(Template)]
#[template(path = "feed.html")]
pub struct FeedTemplate {
    pub title: String,
    pub you: String,
    pub owner: Option<String>,
    pub others: Vec<String>,
    pub posts: Vec<Post>,
}

impl From<FeedPage> for FeedTemplate {
    fn from(page: FeedPage) -> Self {
        let title = match &page.owner {
            Some(owner) => owner.clone(),
            None => "Feed".to_string(),
        };
        Self {
            title,
            you: page.you,
            owner: page.owner,
            others: page.others,
            posts: page.posts,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewPostForm {
    #[serde(default)]
    pub body: String,
}

pub async fn feed(
    State(state): State<AppState>,
    Extension(CurrentUser(viewer)): Extension<CurrentUser>,
) -> AppResult<Html<String>> {
    let page = state.feed_service.feed_page(&viewer).await?;
    Ok(Html(FeedTemplate::from(page).render()?))
}

pub async fn user_posts(
    State(state): State<AppState>,
    Extension(CurrentUser(viewer)): Extension<CurrentUser>,
    Path(username): Path<String>,
) -> AppResult<Html<String>> {
    let page = state.feed_service.user_page(&viewer, &username).await?;
    Ok(Html(FeedTemplate::from(page).render()?))
}

pub async fn new_post(
    State(state): State<AppState>,
    Extension(CurrentUser(viewer)): Extension<CurrentUser>,
    Form(form): Form<NewPostForm>,
) -> AppResult<Response> {
    state.feed_service.publish(&viewer, &form.body).await?;
    Ok(found("/auth/feed"))
}

pub async fn like(
    State(state): State<AppState>,
    Extension(CurrentUser(viewer)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    state.feed_service.like(&viewer, &id).await?;
    Ok(found("/auth/feed"))
}

pub async fn follow(
    State(state): State<AppState>,
    Extension(CurrentUser(viewer)): Extension<CurrentUser>,
    Path(target): Path<String>,
) -> AppResult<Response> {
    state.feed_service.follow(&viewer, &target).await?;
    Ok(found("/auth/feed"))
}
