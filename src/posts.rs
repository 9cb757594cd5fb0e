use actix_web::{web, HttpResponse};
use crate::config::UNKNOWN_AUTHOR;
use crate::core::errors::ApiError;
use crate::core::form::{parse_form, required_fields};
use crate::core::helpers::{html, see_other};
use crate::core::storage::Storage;
use crate::handlers::{lock, AppStorage};
use crate::models::models::Post;
use crate::templates::{self, escape, Context};
use crate::users::user_item;

fn post_not_found() -> ApiError {
    ApiError::NotFound("Post not found".to_string())
}

/// Author markup for a post: a link to the user, or the placeholder when
/// the author has been deleted.
fn author_link(storage: &Storage, author_id: i64) -> String {
    match storage.get_user(author_id) {
        Some(user) => format!(r#"<a href="/users/{}">{}</a>"#, user.id, escape(&user.login)),
        None => UNKNOWN_AUTHOR.to_string(),
    }
}

pub fn post_item(post: &Post, author: Option<&str>) -> String {
    let byline = author
        .map(|a| format!(r#" <span class="meta">by {}</span>"#, a))
        .unwrap_or_default();
    format!(
        r#"<li><a href="/posts/{}">{}</a>{}</li>"#,
        post.id,
        escape(&post.title),
        byline
    )
}

pub async fn index(storage: AppStorage) -> Result<HttpResponse, ApiError> {
    let storage = lock(&storage)?;

    let posts: String = storage
        .list_posts()
        .iter()
        .map(|p| post_item(p, Some(&author_link(&storage, p.author_id))))
        .collect();
    let users: String = storage.list_users().iter().map(user_item).collect();

    let ctx = Context::new().html("posts", posts).html("users", users);
    Ok(html(templates::render("index.html", &ctx)?))
}

pub async fn create_post_form(storage: AppStorage) -> Result<HttpResponse, ApiError> {
    let storage = lock(&storage)?;
    let options: String = storage
        .list_users()
        .iter()
        .map(|u| format!(r#"<option value="{}">{}</option>"#, u.id, escape(&u.login)))
        .collect();

    let ctx = Context::new().html("author_options", options);
    Ok(html(templates::render("create_post.html", &ctx)?))
}

pub async fn create_post(storage: AppStorage, body: web::Bytes) -> Result<HttpResponse, ApiError> {
    let fields = required_fields(&parse_form(&body), &["title", "content", "author_id"])?;

    let post = lock(&storage)?.add_post(fields).map_err(|e| {
        tracing::warn!(error = %e, "rejected post");
        ApiError::from(e)
    })?;
    tracing::info!(id = post.id, author_id = post.author_id, "post created");

    Ok(see_other("/"))
}

pub async fn view_post(storage: AppStorage, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let storage = lock(&storage)?;
    let post = storage.get_post(path.into_inner()).ok_or_else(post_not_found)?;

    let ctx = Context::new()
        .text("post_id", &post.id.to_string())
        .text("title", &post.title)
        .text("content", &post.content)
        .text("created_at", &post.created_at)
        .text("updated_at", &post.updated_at)
        .html("author", author_link(&storage, post.author_id));
    Ok(html(templates::render("view_post.html", &ctx)?))
}

pub async fn edit_post_form(storage: AppStorage, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let storage = lock(&storage)?;
    let post = storage.get_post(path.into_inner()).ok_or_else(post_not_found)?;

    let ctx = Context::new()
        .text("post_id", &post.id.to_string())
        .text("title_text", &post.title)
        .attr("title", &post.title)
        .text("content", &post.content);
    Ok(html(templates::render("edit_post.html", &ctx)?))
}

pub async fn edit_post(
    storage: AppStorage,
    path: web::Path<i64>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let post_id = path.into_inner();
    let fields = required_fields(&parse_form(&body), &["title", "content"])?;

    if !lock(&storage)?.update_post(post_id, fields)? {
        return Err(post_not_found());
    }

    Ok(see_other(&format!("/posts/{}", post_id)))
}

pub async fn delete_post(storage: AppStorage, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let post_id = path.into_inner();

    if !lock(&storage)?.delete_post(post_id)? {
        return Err(post_not_found());
    }
    tracing::info!(id = post_id, "post deleted");

    Ok(see_other("/"))
}
