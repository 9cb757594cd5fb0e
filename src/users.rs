use actix_web::{web, HttpResponse};
use crate::core::errors::ApiError;
use crate::core::form::{parse_form, required_fields};
use crate::core::helpers::{html, see_other};
use crate::handlers::{lock, AppStorage};
use crate::models::models::User;
use crate::posts::post_item;
use crate::templates::{self, escape, Context};

const USER_FIELDS: [&str; 3] = ["login", "email", "password"];

fn user_not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

pub fn user_item(user: &User) -> String {
    format!(
        r#"<li><a href="/users/{}">{}</a> <span class="meta">{}</span></li>"#,
        user.id,
        escape(&user.login),
        escape(&user.email)
    )
}

pub async fn create_user_form() -> Result<HttpResponse, ApiError> {
    Ok(html(templates::render("create_user.html", &Context::new())?))
}

pub async fn create_user(storage: AppStorage, body: web::Bytes) -> Result<HttpResponse, ApiError> {
    let fields = required_fields(&parse_form(&body), &USER_FIELDS)?;

    let user = lock(&storage)?.add_user(fields)?;
    tracing::info!(id = user.id, login = %user.login, "user created");

    Ok(see_other("/"))
}

pub async fn list_users(storage: AppStorage) -> Result<HttpResponse, ApiError> {
    let storage = lock(&storage)?;
    let items: String = storage.list_users().iter().map(user_item).collect();

    let ctx = Context::new().html("users", items);
    Ok(html(templates::render("list_users.html", &ctx)?))
}

pub async fn view_user(storage: AppStorage, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let storage = lock(&storage)?;
    let user = storage.get_user(user_id).ok_or_else(user_not_found)?;

    let posts: String = storage.posts_by_author(user_id).map(|p| post_item(p, None)).collect();

    let ctx = Context::new()
        .text("user_id", &user.id.to_string())
        .text("login", &user.login)
        .text("email", &user.email)
        .text("created_at", &user.created_at)
        .text("updated_at", &user.updated_at)
        .html("posts", posts);
    Ok(html(templates::render("view_user.html", &ctx)?))
}

pub async fn edit_user_form(storage: AppStorage, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let storage = lock(&storage)?;
    let user = storage.get_user(path.into_inner()).ok_or_else(user_not_found)?;

    let ctx = Context::new()
        .text("user_id", &user.id.to_string())
        .text("login_text", &user.login)
        .attr("login", &user.login)
        .attr("email", &user.email)
        .attr("password", &user.password);
    Ok(html(templates::render("edit_user.html", &ctx)?))
}

pub async fn edit_user(
    storage: AppStorage,
    path: web::Path<i64>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let fields = required_fields(&parse_form(&body), &USER_FIELDS)?;

    if !lock(&storage)?.update_user(user_id, fields)? {
        return Err(user_not_found());
    }

    Ok(see_other(&format!("/users/{}", user_id)))
}

pub async fn delete_user(storage: AppStorage, path: web::Path<i64>) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();

    if !lock(&storage)?.delete_user(user_id)? {
        return Err(user_not_found());
    }
    tracing::info!(id = user_id, "user deleted");

    Ok(see_other("/"))
}
