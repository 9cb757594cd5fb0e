use actix_web::web;
use std::sync::{Mutex, MutexGuard};
use crate::core::errors::ApiError;
use crate::core::storage::Storage;
use crate::{posts, static_server, users};

/// The single store, shared by every worker.
pub type AppStorage = web::Data<Mutex<Storage>>;

pub fn lock(storage: &AppStorage) -> Result<MutexGuard<'_, Storage>, ApiError> {
    storage
        .lock()
        .map_err(|_| ApiError::InternalError("storage lock poisoned".to_string()))
}

/// Register every route on an actix `App`.
///
/// Fixed paths such as `/users/create` come before `/users/{id}` so they are
/// matched first.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::index))
        .route("/static/{path:.*}", web::get().to(static_server::serve_static))
        .route("/users", web::get().to(users::list_users))
        .service(
            web::resource("/users/create")
                .route(web::get().to(users::create_user_form))
                .route(web::post().to(users::create_user)),
        )
        .route("/users/{id}", web::get().to(users::view_user))
        .service(
            web::resource("/users/{id}/edit")
                .route(web::get().to(users::edit_user_form))
                .route(web::post().to(users::edit_user)),
        )
        .route("/users/{id}/delete", web::post().to(users::delete_user))
        .service(
            web::resource("/posts/create")
                .route(web::get().to(posts::create_post_form))
                .route(web::post().to(posts::create_post)),
        )
        .route("/posts/{id}", web::get().to(posts::view_post))
        .service(
            web::resource("/posts/{id}/edit")
                .route(web::get().to(posts::edit_post_form))
                .route(web::post().to(posts::edit_post)),
        )
        .route("/posts/{id}/delete", web::post().to(posts::delete_post));
}
