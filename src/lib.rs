//! Minimal blog backend.
//!
//! Users and posts live in a [`core::storage::Storage`] that mirrors its
//! state to one JSON file; the rest of the crate is a thin actix-web layer
//! rendering embedded HTML templates over it.

pub mod config;
pub mod handlers;
pub mod posts;
pub mod static_server;
pub mod templates;
pub mod users;

pub mod core {
    pub mod errors;
    pub mod form;
    pub mod helpers;
    pub mod storage;
}

pub mod models {
    #[allow(clippy::module_inception)]
    pub mod models;
}
