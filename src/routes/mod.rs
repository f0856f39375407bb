pub mod items;

use std::path::Path;

use axum::{
    Router,
    handler::HandlerWithoutStateExt,
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::error::ROUTE_NOT_FOUND;
use crate::store::ItemStore;

const WELCOME: &str = "Bienvenido a la API de Computacion!";

/// Shared request state. Cloned into every handler.
#[derive(Clone)]
pub struct AppState<S> {
    pub store: S,
}

impl<S: ItemStore> AppState<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

pub fn router<S: ItemStore>(state: AppState<S>, static_dir: &Path) -> Router {
    // Misses under /public get the same 404 as any other unknown path.
    let public = ServeDir::new(static_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found.into_service());

    Router::new()
        .route("/", get(welcome))
        .route("/computacion", get(items::list_items::<S>))
        .route("/computacion/get/{id}", get(items::get_item::<S>))
        .route("/computacion/nombre/{nombre}", get(items::find_by_name::<S>))
        .route(
            "/computacion/categoria/{categoria}",
            get(items::find_by_category::<S>),
        )
        .route("/computacion/post", post(items::create_item::<S>))
        .route("/computacion/patch/{id}", patch(items::update_price::<S>))
        .route("/computacion/delete/{id}", delete(items::delete_item::<S>))
        .nest_service("/public", public)
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn welcome() -> &'static str {
    WELCOME
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, ROUTE_NOT_FOUND)
}
