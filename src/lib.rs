//! Backend de rastreamento de site/status: diretório de pessoas, alertas,
//! relatos, cargos e transferências entre sites com confirmação dos dois lados.

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

/// Monta o router principal com todas as rotas.
pub fn build_router(app_state: AppState) -> Router {
    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new().route("/identify", post(handlers::auth::identify));

    // Define as rotas de pessoas (protegidas pelo middleware)
    let user_routes = Router::new()
        .route(
            "/",
            get(handlers::people::list_people).post(handlers::people::create_person),
        )
        .route("/me", get(handlers::auth::get_me))
        .route("/managers", get(handlers::people::list_managers))
        .route(
            "/{id}",
            get(handlers::people::get_person).delete(handlers::people::delete_person),
        )
        .route("/{id}/alert", post(handlers::people::update_alert))
        .route("/{id}/status", axum::routing::put(handlers::people::report_status))
        .route("/{id}/roles", axum::routing::put(handlers::people::update_roles))
        .route(
            "/{id}/move",
            post(handlers::moves::request_move).patch(handlers::moves::confirm_leg),
        )
        .route("/{id}/move/permissions", get(handlers::moves::move_permissions))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let site_routes = Router::new()
        .route("/", get(handlers::people::list_sites))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/docs/openapi.json", get(|| async { Json(docs::ApiDoc::openapi()) }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/sites", site_routes)
        .with_state(app_state)
}
