// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::identify,

        // --- Users ---
        handlers::auth::get_me,
        handlers::people::list_people,
        handlers::people::list_managers,
        handlers::people::get_person,
        handlers::people::create_person,
        handlers::people::delete_person,
        handlers::people::update_alert,
        handlers::people::report_status,
        handlers::people::update_roles,
        handlers::people::list_sites,

        // --- Moves ---
        handlers::moves::request_move,
        handlers::moves::confirm_leg,
        handlers::moves::move_permissions,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::IdentifyPayload,
            models::auth::AuthResponse,

            // --- People ---
            models::person::AlertStatus,
            models::person::ManagerRef,
            models::person::Person,
            models::person::ManagerSummary,
            models::person::CreatePersonPayload,
            models::person::UpdateRolesPayload,
            models::person::AlertPayload,
            models::person::ReportPayload,
            handlers::people::SiteOptions,

            // --- Moves ---
            models::transaction::TransactionStatus,
            models::transaction::Leg,
            models::transaction::Transaction,
            services::authorizer::MovePermissions,
            handlers::moves::RequestMovePayload,
            handlers::moves::ConfirmLegPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Identificação e Token"),
        (name = "Users", description = "Diretório de Pessoas, Alertas, Relatos e Cargos"),
        (name = "Moves", description = "Transferências entre Sites (Origem/Destino)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
