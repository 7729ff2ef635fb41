//src/main.rs

use anyhow::Context;
use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG manda; sem ele, "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let app_state = AppState::new(config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados.")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    if let (Some(email), Some(password)) = (&app_state.config.admin_email, &app_state.config.admin_password) {
        app_state
            .team_service
            .bootstrap_admin(email, password)
            .await
            .context("Falha ao criar o administrador inicial")?;
    }

    let listener = TcpListener::bind(&app_state.config.bind_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", app_state.config.bind_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    let app = app_router(app_state);
    axum::serve(listener, app).await.context("Erro no servidor Axum")?;

    Ok(())
}

fn app_router(app_state: AppState) -> Router {
    // Rotas públicas
    let public_routes = Router::new().route("/auth/login", post(handlers::auth::login));

    let auth_routes = Router::new()
        .route("/auth/me", get(handlers::auth::get_me))
        .route("/auth/password", put(handlers::auth::change_password));

    let team_routes = Router::new()
        .route(
            "/team",
            post(handlers::team::create_member).get(handlers::team::list_members),
        )
        .route(
            "/team/{id}",
            get(handlers::team::get_member).patch(handlers::team::update_member),
        )
        .route("/permissions", get(handlers::team::list_permissions));

    let contact_routes = Router::new()
        .route(
            "/contacts",
            post(handlers::contacts::create_contact).get(handlers::contacts::list_contacts),
        )
        .route(
            "/contacts/{id}",
            get(handlers::contacts::get_contact)
                .patch(handlers::contacts::update_contact)
                .delete(handlers::contacts::delete_contact),
        );

    let lead_routes = Router::new()
        .route(
            "/leads",
            post(handlers::leads::create_lead).get(handlers::leads::list_leads),
        )
        .route(
            "/leads/{id}",
            get(handlers::leads::get_lead)
                .patch(handlers::leads::update_lead)
                .delete(handlers::leads::delete_lead),
        )
        .route("/leads/{id}/status", post(handlers::leads::change_lead_status))
        .route("/leads/{id}/assign", post(handlers::leads::assign_lead))
        // Captações
        .route(
            "/seller-leads",
            post(handlers::leads::create_seller_lead).get(handlers::leads::list_seller_leads),
        )
        .route(
            "/seller-leads/{id}",
            get(handlers::leads::get_seller_lead)
                .patch(handlers::leads::update_seller_lead)
                .delete(handlers::leads::delete_seller_lead),
        )
        .route("/seller-leads/{id}/status", post(handlers::leads::change_seller_lead_status))
        .route("/seller-leads/{id}/convert", post(handlers::leads::convert_seller_lead));

    let property_routes = Router::new()
        .route(
            "/buildings",
            post(handlers::properties::create_building).get(handlers::properties::list_buildings),
        )
        .route(
            "/buildings/{id}",
            get(handlers::properties::get_building)
                .put(handlers::properties::update_building)
                .delete(handlers::properties::delete_building),
        )
        .route(
            "/buildings/{id}/units",
            post(handlers::properties::create_unit).get(handlers::properties::list_units),
        )
        .route(
            "/units/{id}",
            get(handlers::properties::get_unit)
                .patch(handlers::properties::update_unit)
                .delete(handlers::properties::delete_unit),
        );

    let listing_routes = Router::new()
        .route(
            "/listings",
            post(handlers::listings::create_listing).get(handlers::listings::list_listings),
        )
        .route(
            "/listings/{id}",
            get(handlers::listings::get_listing)
                .patch(handlers::listings::update_listing)
                .delete(handlers::listings::delete_listing),
        )
        .route("/listings/{id}/submit", post(handlers::listings::submit_listing))
        .route("/listings/{id}/approve", post(handlers::listings::approve_listing))
        .route("/listings/{id}/reject", post(handlers::listings::reject_listing))
        .route("/listings/{id}/status", post(handlers::listings::change_listing_status))
        .route("/listings/{id}/brochure", get(handlers::documents::listing_brochure))
        .route(
            "/listings/{id}/media",
            post(handlers::listings::add_media).get(handlers::listings::list_media),
        )
        .route("/listings/{id}/media/{media_id}", delete(handlers::listings::delete_media))
        .route("/listings/{id}/media/{media_id}/cover", post(handlers::listings::set_cover));

    let visit_routes = Router::new()
        .route(
            "/visits",
            post(handlers::visits::schedule_visit).get(handlers::visits::list_visits),
        )
        .route("/visits/{id}", get(handlers::visits::get_visit))
        .route("/visits/{id}/confirm", post(handlers::visits::confirm_visit))
        .route("/visits/{id}/resend-otp", post(handlers::visits::resend_otp))
        .route("/visits/{id}/reschedule", post(handlers::visits::reschedule_visit))
        .route("/visits/{id}/cancel", post(handlers::visits::cancel_visit))
        .route("/visits/{id}/complete", post(handlers::visits::complete_visit))
        // Roteiros
        .route(
            "/tours",
            post(handlers::visits::create_tour).get(handlers::visits::list_tours),
        )
        .route("/tours/{id}", get(handlers::visits::get_tour))
        .route("/tours/{id}/status", post(handlers::visits::change_tour_status))
        .route("/tours/{id}/visits", post(handlers::visits::attach_visit))
        .route("/tours/{id}/visits/{visit_id}", delete(handlers::visits::detach_visit));

    let offer_routes = Router::new()
        .route(
            "/offers",
            post(handlers::offers::create_offer).get(handlers::offers::list_offers),
        )
        .route("/offers/{id}", get(handlers::offers::get_offer))
        .route("/offers/{id}/counter", post(handlers::offers::counter_offer))
        .route("/offers/{id}/revise", post(handlers::offers::revise_offer))
        .route("/offers/{id}/accept", post(handlers::offers::accept_offer))
        .route("/offers/{id}/reject", post(handlers::offers::reject_offer))
        .route("/offers/{id}/withdraw", post(handlers::offers::withdraw_offer));

    let activity_routes = Router::new()
        .route(
            "/notes",
            post(handlers::activity::create_note).get(handlers::activity::list_notes),
        )
        .route(
            "/notes/{id}",
            axum::routing::patch(handlers::activity::update_note).delete(handlers::activity::delete_note),
        )
        .route(
            "/communications",
            post(handlers::activity::log_communication).get(handlers::activity::list_communications),
        )
        .route(
            "/tasks",
            post(handlers::activity::create_task).get(handlers::activity::list_tasks),
        )
        .route(
            "/tasks/{id}",
            get(handlers::activity::get_task)
                .patch(handlers::activity::update_task)
                .delete(handlers::activity::delete_task),
        )
        .route("/tasks/{id}/status", post(handlers::activity::change_task_status));

    let notification_routes = Router::new()
        .route("/notifications", get(handlers::notifications::list_notifications))
        .route("/notifications/unread-count", get(handlers::notifications::unread_count))
        .route("/notifications/read-all", post(handlers::notifications::mark_all_read))
        .route("/notifications/{id}/read", post(handlers::notifications::mark_read));

    let coin_routes = Router::new()
        .route("/coins/ledger", get(handlers::coins::my_ledger))
        .route("/coins/balance", get(handlers::coins::my_balance))
        .route("/coins/leaderboard", get(handlers::coins::leaderboard))
        .route("/coins/adjust", post(handlers::coins::adjust))
        .route(
            "/coins/rules",
            get(handlers::coins::list_rules).put(handlers::coins::upsert_rule),
        )
        .route("/coins/members/{id}/ledger", get(handlers::coins::member_ledger));

    let automation_routes = Router::new()
        .route(
            "/automations",
            post(handlers::automations::create_automation).get(handlers::automations::list_automations),
        )
        .route(
            "/automations/{id}",
            get(handlers::automations::get_automation)
                .patch(handlers::automations::update_automation)
                .delete(handlers::automations::delete_automation),
        );

    // Tudo abaixo exige Authorization: Bearer
    let protected_routes = Router::new()
        .merge(auth_routes)
        .merge(team_routes)
        .merge(contact_routes)
        .merge(lead_routes)
        .merge(property_routes)
        .merge(listing_routes)
        .merge(visit_routes)
        .merge(offer_routes)
        .merge(activity_routes)
        .merge(notification_routes)
        .merge(coin_routes)
        .merge(automation_routes)
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/v1", public_routes.merge(protected_routes))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::services::notification_service::LogChannel;

    // Pool preguiçoso: nenhuma destas rotas chega ao banco
    fn test_app() -> Router {
        let config = Config::for_tests();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("url válida");
        app_router(AppState::build(pool, config, Arc::new(LogChannel)))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = test_app()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_route_without_token_is_unauthorized() {
        let response = test_app()
            .oneshot(Request::builder().uri("/api/v1/leads").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn garbage_token_is_rejected_in_requested_language() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/dashboard")
                    .header(header::AUTHORIZATION, "Bearer nao-e-um-jwt")
                    .header(header::ACCEPT_LANGUAGE, "pt-BR")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Token de autenticação inválido ou ausente.");
    }

    #[tokio::test]
    async fn login_validates_payload_before_touching_the_database() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"email":"nao-e-email","password":"123"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["details"]["email"].is_array());
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let response = test_app()
            .oneshot(Request::builder().uri("/api-docs/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["paths"]["/api/v1/visits/{id}/complete"].is_object());
    }
}
