//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

// Importações principais
use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Catálogo, moderação e certificados
    let course_routes = Router::new()
        .route(
            "/",
            post(handlers::courses::create_course).get(handlers::courses::list_courses),
        )
        .route("/mine", get(handlers::courses::list_my_courses))
        .route(
            "/{id}",
            get(handlers::courses::get_course).delete(handlers::courses::delete_course),
        )
        .route("/{id}/lessons", post(handlers::courses::add_lesson))
        .route("/{id}/submit", post(handlers::courses::submit_course))
        .route("/{id}/approve", post(handlers::courses::approve_course))
        .route("/{id}/reject", post(handlers::courses::reject_course))
        .route("/{id}/unpublish", post(handlers::courses::unpublish_course))
        .route("/{id}/archive", post(handlers::courses::archive_course))
        .route("/{id}/certificate", post(handlers::courses::issue_certificate))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Pacotes: preço sempre derivado da composição, na mesma transação
    let bundle_routes = Router::new()
        .route(
            "/",
            post(handlers::bundles::create_bundle).get(handlers::bundles::list_bundles),
        )
        .route(
            "/{id}",
            get(handlers::bundles::get_bundle).put(handlers::bundles::update_bundle),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let order_routes = Router::new()
        .route("/", post(handlers::orders::create_order))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Callbacks do provedor de pagamento
    let payment_routes = Router::new()
        .route("/{id}/confirm", post(handlers::orders::confirm_payment))
        .route("/{id}/refund", post(handlers::orders::refund_payment))
        .route("/{id}/fail", post(handlers::orders::fail_payment))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Empresas: convites e livro-razão de assentos
    let company_routes = Router::new()
        .route("/", post(handlers::companies::create_company))
        .route("/{id}", get(handlers::companies::get_company))
        .route(
            "/{id}/invitations",
            post(handlers::companies::create_invitation),
        )
        .route(
            "/{id}/members/{user_id}",
            delete(handlers::companies::remove_member),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let invitation_routes = Router::new()
        .route("/accept", post(handlers::companies::accept_invitation))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let analytics_routes = Router::new()
        .route("/revenue", get(handlers::analytics::revenue_report))
        .route("/overview", get(handlers::analytics::overview))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/courses", course_routes)
        .nest("/api/bundles", bundle_routes)
        .nest("/api/orders", order_routes)
        .nest("/api/payments", payment_routes)
        .nest("/api/companies", company_routes)
        .nest("/api/invitations", invitation_routes)
        .nest("/api/analytics", analytics_routes)
        .merge(
            SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
