// src/app.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn criar_router(app_state: AppState) -> Router {
    // Rotas públicas
    let publicas = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/auth/login", post(handlers::auth::login));

    // Tudo o resto exige o Bearer token; o nível de acesso é checado em cada handler
    let protegidas = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .route(
            "/api/orgaos",
            get(handlers::orgaos::listar_orgaos).post(handlers::orgaos::criar_orgao),
        )
        .route(
            "/api/orgaos/{id}",
            get(handlers::orgaos::obter_orgao).patch(handlers::orgaos::atualizar_orgao),
        )
        .route(
            "/api/usuarios",
            get(handlers::usuarios::listar_usuarios).post(handlers::usuarios::criar_usuario),
        )
        .route(
            "/api/usuarios/{id}",
            get(handlers::usuarios::obter_usuario).patch(handlers::usuarios::atualizar_usuario),
        )
        .route(
            "/api/tipos-servicos",
            get(handlers::tipos_servicos::listar_tipos_servicos)
                .post(handlers::tipos_servicos::criar_tipo_servico),
        )
        .route(
            "/api/tipos-servicos/categorias",
            get(handlers::tipos_servicos::listar_categorias),
        )
        .route(
            "/api/tipos-servicos/{id}",
            get(handlers::tipos_servicos::obter_tipo_servico)
                .patch(handlers::tipos_servicos::atualizar_tipo_servico),
        )
        .route(
            "/api/receitas",
            get(handlers::receitas::listar_receitas).post(handlers::receitas::criar_receita),
        )
        .route("/api/receitas/totais", get(handlers::receitas::obter_totais))
        .route(
            "/api/receitas/{id}",
            get(handlers::receitas::obter_receita).patch(handlers::receitas::atualizar_receita),
        )
        .route(
            "/api/relatorios",
            get(handlers::relatorios::listar_relatorios).post(handlers::relatorios::gerar_relatorio),
        )
        .route(
            "/api/relatorios/{id}",
            get(handlers::relatorios::obter_relatorio).patch(handlers::relatorios::atualizar_relatorio),
        )
        .route("/api/relatorios/{id}/pdf", get(handlers::relatorios::exportar_relatorio_pdf))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .merge(publicas)
        .merge(protegidas)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
