// src/handlers/relatorios.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        nivel_acesso::{NivelGestao, RequireNivel},
    },
    models::relatorio::{
        AtualizaRelatorio, FiltroRelatorios, PedidoRelatorio, Relatorio, RelatorioDetalhado,
        ResultadoRelatorio,
    },
};

// POST /api/relatorios
// Calcula e grava um novo snapshot; nunca reaproveita um relatório existente
#[utoipa::path(
    post,
    path = "/api/relatorios",
    tag = "Relatórios",
    request_body = PedidoRelatorio,
    responses(
        (status = 201, description = "Relatório gerado e salvo", body = ResultadoRelatorio),
        (status = 400, description = "Período ausente ou invertido")
    ),
    security(("api_jwt" = []))
)]
pub async fn gerar_relatorio(
    State(app_state): State<AppState>,
    locale: Locale,
    _nivel: RequireNivel<NivelGestao>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    Json(payload): Json<PedidoRelatorio>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let (id, resultado) = app_state
        .relatorio_service
        .gerar(payload, usuario.usuario.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/relatorios/{id}"))],
        Json(resultado),
    ))
}

// GET /api/relatorios
#[utoipa::path(
    get,
    path = "/api/relatorios",
    tag = "Relatórios",
    params(FiltroRelatorios),
    responses((status = 200, description = "Relatórios salvos, mais recentes primeiro", body = [RelatorioDetalhado])),
    security(("api_jwt" = []))
)]
pub async fn listar_relatorios(
    State(app_state): State<AppState>,
    locale: Locale,
    _nivel: RequireNivel<NivelGestao>,
    Query(filtro): Query<FiltroRelatorios>,
) -> Result<impl IntoResponse, ApiError> {
    let relatorios = app_state
        .relatorio_repo
        .get_all(&filtro)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(relatorios))
}

// GET /api/relatorios/{id}
// Devolve o snapshot como foi gravado
#[utoipa::path(
    get,
    path = "/api/relatorios/{id}",
    tag = "Relatórios",
    params(("id" = Uuid, Path, description = "ID do relatório")),
    responses(
        (status = 200, description = "Relatório salvo", body = RelatorioDetalhado),
        (status = 404, description = "Relatório não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn obter_relatorio(
    State(app_state): State<AppState>,
    locale: Locale,
    _nivel: RequireNivel<NivelGestao>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let relatorio = app_state
        .relatorio_repo
        .get_by_id(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(relatorio))
}

// PATCH /api/relatorios/{id}
#[utoipa::path(
    patch,
    path = "/api/relatorios/{id}",
    tag = "Relatórios",
    params(("id" = Uuid, Path, description = "ID do relatório")),
    request_body = AtualizaRelatorio,
    responses(
        (status = 200, description = "Título/descrição atualizados", body = Relatorio),
        (status = 404, description = "Relatório não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn atualizar_relatorio(
    State(app_state): State<AppState>,
    locale: Locale,
    _nivel: RequireNivel<NivelGestao>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AtualizaRelatorio>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let relatorio = app_state
        .relatorio_repo
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(relatorio))
}

// GET /api/relatorios/{id}/pdf
#[utoipa::path(
    get,
    path = "/api/relatorios/{id}/pdf",
    tag = "Relatórios",
    params(("id" = Uuid, Path, description = "ID do relatório")),
    responses(
        (status = 200, description = "PDF do relatório", content_type = "application/pdf"),
        (status = 404, description = "Relatório não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn exportar_relatorio_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    _nivel: RequireNivel<NivelGestao>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let pdf_bytes = app_state
        .document_service
        .gerar_pdf_relatorio(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    // Configura os Headers para o navegador baixar ou mostrar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"relatorio_{}.pdf\"", id)),
    ];

    Ok((headers, pdf_bytes).into_response())
}
