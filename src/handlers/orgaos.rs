// src/handlers/orgaos.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        nivel_acesso::{NivelAdmin, RequireNivel},
    },
    models::orgao::{AtualizaOrgao, FiltroOrgaos, NovoOrgao, Orgao},
};

// GET /api/orgaos
#[utoipa::path(
    get,
    path = "/api/orgaos",
    tag = "Órgãos",
    params(FiltroOrgaos),
    responses((status = 200, description = "Lista de órgãos", body = [Orgao])),
    security(("api_jwt" = []))
)]
pub async fn listar_orgaos(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filtro): Query<FiltroOrgaos>,
) -> Result<impl IntoResponse, ApiError> {
    let orgaos = app_state
        .orgao_repo
        .get_all(&filtro)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(orgaos))
}

// GET /api/orgaos/{id}
#[utoipa::path(
    get,
    path = "/api/orgaos/{id}",
    tag = "Órgãos",
    params(("id" = Uuid, Path, description = "ID do órgão")),
    responses(
        (status = 200, description = "Órgão", body = Orgao),
        (status = 404, description = "Órgão não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn obter_orgao(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let orgao = app_state
        .orgao_repo
        .get_by_id(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(orgao))
}

// POST /api/orgaos
#[utoipa::path(
    post,
    path = "/api/orgaos",
    tag = "Órgãos",
    request_body = NovoOrgao,
    responses(
        (status = 201, description = "Órgão criado", body = Orgao),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn criar_orgao(
    State(app_state): State<AppState>,
    locale: Locale,
    _nivel: RequireNivel<NivelAdmin>,
    Json(payload): Json<NovoOrgao>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let orgao = app_state
        .orgao_repo
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(orgao)))
}

// PATCH /api/orgaos/{id}
#[utoipa::path(
    patch,
    path = "/api/orgaos/{id}",
    tag = "Órgãos",
    params(("id" = Uuid, Path, description = "ID do órgão")),
    request_body = AtualizaOrgao,
    responses(
        (status = 200, description = "Órgão atualizado", body = Orgao),
        (status = 400, description = "Dados inválidos ou hierarquia cíclica"),
        (status = 404, description = "Órgão não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn atualizar_orgao(
    State(app_state): State<AppState>,
    locale: Locale,
    _nivel: RequireNivel<NivelAdmin>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AtualizaOrgao>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let orgao = app_state
        .orgao_repo
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(orgao))
}
