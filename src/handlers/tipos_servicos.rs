// src/handlers/tipos_servicos.rs

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
    models::tipo_servico::{AtualizaTipoServico, FiltroTiposServicos, NovoTipoServico, TipoServico},
};

// GET /api/tipos-servicos
#[utoipa::path(
    get,
    path = "/api/tipos-servicos",
    tag = "Tipos de Serviço",
    params(FiltroTiposServicos),
    responses((status = 200, description = "Lista de tipos de serviço", body = [TipoServico])),
    security(("api_jwt" = []))
)]
pub async fn listar_tipos_servicos(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filtro): Query<FiltroTiposServicos>,
) -> Result<impl IntoResponse, ApiError> {
    let tipos = app_state
        .tipo_servico_repo
        .get_all(&filtro)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(tipos))
}

// GET /api/tipos-servicos/categorias
#[utoipa::path(
    get,
    path = "/api/tipos-servicos/categorias",
    tag = "Tipos de Serviço",
    responses((status = 200, description = "Categorias dos tipos ativos", body = [String])),
    security(("api_jwt" = []))
)]
pub async fn listar_categorias(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let categorias = app_state
        .tipo_servico_repo
        .listar_categorias()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(categorias))
}

// GET /api/tipos-servicos/{id}
#[utoipa::path(
    get,
    path = "/api/tipos-servicos/{id}",
    tag = "Tipos de Serviço",
    params(("id" = Uuid, Path, description = "ID do tipo de serviço")),
    responses(
        (status = 200, description = "Tipo de serviço", body = TipoServico),
        (status = 404, description = "Tipo de serviço não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn obter_tipo_servico(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let tipo = app_state
        .tipo_servico_repo
        .get_by_id(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(tipo))
}

// POST /api/tipos-servicos
#[utoipa::path(
    post,
    path = "/api/tipos-servicos",
    tag = "Tipos de Serviço",
    request_body = NovoTipoServico,
    responses(
        (status = 201, description = "Tipo de serviço criado", body = TipoServico),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn criar_tipo_servico(
    State(app_state): State<AppState>,
    locale: Locale,
    _nivel: RequireNivel<NivelAdmin>,
    Json(payload): Json<NovoTipoServico>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let tipo = app_state
        .tipo_servico_repo
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(tipo)))
}

// PATCH /api/tipos-servicos/{id}
#[utoipa::path(
    patch,
    path = "/api/tipos-servicos/{id}",
    tag = "Tipos de Serviço",
    params(("id" = Uuid, Path, description = "ID do tipo de serviço")),
    request_body = AtualizaTipoServico,
    responses(
        (status = 200, description = "Tipo de serviço atualizado", body = TipoServico),
        (status = 404, description = "Tipo de serviço não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn atualizar_tipo_servico(
    State(app_state): State<AppState>,
    locale: Locale,
    _nivel: RequireNivel<NivelAdmin>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AtualizaTipoServico>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let tipo = app_state
        .tipo_servico_repo
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(tipo))
}
