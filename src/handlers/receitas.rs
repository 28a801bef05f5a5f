// src/handlers/receitas.rs

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
        auth::AuthenticatedUser,
        i18n::Locale,
        nivel_acesso::{NivelGestao, RequireNivel},
    },
    models::receita::{AtualizaReceita, FiltroReceitas, NovaReceita, Receita, ReceitaDetalhada, Totais},
};

// GET /api/receitas
#[utoipa::path(
    get,
    path = "/api/receitas",
    tag = "Receitas",
    params(FiltroReceitas),
    responses((status = 200, description = "Receitas, mais recentes primeiro", body = [ReceitaDetalhada])),
    security(("api_jwt" = []))
)]
pub async fn listar_receitas(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filtro): Query<FiltroReceitas>,
) -> Result<impl IntoResponse, ApiError> {
    let receitas = app_state
        .receita_repo
        .get_all(&filtro)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(receitas))
}

// GET /api/receitas/totais
#[utoipa::path(
    get,
    path = "/api/receitas/totais",
    tag = "Receitas",
    params(FiltroReceitas),
    responses((status = 200, description = "Soma e contagem das receitas filtradas", body = Totais)),
    security(("api_jwt" = []))
)]
pub async fn obter_totais(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filtro): Query<FiltroReceitas>,
) -> Result<impl IntoResponse, ApiError> {
    let totais = app_state
        .receita_repo
        .obter_totais(&filtro)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(totais))
}

// GET /api/receitas/{id}
#[utoipa::path(
    get,
    path = "/api/receitas/{id}",
    tag = "Receitas",
    params(("id" = Uuid, Path, description = "ID da receita")),
    responses(
        (status = 200, description = "Receita", body = ReceitaDetalhada),
        (status = 404, description = "Receita não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn obter_receita(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let receita = app_state
        .receita_repo
        .get_by_id(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(receita))
}

// POST /api/receitas
// Quem registra é o usuário do token
#[utoipa::path(
    post,
    path = "/api/receitas",
    tag = "Receitas",
    request_body = NovaReceita,
    responses(
        (status = 201, description = "Receita registrada", body = Receita),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn criar_receita(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(usuario): AuthenticatedUser,
    Json(payload): Json<NovaReceita>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let receita = app_state
        .receita_repo
        .create(&payload, usuario.usuario.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(receita)))
}

// PATCH /api/receitas/{id}
#[utoipa::path(
    patch,
    path = "/api/receitas/{id}",
    tag = "Receitas",
    params(("id" = Uuid, Path, description = "ID da receita")),
    request_body = AtualizaReceita,
    responses(
        (status = 200, description = "Receita atualizada (total recalculado quando preciso)", body = Receita),
        (status = 404, description = "Receita não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn atualizar_receita(
    State(app_state): State<AppState>,
    locale: Locale,
    _nivel: RequireNivel<NivelGestao>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AtualizaReceita>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .and_then(|_| payload.validar_valores())
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let receita = app_state
        .receita_repo
        .update(id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(receita))
}
