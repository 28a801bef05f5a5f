// src/handlers/usuarios.rs

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
        nivel_acesso::{NivelAdmin, NivelGestao, RequireNivel},
    },
    models::usuario::{AtualizaUsuario, FiltroUsuarios, NovoUsuario, Usuario, UsuarioDetalhado},
};

// GET /api/usuarios
#[utoipa::path(
    get,
    path = "/api/usuarios",
    tag = "Usuários",
    params(FiltroUsuarios),
    responses(
        (status = 200, description = "Lista de usuários com o órgão", body = [UsuarioDetalhado]),
        (status = 403, description = "Apenas administradores e gestores")
    ),
    security(("api_jwt" = []))
)]
pub async fn listar_usuarios(
    State(app_state): State<AppState>,
    locale: Locale,
    _nivel: RequireNivel<NivelGestao>,
    Query(filtro): Query<FiltroUsuarios>,
) -> Result<impl IntoResponse, ApiError> {
    let usuarios = app_state
        .usuario_repo
        .get_all(&filtro)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(usuarios))
}

// GET /api/usuarios/{id}
#[utoipa::path(
    get,
    path = "/api/usuarios/{id}",
    tag = "Usuários",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário", body = UsuarioDetalhado),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn obter_usuario(
    State(app_state): State<AppState>,
    locale: Locale,
    _nivel: RequireNivel<NivelGestao>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let usuario = app_state
        .usuario_repo
        .get_by_id(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(usuario))
}

// POST /api/usuarios
#[utoipa::path(
    post,
    path = "/api/usuarios",
    tag = "Usuários",
    request_body = NovoUsuario,
    responses(
        (status = 201, description = "Usuário criado", body = Usuario),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn criar_usuario(
    State(app_state): State<AppState>,
    locale: Locale,
    _nivel: RequireNivel<NivelAdmin>,
    Json(payload): Json<NovoUsuario>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let usuario = app_state
        .usuario_repo
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(usuario)))
}

// PATCH /api/usuarios/{id}
#[utoipa::path(
    patch,
    path = "/api/usuarios/{id}",
    tag = "Usuários",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    request_body = AtualizaUsuario,
    responses(
        (status = 200, description = "Usuário atualizado", body = Usuario),
        (status = 404, description = "Usuário não encontrado"),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn atualizar_usuario(
    State(app_state): State<AppState>,
    locale: Locale,
    _nivel: RequireNivel<NivelAdmin>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AtualizaUsuario>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let usuario = app_state
        .usuario_repo
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(usuario))
}
