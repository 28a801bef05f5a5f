// src/middleware/nivel_acesso.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::usuario::NivelAcesso,
};

/// 1. O Trait que define quais níveis passam por uma rota
pub trait NivelDef: Send + Sync + 'static {
    fn permitidos() -> &'static [NivelAcesso];

    fn permite(nivel: NivelAcesso) -> bool {
        Self::permitidos().contains(&nivel)
    }
}

/// 2. O Extractor (Guardião)
pub struct RequireNivel<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireNivel<T>
where
    T: NivelDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(usuario) = AuthenticatedUser::from_request_parts(parts, state).await?;
        let nivel = usuario.usuario.nivel_acesso;

        if T::permite(nivel) {
            return Ok(RequireNivel(PhantomData));
        }

        tracing::warn!(
            "⛔ Acesso negado a {} ({:?}) em {}",
            usuario.usuario.email,
            nivel,
            parts.uri.path()
        );

        let app_state = AppState::from_ref(state);
        let locale = Locale::from_headers(&parts.headers);
        Err(AppError::AcessoNegado.to_api_error(&locale, &app_state.i18n_store))
    }
}

// ---
// NÍVEIS EXIGIDOS (TIPOS)
// ---

pub struct NivelAdmin;
impl NivelDef for NivelAdmin {
    fn permitidos() -> &'static [NivelAcesso] {
        &[NivelAcesso::Admin]
    }
}

/// Administradores e gestores.
pub struct NivelGestao;
impl NivelDef for NivelGestao {
    fn permitidos() -> &'static [NivelAcesso] {
        &[NivelAcesso::Admin, NivelAcesso::Gestor]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn so_admin_passa_no_nivel_admin() {
        assert!(NivelAdmin::permite(NivelAcesso::Admin));
        assert!(!NivelAdmin::permite(NivelAcesso::Gestor));
        assert!(!NivelAdmin::permite(NivelAcesso::Operador));
    }

    #[test]
    fn operador_fica_fora_da_gestao() {
        assert!(NivelGestao::permite(NivelAcesso::Admin));
        assert!(NivelGestao::permite(NivelAcesso::Gestor));
        assert!(!NivelGestao::permite(NivelAcesso::Operador));
    }
}
