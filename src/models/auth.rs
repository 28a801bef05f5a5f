// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::usuario::{NivelAcesso, UsuarioDetalhado};

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUsuarioPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "operador@municipio.gov")]
    pub email: String,

    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub senha: String,
}

/// Dados do usuário que a interface guarda para a sessão.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SessaoUsuario {
    pub id: Uuid,
    pub nome: String,
    pub email: String,
    pub nivel_acesso: NivelAcesso,
    pub orgao_id: Option<Uuid>,
}

impl From<&UsuarioDetalhado> for SessaoUsuario {
    fn from(detalhado: &UsuarioDetalhado) -> Self {
        let u = &detalhado.usuario;
        Self {
            id: u.id,
            nome: u.nome.clone(),
            email: u.email.clone(),
            nivel_acesso: u.nivel_acesso,
            orgao_id: u.orgao_id,
        }
    }
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub usuario: SessaoUsuario,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,          // Subject (ID do usuário)
    pub nivel: NivelAcesso, // Nível de acesso no momento do login
    pub exp: usize,         // Expiration time (quando o token expira)
    pub iat: usize,         // Issued At (quando o token foi criado)
}
