// src/models/usuario.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{common::db_utils::campo_anulavel, models::orgao::Orgao};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "nivel_acesso", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NivelAcesso {
    Admin,
    Gestor,
    Operador,
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Usuario {
    pub id: Uuid,
    pub nome: String,
    pub email: String,

    #[serde(skip_serializing)] // O digest nunca sai da API
    #[schema(ignore)]
    pub senha_hash: String,

    pub nivel_acesso: NivelAcesso,
    pub orgao_id: Option<Uuid>,
    pub ativo: bool,
    pub data_criacao: DateTime<Utc>,
    pub ultimo_acesso: Option<DateTime<Utc>>,
}

/// Usuário com o órgão embutido (`usuarios` LEFT JOIN `orgaos`).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct UsuarioDetalhado {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub usuario: Usuario,

    #[schema(value_type = Option<Orgao>)]
    pub orgao: Option<Json<Orgao>>,
}

/// Projeção mínima usada quando um usuário aparece dentro de outro registro.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UsuarioResumo {
    pub id: Uuid,
    pub nome: String,
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NovoUsuario {
    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório."))]
    pub nome: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    // Senha em texto claro; vira digest antes de ir para o banco
    #[serde(alias = "senha_hash")]
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub senha: String,

    pub nivel_acesso: NivelAcesso,
    pub orgao_id: Option<Uuid>,
    pub ativo: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct AtualizaUsuario {
    #[validate(length(min = 1, max = 255, message = "O nome não pode ficar vazio."))]
    pub nome: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    // Ausente (ou vazia) mantém o digest atual
    #[serde(default, alias = "senha_hash")]
    pub senha: Option<String>,

    pub nivel_acesso: Option<NivelAcesso>,

    #[serde(default, deserialize_with = "campo_anulavel")]
    #[schema(value_type = Option<Uuid>)]
    pub orgao_id: Option<Option<Uuid>>,

    pub ativo: Option<bool>,
}

impl AtualizaUsuario {
    /// A nova senha, se de fato foi informada.
    pub fn nova_senha(&self) -> Option<&str> {
        self.senha.as_deref().filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.nome.is_none()
            && self.email.is_none()
            && self.nova_senha().is_none()
            && self.nivel_acesso.is_none()
            && self.orgao_id.is_none()
            && self.ativo.is_none()
    }
}

fn apenas_ativos_padrao() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FiltroUsuarios {
    #[serde(default = "apenas_ativos_padrao")]
    pub apenas_ativos: bool,

    pub nivel_acesso: Option<NivelAcesso>,
    pub orgao_id: Option<Uuid>,
}

impl Default for FiltroUsuarios {
    fn default() -> Self {
        Self { apenas_ativos: true, nivel_acesso: None, orgao_id: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_sem_senha_nao_troca_o_digest() {
        let p: AtualizaUsuario = serde_json::from_str(r#"{"nome": "Ana", "senha": ""}"#).unwrap();
        assert_eq!(p.nova_senha(), None);
        assert!(!p.is_empty());
    }

    #[test]
    fn aceita_o_nome_antigo_do_campo_de_senha() {
        let novo: NovoUsuario = serde_json::from_str(
            r#"{"nome": "Ana", "email": "ana@municipio.gov", "senha_hash": "segredo1", "nivel_acesso": "operador"}"#,
        )
        .unwrap();
        assert_eq!(novo.senha, "segredo1");
        assert_eq!(novo.nivel_acesso, NivelAcesso::Operador);
    }

    #[test]
    fn digest_nao_aparece_no_json() {
        let usuario = Usuario {
            id: Uuid::new_v4(),
            nome: "Ana".into(),
            email: "ana@municipio.gov".into(),
            senha_hash: "abc".into(),
            nivel_acesso: NivelAcesso::Admin,
            orgao_id: None,
            ativo: true,
            data_criacao: Utc::now(),
            ultimo_acesso: None,
        };
        let json = serde_json::to_value(&usuario).unwrap();
        assert!(json.get("senha_hash").is_none());
        assert_eq!(json["nivel_acesso"], "admin");
    }
}
