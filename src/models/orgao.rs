// src/models/orgao.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::db_utils::campo_anulavel;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_orgao", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TipoOrgao {
    Provincial,
    Municipal,
    Comunal,
}

// --- Structs ---

/// Órgão emissor. Nunca é apagado, apenas desativado (`ativo = false`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Orgao {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(example = "Direção Municipal de Finanças")]
    pub nome: String,

    pub tipo: TipoOrgao,

    // Hierarquia opcional (órgão superior)
    pub orgao_superior_id: Option<Uuid>,

    #[schema(example = true)]
    pub ativo: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NovoOrgao {
    #[validate(length(min = 1, max = 255, message = "O nome do órgão é obrigatório."))]
    #[schema(example = "Direção X")]
    pub nome: String,

    #[schema(example = "municipal")]
    pub tipo: TipoOrgao,

    pub orgao_superior_id: Option<Uuid>,

    #[schema(example = true)]
    pub ativo: Option<bool>,
}

/// Alterações parciais: o que não vier no JSON fica como está.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct AtualizaOrgao {
    #[validate(length(min = 1, max = 255, message = "O nome do órgão não pode ficar vazio."))]
    pub nome: Option<String>,

    pub tipo: Option<TipoOrgao>,

    // `null` remove o órgão superior
    #[serde(default, deserialize_with = "campo_anulavel")]
    #[schema(value_type = Option<Uuid>)]
    pub orgao_superior_id: Option<Option<Uuid>>,

    pub ativo: Option<bool>,
}

impl AtualizaOrgao {
    pub fn is_empty(&self) -> bool {
        self.nome.is_none()
            && self.tipo.is_none()
            && self.orgao_superior_id.is_none()
            && self.ativo.is_none()
    }
}

fn apenas_ativos_padrao() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FiltroOrgaos {
    /// Lista só os órgãos ativos (padrão: `true`)
    #[serde(default = "apenas_ativos_padrao")]
    pub apenas_ativos: bool,

    pub tipo: Option<TipoOrgao>,
}

impl Default for FiltroOrgaos {
    fn default() -> Self {
        Self { apenas_ativos: true, tipo: None }
    }
}
