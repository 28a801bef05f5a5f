// src/models/tipo_servico.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::db_utils::campo_anulavel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TipoServico {
    pub id: Uuid,

    #[schema(example = "Emissão de Bilhete de Identidade")]
    pub nome: String,

    pub descricao: Option<String>,

    // Texto livre, serve só para agrupar na interface
    #[schema(example = "Documentação")]
    pub categoria: String,

    pub ativo: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NovoTipoServico {
    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório."))]
    pub nome: String,

    pub descricao: Option<String>,

    #[validate(length(min = 1, max = 100, message = "A categoria é obrigatória."))]
    pub categoria: String,

    pub ativo: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct AtualizaTipoServico {
    #[validate(length(min = 1, max = 255, message = "O nome não pode ficar vazio."))]
    pub nome: Option<String>,

    #[serde(default, deserialize_with = "campo_anulavel")]
    #[schema(value_type = Option<String>)]
    pub descricao: Option<Option<String>>,

    #[validate(length(min = 1, max = 100, message = "A categoria não pode ficar vazia."))]
    pub categoria: Option<String>,

    pub ativo: Option<bool>,
}

impl AtualizaTipoServico {
    pub fn is_empty(&self) -> bool {
        self.nome.is_none() && self.descricao.is_none() && self.categoria.is_none() && self.ativo.is_none()
    }
}

fn apenas_ativos_padrao() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FiltroTiposServicos {
    #[serde(default = "apenas_ativos_padrao")]
    pub apenas_ativos: bool,

    pub categoria: Option<String>,
}

impl Default for FiltroTiposServicos {
    fn default() -> Self {
        Self { apenas_ativos: true, categoria: None }
    }
}
