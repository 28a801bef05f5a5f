// src/models/relatorio.rs

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::db_utils::campo_anulavel,
    models::{
        orgao::TipoOrgao,
        receita::{ReceitaDetalhada, Totais},
        usuario::UsuarioResumo,
    },
};

/// Versão do formato gravado em `relatorios.resultados`.
pub const VERSAO_RESULTADOS: u16 = 1;

fn versao_inicial() -> u16 {
    VERSAO_RESULTADOS
}

// --- Snapshot (conteúdo imutável do relatório) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Periodo {
    pub data_inicio: NaiveDate,
    pub data_fim: NaiveDate,
}

/// Receitas de um órgão dentro do relatório.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GrupoOrgao {
    pub nome: Option<String>,
    pub tipo: Option<TipoOrgao>,
    pub valor_total: Decimal,
    pub quantidade: i64,
    pub receitas: Vec<ReceitaDetalhada>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultadoRelatorio {
    // Snapshots antigos, sem versão, são da versão 1
    #[serde(default = "versao_inicial")]
    pub versao: u16,

    pub receitas: Vec<ReceitaDetalhada>,

    // Chave: id do órgão
    #[schema(value_type = Object)]
    pub receitas_por_orgao: BTreeMap<Uuid, GrupoOrgao>,

    pub totais: Totais,
    pub periodo: Periodo,
}

/// Filtros usados na geração, guardados junto com o relatório.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FiltrosRelatorio {
    pub orgao_id: Option<Uuid>,
    pub tipo_servico_id: Option<Uuid>,
}

// --- Registro ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Relatorio {
    pub id: Uuid,
    pub titulo: String,
    pub descricao: Option<String>,
    pub data_inicio: NaiveDate,
    pub data_fim: NaiveDate,
    pub usuario_id: Option<Uuid>,

    #[schema(value_type = FiltrosRelatorio)]
    pub filtros: Json<FiltrosRelatorio>,

    #[schema(value_type = ResultadoRelatorio)]
    pub resultados: Json<ResultadoRelatorio>,

    pub data_geracao: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct RelatorioDetalhado {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub relatorio: Relatorio,

    #[schema(value_type = Option<UsuarioResumo>)]
    pub usuario: Option<Json<UsuarioResumo>>,
}

/// O que o repositório grava; montado pelo serviço de relatórios.
#[derive(Debug, Clone)]
pub struct NovoRelatorio {
    pub titulo: String,
    pub descricao: Option<String>,
    pub data_inicio: NaiveDate,
    pub data_fim: NaiveDate,
    pub usuario_id: Uuid,
    pub filtros: FiltrosRelatorio,
    pub resultados: ResultadoRelatorio,
}

/// Pedido de geração vindo da interface.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PedidoRelatorio {
    #[validate(length(max = 255, message = "O título deve ter no máximo 255 caracteres."))]
    pub titulo: Option<String>,

    pub descricao: Option<String>,
    pub orgao_id: Option<Uuid>,
    pub tipo_servico_id: Option<Uuid>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
}

/// Só os metadados podem mudar; o snapshot nunca é regravado.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct AtualizaRelatorio {
    #[validate(length(min = 1, max = 255, message = "O título não pode ficar vazio."))]
    pub titulo: Option<String>,

    #[serde(default, deserialize_with = "campo_anulavel")]
    #[schema(value_type = Option<String>)]
    pub descricao: Option<Option<String>>,
}

impl AtualizaRelatorio {
    pub fn is_empty(&self) -> bool {
        self.titulo.is_none() && self.descricao.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FiltroRelatorios {
    /// Usuário que gerou o relatório
    pub usuario_id: Option<Uuid>,
}
