// src/db/relatorio_repo.rs

use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::mapear_erro_escrita, error::AppError},
    models::relatorio::{AtualizaRelatorio, FiltroRelatorios, NovoRelatorio, Relatorio, RelatorioDetalhado},
};

const SELECAO_DETALHADA: &str = r#"
    SELECT
        rel.*,
        CASE WHEN u.id IS NULL THEN NULL
             ELSE jsonb_build_object('id', u.id, 'nome', u.nome, 'email', u.email)
        END AS usuario
    FROM relatorios rel
    LEFT JOIN usuarios u ON u.id = rel.usuario_id
"#;

#[derive(Clone)]
pub struct RelatorioRepository {
    pool: PgPool,
}

impl RelatorioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_all(&self, filtro: &FiltroRelatorios) -> Result<Vec<RelatorioDetalhado>, AppError> {
        let mut query = consulta_listagem(filtro);
        let relatorios = query
            .build_query_as::<RelatorioDetalhado>()
            .fetch_all(&self.pool)
            .await
            .inspect_err(|e| tracing::error!("Erro ao buscar relatórios: {}", e))?;

        Ok(relatorios)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<RelatorioDetalhado, AppError> {
        let sql = format!("{SELECAO_DETALHADA} WHERE rel.id = $1");
        sqlx::query_as::<_, RelatorioDetalhado>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .inspect_err(|e| tracing::error!("Erro ao buscar relatório por ID: {}", e))?
            .ok_or(AppError::NaoEncontrado("relatorio"))
    }

    pub async fn create(&self, novo: &NovoRelatorio) -> Result<Relatorio, AppError> {
        let relatorio = sqlx::query_as::<_, Relatorio>(
            r#"
            INSERT INTO relatorios (titulo, descricao, data_inicio, data_fim, usuario_id, filtros, resultados)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&novo.titulo)
        .bind(&novo.descricao)
        .bind(novo.data_inicio)
        .bind(novo.data_fim)
        .bind(novo.usuario_id)
        .bind(Json(&novo.filtros))
        .bind(Json(&novo.resultados))
        .fetch_one(&self.pool)
        .await
        .inspect_err(|e| tracing::error!("Erro ao salvar relatório: {}", e))
        .map_err(mapear_erro_escrita)?;

        tracing::info!("📊 Relatório '{}' salvo ({})", relatorio.titulo, relatorio.id);
        Ok(relatorio)
    }

    // Só título e descrição; o snapshot nunca é regravado
    pub async fn update(&self, id: Uuid, alteracoes: &AtualizaRelatorio) -> Result<Relatorio, AppError> {
        if alteracoes.is_empty() {
            return Ok(self.get_by_id(id).await?.relatorio);
        }

        let mut query = consulta_atualizacao(id, alteracoes);
        query
            .build_query_as::<Relatorio>()
            .fetch_optional(&self.pool)
            .await
            .inspect_err(|e| tracing::error!("Erro ao atualizar relatório: {}", e))
            .map_err(mapear_erro_escrita)?
            .ok_or(AppError::NaoEncontrado("relatorio"))
    }
}

fn consulta_listagem(filtro: &FiltroRelatorios) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(SELECAO_DETALHADA);
    query.push(" WHERE TRUE");
    if let Some(usuario_id) = filtro.usuario_id {
        query.push(" AND rel.usuario_id = ").push_bind(usuario_id);
    }
    query.push(" ORDER BY rel.data_geracao DESC");
    query
}

fn consulta_atualizacao(id: Uuid, alteracoes: &AtualizaRelatorio) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("UPDATE relatorios SET ");
    {
        let mut campos = query.separated(", ");
        if let Some(titulo) = &alteracoes.titulo {
            campos.push("titulo = ").push_bind_unseparated(titulo.clone());
        }
        if let Some(descricao) = &alteracoes.descricao {
            campos.push("descricao = ").push_bind_unseparated(descricao.clone());
        }
    }
    query.push(" WHERE id = ").push_bind(id).push(" RETURNING *");
    query
}
