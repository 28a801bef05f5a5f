// src/db/tipo_servico_repo.rs

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::mapear_erro_escrita, error::AppError},
    models::tipo_servico::{AtualizaTipoServico, FiltroTiposServicos, NovoTipoServico, TipoServico},
};

#[derive(Clone)]
pub struct TipoServicoRepository {
    pool: PgPool,
}

impl TipoServicoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_all(&self, filtro: &FiltroTiposServicos) -> Result<Vec<TipoServico>, AppError> {
        let mut query = consulta_listagem(filtro);
        let tipos = query
            .build_query_as::<TipoServico>()
            .fetch_all(&self.pool)
            .await
            .inspect_err(|e| tracing::error!("Erro ao buscar tipos de serviço: {}", e))?;

        Ok(tipos)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<TipoServico, AppError> {
        sqlx::query_as::<_, TipoServico>("SELECT * FROM tipos_servicos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .inspect_err(|e| tracing::error!("Erro ao buscar tipo de serviço por ID: {}", e))?
            .ok_or(AppError::NaoEncontrado("tipo_servico"))
    }

    /// Categorias distintas dos tipos ativos, em ordem alfabética.
    pub async fn listar_categorias(&self) -> Result<Vec<String>, AppError> {
        let categorias = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT categoria FROM tipos_servicos WHERE ativo = TRUE ORDER BY categoria",
        )
        .fetch_all(&self.pool)
        .await
        .inspect_err(|e| tracing::error!("Erro ao listar categorias: {}", e))?;

        Ok(categorias)
    }

    pub async fn create(&self, novo: &NovoTipoServico) -> Result<TipoServico, AppError> {
        sqlx::query_as::<_, TipoServico>(
            r#"
            INSERT INTO tipos_servicos (nome, descricao, categoria, ativo)
            VALUES ($1, $2, $3, COALESCE($4, TRUE))
            RETURNING *
            "#,
        )
        .bind(&novo.nome)
        .bind(&novo.descricao)
        .bind(&novo.categoria)
        .bind(novo.ativo)
        .fetch_one(&self.pool)
        .await
        .inspect_err(|e| tracing::error!("Erro ao criar tipo de serviço: {}", e))
        .map_err(mapear_erro_escrita)
    }

    pub async fn update(
        &self,
        id: Uuid,
        alteracoes: &AtualizaTipoServico,
    ) -> Result<TipoServico, AppError> {
        if alteracoes.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query = consulta_atualizacao(id, alteracoes);
        query
            .build_query_as::<TipoServico>()
            .fetch_optional(&self.pool)
            .await
            .inspect_err(|e| tracing::error!("Erro ao atualizar tipo de serviço: {}", e))
            .map_err(mapear_erro_escrita)?
            .ok_or(AppError::NaoEncontrado("tipo_servico"))
    }
}

fn consulta_listagem(filtro: &FiltroTiposServicos) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("SELECT * FROM tipos_servicos WHERE TRUE");

    if filtro.apenas_ativos {
        query.push(" AND ativo = TRUE");
    }
    if let Some(categoria) = &filtro.categoria {
        query.push(" AND categoria = ").push_bind(categoria.clone());
    }

    query.push(" ORDER BY categoria ASC, nome ASC");
    query
}

fn consulta_atualizacao(id: Uuid, alteracoes: &AtualizaTipoServico) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("UPDATE tipos_servicos SET ");
    {
        let mut campos = query.separated(", ");
        if let Some(nome) = &alteracoes.nome {
            campos.push("nome = ").push_bind_unseparated(nome.clone());
        }
        if let Some(descricao) = &alteracoes.descricao {
            campos.push("descricao = ").push_bind_unseparated(descricao.clone());
        }
        if let Some(categoria) = &alteracoes.categoria {
            campos.push("categoria = ").push_bind_unseparated(categoria.clone());
        }
        if let Some(ativo) = alteracoes.ativo {
            campos.push("ativo = ").push_bind_unseparated(ativo);
        }
    }
    query.push(" WHERE id = ").push_bind(id).push(" RETURNING *");
    query
}
