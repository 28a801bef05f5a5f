// src/db/orgao_repo.rs

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::mapear_erro_escrita, error::AppError},
    models::orgao::{AtualizaOrgao, FiltroOrgaos, NovoOrgao, Orgao},
};

/// Chave da trava transacional que serializa mudanças de `orgao_superior_id`.
const TRAVA_HIERARQUIA: i64 = 0x6f72_6761_6f73;

// O repositório de órgãos, responsável por todas as interações com a tabela 'orgaos'
#[derive(Clone)]
pub struct OrgaoRepository {
    pool: PgPool,
}

impl OrgaoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_all(&self, filtro: &FiltroOrgaos) -> Result<Vec<Orgao>, AppError> {
        let mut query = consulta_listagem(filtro);
        let orgaos = query
            .build_query_as::<Orgao>()
            .fetch_all(&self.pool)
            .await
            .inspect_err(|e| tracing::error!("Erro ao buscar órgãos: {}", e))?;

        Ok(orgaos)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Orgao, AppError> {
        sqlx::query_as::<_, Orgao>("SELECT * FROM orgaos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .inspect_err(|e| tracing::error!("Erro ao buscar órgão por ID: {}", e))?
            .ok_or(AppError::NaoEncontrado("orgao"))
    }

    pub async fn create(&self, novo: &NovoOrgao) -> Result<Orgao, AppError> {
        let orgao = sqlx::query_as::<_, Orgao>(
            r#"
            INSERT INTO orgaos (nome, tipo, orgao_superior_id, ativo)
            VALUES ($1, $2, $3, COALESCE($4, TRUE))
            RETURNING *
            "#,
        )
        .bind(&novo.nome)
        .bind(novo.tipo)
        .bind(novo.orgao_superior_id)
        .bind(novo.ativo)
        .fetch_one(&self.pool)
        .await
        .inspect_err(|e| tracing::error!("Erro ao criar órgão: {}", e))
        .map_err(mapear_erro_escrita)?;

        tracing::info!("🏛️ Órgão '{}' criado ({})", orgao.nome, orgao.id);
        Ok(orgao)
    }

    /// Atualização parcial. Um novo órgão superior não pode ser o próprio órgão
    /// nem um dos seus descendentes.
    pub async fn update(&self, id: Uuid, alteracoes: &AtualizaOrgao) -> Result<Orgao, AppError> {
        if alteracoes.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut tx = self.pool.begin().await?;

        if let Some(Some(superior_id)) = alteracoes.orgao_superior_id {
            if superior_id == id {
                return Err(AppError::HierarquiaCiclica);
            }

            // Mudanças de hierarquia passam uma de cada vez; a verificação abaixo
            // já enxerga o que a anterior gravou
            sqlx::query("SELECT pg_advisory_xact_lock($1)")
                .bind(TRAVA_HIERARQUIA)
                .execute(&mut *tx)
                .await
                .inspect_err(|e| tracing::error!("Erro ao travar a hierarquia de órgãos: {}", e))?;

            let ciclo = sqlx::query_scalar::<_, bool>(
                r#"
                WITH RECURSIVE ancestrais AS (
                    SELECT id, orgao_superior_id FROM orgaos WHERE id = $1
                    UNION
                    SELECT o.id, o.orgao_superior_id
                    FROM orgaos o
                    JOIN ancestrais a ON o.id = a.orgao_superior_id
                )
                SELECT EXISTS (SELECT 1 FROM ancestrais WHERE id = $2)
                "#,
            )
            .bind(superior_id)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .inspect_err(|e| tracing::error!("Erro ao verificar hierarquia de órgãos: {}", e))?;

            if ciclo {
                return Err(AppError::HierarquiaCiclica);
            }
        }

        let mut query = consulta_atualizacao(id, alteracoes);
        let orgao = query
            .build_query_as::<Orgao>()
            .fetch_optional(&mut *tx)
            .await
            .inspect_err(|e| tracing::error!("Erro ao atualizar órgão: {}", e))
            .map_err(mapear_erro_escrita)?
            .ok_or(AppError::NaoEncontrado("orgao"))?;

        tx.commit().await?;

        Ok(orgao)
    }
}

fn consulta_listagem(filtro: &FiltroOrgaos) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("SELECT * FROM orgaos WHERE TRUE");

    if filtro.apenas_ativos {
        query.push(" AND ativo = TRUE");
    }
    if let Some(tipo) = filtro.tipo {
        query.push(" AND tipo = ").push_bind(tipo);
    }

    query.push(" ORDER BY nome ASC");
    query
}

fn consulta_atualizacao(id: Uuid, alteracoes: &AtualizaOrgao) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("UPDATE orgaos SET ");
    {
        let mut campos = query.separated(", ");
        if let Some(nome) = &alteracoes.nome {
            campos.push("nome = ").push_bind_unseparated(nome.clone());
        }
        if let Some(tipo) = alteracoes.tipo {
            campos.push("tipo = ").push_bind_unseparated(tipo);
        }
        if let Some(superior_id) = alteracoes.orgao_superior_id {
            campos.push("orgao_superior_id = ").push_bind_unseparated(superior_id);
        }
        if let Some(ativo) = alteracoes.ativo {
            campos.push("ativo = ").push_bind_unseparated(ativo);
        }
    }
    query.push(" WHERE id = ").push_bind(id).push(" RETURNING *");
    query
}
