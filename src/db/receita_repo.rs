// src/db/receita_repo.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::mapear_erro_escrita, error::AppError},
    models::receita::{AtualizaReceita, FiltroReceitas, NovaReceita, Receita, ReceitaDetalhada, Totais},
};

// Receita com órgão, tipo de serviço e usuário de registro embutidos.
// O usuário é montado à mão para o digest da senha não vazar.
const SELECAO_DETALHADA: &str = r#"
    SELECT
        r.*,
        to_jsonb(o) AS orgao,
        to_jsonb(t) AS tipo_servico,
        CASE WHEN u.id IS NULL THEN NULL
             ELSE jsonb_build_object('id', u.id, 'nome', u.nome, 'email', u.email)
        END AS usuario_registro
    FROM receitas r
    LEFT JOIN orgaos o ON o.id = r.orgao_id
    LEFT JOIN tipos_servicos t ON t.id = r.tipo_servico_id
    LEFT JOIN usuarios u ON u.id = r.usuario_registro_id
"#;

/// Meia-noite UTC do dia.
pub fn inicio_do_dia(data: NaiveDate) -> DateTime<Utc> {
    data.and_time(NaiveTime::MIN).and_utc()
}

#[derive(Clone)]
pub struct ReceitaRepository {
    pool: PgPool,
}

impl ReceitaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_all(&self, filtro: &FiltroReceitas) -> Result<Vec<ReceitaDetalhada>, AppError> {
        let mut query = consulta_listagem(filtro);
        let receitas = query
            .build_query_as::<ReceitaDetalhada>()
            .fetch_all(&self.pool)
            .await
            .inspect_err(|e| tracing::error!("Erro ao buscar receitas: {}", e))?;

        Ok(receitas)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ReceitaDetalhada, AppError> {
        let sql = format!("{SELECAO_DETALHADA} WHERE r.id = $1");
        sqlx::query_as::<_, ReceitaDetalhada>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .inspect_err(|e| tracing::error!("Erro ao buscar receita por ID: {}", e))?
            .ok_or(AppError::NaoEncontrado("receita"))
    }

    /// Soma e contagem das receitas que atendem ao filtro. Sem receitas, zero.
    pub async fn obter_totais(&self, filtro: &FiltroReceitas) -> Result<Totais, AppError> {
        let mut query = consulta_totais(filtro);
        let totais = query
            .build_query_as::<Totais>()
            .fetch_one(&self.pool)
            .await
            .inspect_err(|e| tracing::error!("Erro ao calcular totais de receitas: {}", e))?;

        Ok(totais)
    }

    pub async fn create(
        &self,
        nova: &NovaReceita,
        usuario_registro_id: Uuid,
    ) -> Result<Receita, AppError> {
        let receita = sqlx::query_as::<_, Receita>(
            r#"
            INSERT INTO receitas (
                orgao_id, tipo_servico_id, quantidade, valor_unitario, valor_total,
                referencia, observacoes, usuario_registro_id, data_recebimento
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, NOW()))
            RETURNING *
            "#,
        )
        .bind(nova.orgao_id)
        .bind(nova.tipo_servico_id)
        .bind(nova.quantidade)
        .bind(nova.valor_unitario_gravado())
        .bind(nova.valor_total_efetivo())
        .bind(&nova.referencia)
        .bind(&nova.observacoes)
        .bind(usuario_registro_id)
        .bind(nova.data_recebimento)
        .fetch_one(&self.pool)
        .await
        .inspect_err(|e| tracing::error!("Erro ao registrar receita: {}", e))
        .map_err(mapear_erro_escrita)?;

        tracing::info!(
            "💰 Receita {} registrada: {} x {} = {}",
            receita.id,
            receita.quantidade,
            receita.valor_unitario,
            receita.valor_total
        );
        Ok(receita)
    }

    /// Atualização parcial. Se a quantidade ou o valor unitário mudarem sem um
    /// total explícito, o total é recalculado com os valores gravados, na mesma
    /// transação e com a linha travada até o commit.
    pub async fn update(&self, id: Uuid, mut alteracoes: AtualizaReceita) -> Result<Receita, AppError> {
        if alteracoes.is_empty() {
            return Ok(self.get_by_id(id).await?.receita);
        }

        alteracoes.arredondar_valores();

        let mut tx = self.pool.begin().await?;

        if alteracoes.precisa_recalcular_total() {
            let (quantidade, valor_unitario) = sqlx::query_as::<_, (i32, Decimal)>(
                "SELECT quantidade, valor_unitario FROM receitas WHERE id = $1 FOR UPDATE",
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .inspect_err(|e| tracing::error!("Erro ao ler valores da receita: {}", e))?
            .ok_or(AppError::NaoEncontrado("receita"))?;

            alteracoes.recalcular_total(quantidade, valor_unitario);
        }

        let mut query = consulta_atualizacao(id, &alteracoes);
        let receita = query
            .build_query_as::<Receita>()
            .fetch_optional(&mut *tx)
            .await
            .inspect_err(|e| tracing::error!("Erro ao atualizar receita: {}", e))
            .map_err(mapear_erro_escrita)?
            .ok_or(AppError::NaoEncontrado("receita"))?;

        tx.commit().await?;

        Ok(receita)
    }
}

/// Aplica os filtros de receita. `prefixo` é o alias da tabela com o ponto ("r.") ou vazio.
fn aplicar_filtros(query: &mut QueryBuilder<'_, Postgres>, filtro: &FiltroReceitas, prefixo: &str) {
    if let Some(orgao_id) = filtro.orgao_id {
        query.push(format!(" AND {prefixo}orgao_id = ")).push_bind(orgao_id);
    }
    if let Some(tipo_servico_id) = filtro.tipo_servico_id {
        query.push(format!(" AND {prefixo}tipo_servico_id = ")).push_bind(tipo_servico_id);
    }
    if let Some(usuario_id) = filtro.usuario_id {
        query.push(format!(" AND {prefixo}usuario_registro_id = ")).push_bind(usuario_id);
    }
    // Datas inclusivas: do início do primeiro dia até antes do dia seguinte ao último
    if let Some(inicio) = filtro.data_inicio {
        query
            .push(format!(" AND {prefixo}data_recebimento >= "))
            .push_bind(inicio_do_dia(inicio));
    }
    if let Some(dia_seguinte) = filtro.data_fim.and_then(|fim| fim.succ_opt()) {
        query
            .push(format!(" AND {prefixo}data_recebimento < "))
            .push_bind(inicio_do_dia(dia_seguinte));
    }
}

fn consulta_listagem(filtro: &FiltroReceitas) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(SELECAO_DETALHADA);
    query.push(" WHERE TRUE");
    aplicar_filtros(&mut query, filtro, "r.");
    query.push(" ORDER BY r.data_recebimento DESC");
    query
}

fn consulta_totais(filtro: &FiltroReceitas) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(
        "SELECT COALESCE(SUM(valor_total), 0) AS valor_total, COUNT(*) AS quantidade FROM receitas WHERE TRUE",
    );
    aplicar_filtros(&mut query, filtro, "");
    query
}

fn consulta_atualizacao(id: Uuid, alteracoes: &AtualizaReceita) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("UPDATE receitas SET ");
    {
        let mut campos = query.separated(", ");
        if let Some(orgao_id) = alteracoes.orgao_id {
            campos.push("orgao_id = ").push_bind_unseparated(orgao_id);
        }
        if let Some(tipo_servico_id) = alteracoes.tipo_servico_id {
            campos.push("tipo_servico_id = ").push_bind_unseparated(tipo_servico_id);
        }
        if let Some(quantidade) = alteracoes.quantidade {
            campos.push("quantidade = ").push_bind_unseparated(quantidade);
        }
        if let Some(valor_unitario) = alteracoes.valor_unitario {
            campos.push("valor_unitario = ").push_bind_unseparated(valor_unitario);
        }
        if let Some(valor_total) = alteracoes.valor_total {
            campos.push("valor_total = ").push_bind_unseparated(valor_total);
        }
        if let Some(referencia) = &alteracoes.referencia {
            campos.push("referencia = ").push_bind_unseparated(referencia.clone());
        }
        if let Some(observacoes) = &alteracoes.observacoes {
            campos.push("observacoes = ").push_bind_unseparated(observacoes.clone());
        }
        if let Some(data_recebimento) = alteracoes.data_recebimento {
            campos.push("data_recebimento = ").push_bind_unseparated(data_recebimento);
        }
    }
    query.push(" WHERE id = ").push_bind(id).push(" RETURNING *");
    query
}
