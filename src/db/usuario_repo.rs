// src/db/usuario_repo.rs

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::mapear_erro_escrita, digest::digest_senha, error::AppError},
    models::usuario::{AtualizaUsuario, FiltroUsuarios, NovoUsuario, Usuario, UsuarioDetalhado},
};

// Usuário com o órgão embutido como JSON
const SELECAO_DETALHADA: &str = r#"
    SELECT u.*, to_jsonb(o) AS orgao
    FROM usuarios u
    LEFT JOIN orgaos o ON o.id = u.orgao_id
"#;

// O repositório de usuários, responsável por todas as interações com a tabela 'usuarios'
#[derive(Clone)]
pub struct UsuarioRepository {
    pool: PgPool,
}

impl UsuarioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_all(&self, filtro: &FiltroUsuarios) -> Result<Vec<UsuarioDetalhado>, AppError> {
        let mut query = consulta_listagem(filtro);
        let usuarios = query
            .build_query_as::<UsuarioDetalhado>()
            .fetch_all(&self.pool)
            .await
            .inspect_err(|e| tracing::error!("Erro ao buscar usuários: {}", e))?;

        Ok(usuarios)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UsuarioDetalhado, AppError> {
        let sql = format!("{SELECAO_DETALHADA} WHERE u.id = $1");
        sqlx::query_as::<_, UsuarioDetalhado>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .inspect_err(|e| tracing::error!("Erro ao buscar usuário por ID: {}", e))?
            .ok_or(AppError::NaoEncontrado("usuario"))
    }

    pub async fn contar(&self) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM usuarios")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    // A senha chega em texto claro e só o digest é gravado
    pub async fn create(&self, novo: &NovoUsuario) -> Result<Usuario, AppError> {
        let usuario = sqlx::query_as::<_, Usuario>(
            r#"
            INSERT INTO usuarios (nome, email, senha_hash, nivel_acesso, orgao_id, ativo)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, TRUE))
            RETURNING *
            "#,
        )
        .bind(&novo.nome)
        .bind(&novo.email)
        .bind(digest_senha(&novo.senha))
        .bind(novo.nivel_acesso)
        .bind(novo.orgao_id)
        .bind(novo.ativo)
        .fetch_one(&self.pool)
        .await
        .inspect_err(|e| tracing::error!("Erro ao criar usuário: {}", e))
        .map_err(mapear_erro_escrita)?;

        tracing::info!("👤 Usuário '{}' criado ({:?})", usuario.email, usuario.nivel_acesso);
        Ok(usuario)
    }

    pub async fn update(&self, id: Uuid, alteracoes: &AtualizaUsuario) -> Result<Usuario, AppError> {
        if alteracoes.is_empty() {
            return Ok(self.get_by_id(id).await?.usuario);
        }

        let mut query = consulta_atualizacao(id, alteracoes);
        query
            .build_query_as::<Usuario>()
            .fetch_optional(&self.pool)
            .await
            .inspect_err(|e| tracing::error!("Erro ao atualizar usuário: {}", e))
            .map_err(mapear_erro_escrita)?
            .ok_or(AppError::NaoEncontrado("usuario"))
    }

    /// Procura um usuário ativo com esse e-mail e esse digest de senha.
    /// E-mail inexistente, senha errada e usuário inativo dão o mesmo erro.
    pub async fn autenticar(&self, email: &str, senha: &str) -> Result<UsuarioDetalhado, AppError> {
        let sql = format!(
            "{SELECAO_DETALHADA} WHERE u.email = $1 AND u.senha_hash = $2 AND u.ativo = TRUE"
        );
        let usuario = sqlx::query_as::<_, UsuarioDetalhado>(&sql)
            .bind(email)
            .bind(digest_senha(senha))
            .fetch_optional(&self.pool)
            .await
            .inspect_err(|e| tracing::error!("Erro ao autenticar usuário: {}", e))?
            .ok_or(AppError::InvalidCredentials)?;

        self.registrar_acesso(usuario.usuario.id);

        Ok(usuario)
    }

    // Não atrasa nem derruba o login se falhar
    fn registrar_acesso(&self, id: Uuid) {
        let pool = self.pool.clone();
        tokio::spawn(async move {
            if let Err(e) = sqlx::query("UPDATE usuarios SET ultimo_acesso = NOW() WHERE id = $1")
                .bind(id)
                .execute(&pool)
                .await
            {
                tracing::warn!("Falha ao registrar último acesso do usuário {}: {}", id, e);
            }
        });
    }
}

fn consulta_listagem(filtro: &FiltroUsuarios) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(SELECAO_DETALHADA);
    query.push(" WHERE TRUE");

    if filtro.apenas_ativos {
        query.push(" AND u.ativo = TRUE");
    }
    if let Some(nivel) = filtro.nivel_acesso {
        query.push(" AND u.nivel_acesso = ").push_bind(nivel);
    }
    if let Some(orgao_id) = filtro.orgao_id {
        query.push(" AND u.orgao_id = ").push_bind(orgao_id);
    }

    query.push(" ORDER BY u.nome ASC");
    query
}

fn consulta_atualizacao(id: Uuid, alteracoes: &AtualizaUsuario) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("UPDATE usuarios SET ");
    {
        let mut campos = query.separated(", ");
        if let Some(nome) = &alteracoes.nome {
            campos.push("nome = ").push_bind_unseparated(nome.clone());
        }
        if let Some(email) = &alteracoes.email {
            campos.push("email = ").push_bind_unseparated(email.clone());
        }
        if let Some(senha) = alteracoes.nova_senha() {
            campos.push("senha_hash = ").push_bind_unseparated(digest_senha(senha));
        }
        if let Some(nivel) = alteracoes.nivel_acesso {
            campos.push("nivel_acesso = ").push_bind_unseparated(nivel);
        }
        if let Some(orgao_id) = alteracoes.orgao_id {
            campos.push("orgao_id = ").push_bind_unseparated(orgao_id);
        }
        if let Some(ativo) = alteracoes.ativo {
            campos.push("ativo = ").push_bind_unseparated(ativo);
        }
    }
    query.push(" WHERE id = ").push_bind(id).push(" RETURNING *");
    query
}
