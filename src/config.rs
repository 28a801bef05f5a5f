// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{sync::Arc, time::Duration};

use crate::{
    common::i18n::I18nStore,
    db::{OrgaoRepository, ReceitaRepository, RelatorioRepository, TipoServicoRepository, UsuarioRepository},
    services::{auth::AuthService, document_service::DocumentService, relatorio_service::RelatorioService},
};

/// Dados do primeiro administrador, criado quando ainda não há usuários.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminInicial {
    pub nome: String,
    pub email: String,
    pub senha: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub jwt_expiration_hours: i64,
    pub fonts_dir: String,
    pub admin_inicial: Option<AdminInicial>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|chave| std::env::var(chave).ok())
    }

    /// Lê a configuração de uma fonte qualquer de variáveis (o ambiente, nos binários).
    pub fn from_lookup<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let db_max_connections = match var("DB_MAX_CONNECTIONS") {
            Some(v) => v.parse().context("DB_MAX_CONNECTIONS deve ser um número")?,
            None => 5,
        };
        let jwt_expiration_hours = match var("JWT_EXPIRATION_HOURS") {
            Some(v) => v.parse().context("JWT_EXPIRATION_HOURS deve ser um número")?,
            None => 8,
        };

        let admin_inicial = match (var("ADMIN_EMAIL"), var("ADMIN_PASSWORD")) {
            (Some(email), Some(senha)) => Some(AdminInicial {
                nome: var("ADMIN_NAME").unwrap_or_else(|| "Administrador".to_string()),
                email,
                senha,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_max_connections,
            jwt_expiration_hours,
            fonts_dir: var("FONTS_DIR").unwrap_or_else(|| "./fonts".to_string()),
            admin_inicial,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,

    pub orgao_repo: OrgaoRepository,
    pub usuario_repo: UsuarioRepository,
    pub tipo_servico_repo: TipoServicoRepository,
    pub receita_repo: ReceitaRepository,
    pub relatorio_repo: RelatorioRepository,

    pub auth_service: AuthService,
    pub relatorio_service: RelatorioService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::from_pool(db_pool, config)
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_pool(db_pool: PgPool, config: &Config) -> anyhow::Result<Self> {
        let i18n_store = Arc::new(I18nStore::carregar()?);

        let orgao_repo = OrgaoRepository::new(db_pool.clone());
        let usuario_repo = UsuarioRepository::new(db_pool.clone());
        let tipo_servico_repo = TipoServicoRepository::new(db_pool.clone());
        let receita_repo = ReceitaRepository::new(db_pool.clone());
        let relatorio_repo = RelatorioRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            usuario_repo.clone(),
            config.jwt_secret.clone(),
            config.jwt_expiration_hours,
        );
        let relatorio_service = RelatorioService::new(receita_repo.clone(), relatorio_repo.clone());
        let document_service = DocumentService::new(relatorio_repo.clone(), config.fonts_dir.clone());

        Ok(Self {
            db_pool,
            i18n_store,
            orgao_repo,
            usuario_repo,
            tipo_servico_repo,
            receita_repo,
            relatorio_repo,
            auth_service,
            relatorio_service,
            document_service,
        })
    }
}
