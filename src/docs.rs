// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::me,

        // --- Órgãos ---
        handlers::orgaos::listar_orgaos,
        handlers::orgaos::obter_orgao,
        handlers::orgaos::criar_orgao,
        handlers::orgaos::atualizar_orgao,

        // --- Usuários ---
        handlers::usuarios::listar_usuarios,
        handlers::usuarios::obter_usuario,
        handlers::usuarios::criar_usuario,
        handlers::usuarios::atualizar_usuario,

        // --- Tipos de Serviço ---
        handlers::tipos_servicos::listar_tipos_servicos,
        handlers::tipos_servicos::listar_categorias,
        handlers::tipos_servicos::obter_tipo_servico,
        handlers::tipos_servicos::criar_tipo_servico,
        handlers::tipos_servicos::atualizar_tipo_servico,

        // --- Receitas ---
        handlers::receitas::listar_receitas,
        handlers::receitas::obter_totais,
        handlers::receitas::obter_receita,
        handlers::receitas::criar_receita,
        handlers::receitas::atualizar_receita,

        // --- Relatórios ---
        handlers::relatorios::gerar_relatorio,
        handlers::relatorios::listar_relatorios,
        handlers::relatorios::obter_relatorio,
        handlers::relatorios::atualizar_relatorio,
        handlers::relatorios::exportar_relatorio_pdf,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::LoginUsuarioPayload,
            models::auth::SessaoUsuario,
            models::auth::AuthResponse,

            // --- Órgãos ---
            models::orgao::TipoOrgao,
            models::orgao::Orgao,
            models::orgao::NovoOrgao,
            models::orgao::AtualizaOrgao,

            // --- Usuários ---
            models::usuario::NivelAcesso,
            models::usuario::Usuario,
            models::usuario::UsuarioDetalhado,
            models::usuario::UsuarioResumo,
            models::usuario::NovoUsuario,
            models::usuario::AtualizaUsuario,

            // --- Tipos de Serviço ---
            models::tipo_servico::TipoServico,
            models::tipo_servico::NovoTipoServico,
            models::tipo_servico::AtualizaTipoServico,

            // --- Receitas ---
            models::receita::Receita,
            models::receita::ReceitaDetalhada,
            models::receita::NovaReceita,
            models::receita::AtualizaReceita,
            models::receita::Totais,

            // --- Relatórios ---
            models::relatorio::Periodo,
            models::relatorio::GrupoOrgao,
            models::relatorio::ResultadoRelatorio,
            models::relatorio::FiltrosRelatorio,
            models::relatorio::Relatorio,
            models::relatorio::RelatorioDetalhado,
            models::relatorio::PedidoRelatorio,
            models::relatorio::AtualizaRelatorio,
        )
    ),
    tags(
        (name = "Auth", description = "Login e sessão"),
        (name = "Órgãos", description = "Órgãos emissores (provinciais, municipais e comunais)"),
        (name = "Usuários", description = "Contas da equipe e níveis de acesso"),
        (name = "Tipos de Serviço", description = "Serviços cobrados, agrupados por categoria"),
        (name = "Receitas", description = "Registro de receitas"),
        (name = "Relatórios", description = "Relatórios por período, salvos como snapshot")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
