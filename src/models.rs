pub mod auth;
pub mod orgao;
pub mod receita;
pub mod relatorio;
pub mod tipo_servico;
pub mod usuario;
