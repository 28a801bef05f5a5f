pub mod auth;
pub mod orgaos;
pub mod receitas;
pub mod relatorios;
pub mod tipos_servicos;
pub mod usuarios;
