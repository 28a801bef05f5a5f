pub mod orgao_repo;
pub use orgao_repo::OrgaoRepository;
pub mod usuario_repo;
pub use usuario_repo::UsuarioRepository;
pub mod tipo_servico_repo;
pub use tipo_servico_repo::TipoServicoRepository;
pub mod receita_repo;
pub use receita_repo::ReceitaRepository;
pub mod relatorio_repo;
pub use relatorio_repo::RelatorioRepository;
