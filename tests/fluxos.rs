// Fluxos completos contra um Postgres de verdade.
// Rodar com DATABASE_URL definida: `cargo test -- --ignored`

use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use receitas_municipais::{
    common::error::AppError,
    db::{OrgaoRepository, ReceitaRepository, RelatorioRepository, TipoServicoRepository, UsuarioRepository},
    models::{
        orgao::{AtualizaOrgao, FiltroOrgaos, NovoOrgao, Orgao, TipoOrgao},
        receita::{AtualizaReceita, FiltroReceitas, NovaReceita},
        relatorio::PedidoRelatorio,
        tipo_servico::{NovoTipoServico, TipoServico},
        usuario::{AtualizaUsuario, NivelAcesso, NovoUsuario, Usuario},
    },
    services::relatorio_service::{descricao_padrao, RelatorioService},
};

fn d(valor: &str) -> Decimal {
    valor.parse().unwrap()
}

async fn criar_orgao(pool: &PgPool, nome: &str) -> Orgao {
    OrgaoRepository::new(pool.clone())
        .create(&NovoOrgao {
            nome: nome.into(),
            tipo: TipoOrgao::Municipal,
            orgao_superior_id: None,
            ativo: None,
        })
        .await
        .unwrap()
}

async fn criar_tipo(pool: &PgPool, nome: &str, categoria: &str) -> TipoServico {
    TipoServicoRepository::new(pool.clone())
        .create(&NovoTipoServico {
            nome: nome.into(),
            descricao: None,
            categoria: categoria.into(),
            ativo: None,
        })
        .await
        .unwrap()
}

async fn criar_usuario(pool: &PgPool, email: &str, senha: &str) -> Usuario {
    UsuarioRepository::new(pool.clone())
        .create(&NovoUsuario {
            nome: "Operadora".into(),
            email: email.into(),
            senha: senha.into(),
            nivel_acesso: NivelAcesso::Gestor,
            orgao_id: None,
            ativo: None,
        })
        .await
        .unwrap()
}

fn nova_receita(orgao: &Orgao, tipo: &TipoServico, quantidade: i32, valor_unitario: &str) -> NovaReceita {
    NovaReceita {
        orgao_id: orgao.id,
        tipo_servico_id: tipo.id,
        quantidade,
        valor_unitario: d(valor_unitario),
        valor_total: None,
        referencia: None,
        observacoes: None,
        data_recebimento: Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn orgao_desativado_sai_da_listagem_padrao(pool: PgPool) {
    let repo = OrgaoRepository::new(pool.clone());
    let orgao = criar_orgao(&pool, "Direção X").await;

    let ativos = repo.get_all(&FiltroOrgaos::default()).await.unwrap();
    assert!(ativos.iter().any(|o| o.id == orgao.id));

    let alteracoes = AtualizaOrgao { ativo: Some(false), ..Default::default() };
    let desativado = repo.update(orgao.id, &alteracoes).await.unwrap();
    assert!(!desativado.ativo);

    let ativos = repo.get_all(&FiltroOrgaos::default()).await.unwrap();
    assert!(ativos.iter().all(|o| o.id != orgao.id));

    let todos = repo
        .get_all(&FiltroOrgaos { apenas_ativos: false, tipo: None })
        .await
        .unwrap();
    assert!(todos.iter().any(|o| o.id == orgao.id));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn orgao_nao_pode_ficar_abaixo_de_um_descendente(pool: PgPool) {
    let repo = OrgaoRepository::new(pool.clone());
    let provincia = criar_orgao(&pool, "Governo Provincial").await;
    let municipio = criar_orgao(&pool, "Administração Municipal").await;

    let abaixo_da_provincia = AtualizaOrgao { orgao_superior_id: Some(Some(provincia.id)), ..Default::default() };
    repo.update(municipio.id, &abaixo_da_provincia).await.unwrap();

    let ciclo = AtualizaOrgao { orgao_superior_id: Some(Some(municipio.id)), ..Default::default() };
    let erro = repo.update(provincia.id, &ciclo).await.unwrap_err();
    assert!(matches!(erro, AppError::HierarquiaCiclica));

    let proprio = AtualizaOrgao { orgao_superior_id: Some(Some(provincia.id)), ..Default::default() };
    let erro = repo.update(provincia.id, &proprio).await.unwrap_err();
    assert!(matches!(erro, AppError::HierarquiaCiclica));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn mudancas_cruzadas_de_hierarquia_nao_formam_ciclo(pool: PgPool) {
    let repo = OrgaoRepository::new(pool.clone());
    let provincia = criar_orgao(&pool, "Governo Provincial").await;
    let municipio = criar_orgao(&pool, "Administração Municipal").await;

    let abaixo_da_provincia = AtualizaOrgao { orgao_superior_id: Some(Some(provincia.id)), ..Default::default() };
    let abaixo_do_municipio = AtualizaOrgao { orgao_superior_id: Some(Some(municipio.id)), ..Default::default() };

    // As duas mudanças ao mesmo tempo: só uma pode passar
    let (a, b) = tokio::join!(
        repo.update(municipio.id, &abaixo_da_provincia),
        repo.update(provincia.id, &abaixo_do_municipio),
    );
    let ciclos = [&a, &b]
        .iter()
        .filter(|r| matches!(r, Err(AppError::HierarquiaCiclica)))
        .count();
    assert_eq!(ciclos, 1);
    assert!(a.is_ok() || b.is_ok());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn receita_calcula_e_recalcula_o_total(pool: PgPool) {
    let repo = ReceitaRepository::new(pool.clone());
    let orgao = criar_orgao(&pool, "Finanças").await;
    let tipo = criar_tipo(&pool, "Emissão de Licença", "Licenças").await;
    let usuario = criar_usuario(&pool, "op@municipio.gov", "segredo1").await;

    let receita = repo
        .create(&nova_receita(&orgao, &tipo, 3, "150.00"), usuario.id)
        .await
        .unwrap();
    assert_eq!(receita.valor_total, d("450.00"));
    assert_eq!(receita.usuario_registro_id, Some(usuario.id));

    // Só a quantidade muda: o valor unitário gravado entra no cálculo
    let atualizada = repo
        .update(receita.id, AtualizaReceita { quantidade: Some(5), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(atualizada.valor_total, d("750.00"));

    // Total explícito prevalece
    let atualizada = repo
        .update(
            receita.id,
            AtualizaReceita { valor_unitario: Some(d("10")), valor_total: Some(d("1.00")), ..Default::default() },
        )
        .await
        .unwrap();
    assert_eq!(atualizada.valor_total, d("1.00"));

    let detalhada = repo.get_by_id(receita.id).await.unwrap();
    assert_eq!(detalhada.orgao.as_ref().map(|o| o.nome.as_str()), Some("Finanças"));
    assert_eq!(detalhada.usuario_registro.as_ref().map(|u| u.id), Some(usuario.id));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn receita_com_mais_de_duas_casas_grava_total_coerente(pool: PgPool) {
    let repo = ReceitaRepository::new(pool.clone());
    let orgao = criar_orgao(&pool, "Finanças").await;
    let tipo = criar_tipo(&pool, "Emissão de Licença", "Licenças").await;
    let usuario = criar_usuario(&pool, "op@municipio.gov", "segredo1").await;

    let receita = repo
        .create(&nova_receita(&orgao, &tipo, 3, "0.333"), usuario.id)
        .await
        .unwrap();
    assert_eq!(receita.valor_unitario, d("0.33"));
    assert_eq!(receita.valor_total, d("0.99"));
    assert_eq!(receita.valor_total, Decimal::from(receita.quantidade) * receita.valor_unitario);

    let atualizada = repo
        .update(receita.id, AtualizaReceita { valor_unitario: Some(d("0.125")), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(atualizada.valor_unitario, d("0.13"));
    assert_eq!(atualizada.valor_total, d("0.39"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn recalculo_do_total_espera_escrita_concorrente(pool: PgPool) {
    let repo = ReceitaRepository::new(pool.clone());
    let orgao = criar_orgao(&pool, "Finanças").await;
    let tipo = criar_tipo(&pool, "Emissão de Licença", "Licenças").await;
    let usuario = criar_usuario(&pool, "op@municipio.gov", "segredo1").await;
    let receita = repo
        .create(&nova_receita(&orgao, &tipo, 3, "150.00"), usuario.id)
        .await
        .unwrap();

    // Outra sessão troca o valor unitário e só confirma depois
    let mut outra = pool.begin().await.unwrap();
    sqlx::query("UPDATE receitas SET valor_unitario = 10, valor_total = 30 WHERE id = $1")
        .bind(receita.id)
        .execute(&mut *outra)
        .await
        .unwrap();

    let tarefa = tokio::spawn({
        let repo = repo.clone();
        let id = receita.id;
        async move { repo.update(id, AtualizaReceita { quantidade: Some(5), ..Default::default() }).await }
    });
    tokio::time::sleep(Duration::from_millis(200)).await;
    outra.commit().await.unwrap();

    let atualizada = tarefa.await.unwrap().unwrap();
    assert_eq!(atualizada.quantidade, 5);
    assert_eq!(atualizada.valor_unitario, d("10.00"));
    assert_eq!(atualizada.valor_total, d("50.00"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn receita_inexistente_e_nao_encontrada(pool: PgPool) {
    let repo = ReceitaRepository::new(pool);
    let erro = repo
        .update(Uuid::new_v4(), AtualizaReceita { quantidade: Some(2), ..Default::default() })
        .await
        .unwrap_err();
    assert!(matches!(erro, AppError::NaoEncontrado("receita")));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn autenticacao_nao_distingue_email_de_senha(pool: PgPool) {
    let repo = UsuarioRepository::new(pool.clone());
    let usuario = criar_usuario(&pool, "ana@municipio.gov", "segredo1").await;
    assert_ne!(usuario.senha_hash, "segredo1");

    let ok = repo.autenticar("ana@municipio.gov", "segredo1").await.unwrap();
    assert_eq!(ok.usuario.id, usuario.id);

    let senha_errada = repo.autenticar("ana@municipio.gov", "outra").await.unwrap_err();
    let email_errado = repo.autenticar("ninguem@municipio.gov", "segredo1").await.unwrap_err();
    assert!(matches!(senha_errada, AppError::InvalidCredentials));
    assert!(matches!(email_errado, AppError::InvalidCredentials));
    assert_eq!(senha_errada.to_string(), email_errado.to_string());

    // Inativo não entra, mesmo com a senha certa
    repo.update(usuario.id, &AtualizaUsuario { ativo: Some(false), ..Default::default() })
        .await
        .unwrap();
    let inativo = repo.autenticar("ana@municipio.gov", "segredo1").await.unwrap_err();
    assert!(matches!(inativo, AppError::InvalidCredentials));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn senha_so_muda_quando_informada(pool: PgPool) {
    let repo = UsuarioRepository::new(pool.clone());
    let usuario = criar_usuario(&pool, "rui@municipio.gov", "segredo1").await;

    repo.update(usuario.id, &AtualizaUsuario { nome: Some("Rui".into()), ..Default::default() })
        .await
        .unwrap();
    assert!(repo.autenticar("rui@municipio.gov", "segredo1").await.is_ok());

    repo.update(usuario.id, &AtualizaUsuario { senha: Some(String::new()), ..Default::default() })
        .await
        .unwrap();
    assert!(repo.autenticar("rui@municipio.gov", "segredo1").await.is_ok());

    repo.update(usuario.id, &AtualizaUsuario { senha: Some("nova-senha".into()), ..Default::default() })
        .await
        .unwrap();
    let antiga = repo.autenticar("rui@municipio.gov", "segredo1").await.unwrap_err();
    assert!(matches!(antiga, AppError::InvalidCredentials));
    let nova = repo.autenticar("rui@municipio.gov", "nova-senha").await.unwrap();
    assert_eq!(nova.usuario.id, usuario.id);
    assert_eq!(nova.usuario.nome, "Rui");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn email_duplicado_e_conflito(pool: PgPool) {
    criar_usuario(&pool, "dup@municipio.gov", "segredo1").await;
    let erro = UsuarioRepository::new(pool)
        .create(&NovoUsuario {
            nome: "Outra".into(),
            email: "dup@municipio.gov".into(),
            senha: "segredo2".into(),
            nivel_acesso: NivelAcesso::Operador,
            orgao_id: None,
            ativo: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(erro, AppError::EmailJaCadastrado));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn relatorio_agrupa_por_orgao_e_fica_congelado(pool: PgPool) {
    let receitas = ReceitaRepository::new(pool.clone());
    let relatorios = RelatorioRepository::new(pool.clone());
    let servico = RelatorioService::new(receitas.clone(), relatorios.clone());

    let financas = criar_orgao(&pool, "Finanças").await;
    let registo = criar_orgao(&pool, "Registo Civil").await;
    let tipo = criar_tipo(&pool, "Emissão de Licença", "Licenças").await;
    let usuario = criar_usuario(&pool, "gestora@municipio.gov", "segredo1").await;

    let r1 = receitas.create(&nova_receita(&financas, &tipo, 3, "150.00"), usuario.id).await.unwrap();
    receitas.create(&nova_receita(&registo, &tipo, 1, "120.50"), usuario.id).await.unwrap();

    let pedido = PedidoRelatorio {
        data_inicio: NaiveDate::from_ymd_opt(2024, 1, 1),
        data_fim: NaiveDate::from_ymd_opt(2024, 1, 31),
        ..Default::default()
    };
    let (id, resultado) = servico.gerar(pedido, usuario.id).await.unwrap();

    assert_eq!(resultado.receitas_por_orgao.len(), 2);
    assert_eq!(resultado.receitas_por_orgao[&financas.id].quantidade, 1);
    assert_eq!(resultado.receitas_por_orgao[&registo.id].quantidade, 1);
    assert_eq!(resultado.totais.quantidade, 2);
    assert_eq!(resultado.totais.valor_total, d("570.50"));

    // Mudar a receita depois não altera o relatório salvo
    receitas
        .update(r1.id, AtualizaReceita { quantidade: Some(10), ..Default::default() })
        .await
        .unwrap();

    let salvo = relatorios.get_by_id(id).await.unwrap();
    let snapshot = &salvo.relatorio.resultados;
    assert_eq!(snapshot.totais, resultado.totais);
    assert_eq!(snapshot.receitas_por_orgao[&financas.id].valor_total, d("450.00"));
    assert!(salvo.relatorio.titulo.starts_with("Relatório de Receitas ("));
    assert_eq!(salvo.usuario.as_ref().map(|u| u.id), Some(usuario.id));

    let agora = receitas
        .obter_totais(&FiltroReceitas { orgao_id: Some(financas.id), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(agora.valor_total, d("1500.00"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn totais_do_relatorio_ignoram_o_tipo_de_servico(pool: PgPool) {
    let receitas = ReceitaRepository::new(pool.clone());
    let relatorios = RelatorioRepository::new(pool.clone());
    let servico = RelatorioService::new(receitas.clone(), relatorios.clone());

    let financas = criar_orgao(&pool, "Finanças").await;
    let licenca = criar_tipo(&pool, "Emissão de Licença", "Licenças").await;
    let certidao = criar_tipo(&pool, "Certidão de Nascimento", "Registos").await;
    let usuario = criar_usuario(&pool, "gestora@municipio.gov", "segredo1").await;

    receitas.create(&nova_receita(&financas, &licenca, 3, "150.00"), usuario.id).await.unwrap();
    receitas.create(&nova_receita(&financas, &certidao, 2, "25.00"), usuario.id).await.unwrap();

    let inicio = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let fim = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    let pedido = PedidoRelatorio {
        tipo_servico_id: Some(licenca.id),
        descricao: Some("   ".into()),
        data_inicio: Some(inicio),
        data_fim: Some(fim),
        ..Default::default()
    };
    let (id, resultado) = servico.gerar(pedido, usuario.id).await.unwrap();

    // Listagem e grupos respeitam o tipo de serviço
    assert_eq!(resultado.receitas.len(), 1);
    assert!(resultado.receitas.iter().all(|r| r.receita.tipo_servico_id == licenca.id));
    let grupo = &resultado.receitas_por_orgao[&financas.id];
    assert_eq!(grupo.quantidade, 1);
    assert_eq!(grupo.valor_total, d("450.00"));

    // Os totais cobrem órgão e período, com os dois tipos
    assert_eq!(resultado.totais.quantidade, 2);
    assert_eq!(resultado.totais.valor_total, d("500.00"));

    let salvo = relatorios.get_by_id(id).await.unwrap();
    assert_eq!(salvo.relatorio.filtros.tipo_servico_id, Some(licenca.id));
    assert_eq!(salvo.relatorio.descricao, Some(descricao_padrao(inicio, fim)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn relatorio_sem_periodo_e_rejeitado(pool: PgPool) {
    let servico = RelatorioService::new(ReceitaRepository::new(pool.clone()), RelatorioRepository::new(pool));
    let erro = servico.gerar(PedidoRelatorio::default(), Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(erro, AppError::PeriodoObrigatorio));
}
