// src/services/relatorio_service.rs

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ReceitaRepository, RelatorioRepository},
    models::{
        receita::{FiltroReceitas, ReceitaDetalhada},
        relatorio::{
            FiltrosRelatorio, GrupoOrgao, NovoRelatorio, Periodo, PedidoRelatorio, ResultadoRelatorio,
            VERSAO_RESULTADOS,
        },
    },
};

#[derive(Clone)]
pub struct RelatorioService {
    receita_repo: ReceitaRepository,
    relatorio_repo: RelatorioRepository,
}

impl RelatorioService {
    pub fn new(receita_repo: ReceitaRepository, relatorio_repo: RelatorioRepository) -> Self {
        Self { receita_repo, relatorio_repo }
    }

    /// Calcula o relatório, grava o snapshot como um novo registro e devolve
    /// o id gravado junto com o conteúdo.
    pub async fn gerar(
        &self,
        pedido: PedidoRelatorio,
        usuario_id: Uuid,
    ) -> Result<(Uuid, ResultadoRelatorio), AppError> {
        let periodo = validar_periodo(&pedido)?;

        let filtro = FiltroReceitas {
            orgao_id: pedido.orgao_id,
            tipo_servico_id: pedido.tipo_servico_id,
            usuario_id: None,
            data_inicio: Some(periodo.data_inicio),
            data_fim: Some(periodo.data_fim),
        };
        // Os totais consideram só órgão e período, nunca o tipo de serviço
        let filtro_totais = FiltroReceitas { tipo_servico_id: None, ..filtro.clone() };

        let (receitas, totais) = tokio::try_join!(
            self.receita_repo.get_all(&filtro),
            self.receita_repo.obter_totais(&filtro_totais),
        )?;

        let resultado = ResultadoRelatorio {
            versao: VERSAO_RESULTADOS,
            receitas_por_orgao: agrupar_por_orgao(&receitas),
            receitas,
            totais,
            periodo: periodo.clone(),
        };

        let novo = NovoRelatorio {
            titulo: texto_informado(pedido.titulo).unwrap_or_else(|| titulo_padrao(Utc::now())),
            descricao: texto_informado(pedido.descricao)
                .or_else(|| Some(descricao_padrao(periodo.data_inicio, periodo.data_fim))),
            data_inicio: periodo.data_inicio,
            data_fim: periodo.data_fim,
            usuario_id,
            filtros: FiltrosRelatorio { orgao_id: pedido.orgao_id, tipo_servico_id: pedido.tipo_servico_id },
            resultados: resultado,
        };

        let relatorio = self.relatorio_repo.create(&novo).await?;

        Ok((relatorio.id, novo.resultados))
    }
}

fn validar_periodo(pedido: &PedidoRelatorio) -> Result<Periodo, AppError> {
    let (Some(data_inicio), Some(data_fim)) = (pedido.data_inicio, pedido.data_fim) else {
        return Err(AppError::PeriodoObrigatorio);
    };
    if data_inicio > data_fim {
        return Err(AppError::PeriodoInvalido);
    }
    Ok(Periodo { data_inicio, data_fim })
}

/// Agrupa as receitas pelo órgão, somando valor e contagem de cada grupo.
pub fn agrupar_por_orgao(receitas: &[ReceitaDetalhada]) -> BTreeMap<Uuid, GrupoOrgao> {
    let mut grupos: BTreeMap<Uuid, GrupoOrgao> = BTreeMap::new();

    for receita in receitas {
        let grupo = grupos.entry(receita.receita.orgao_id).or_insert_with(|| GrupoOrgao {
            nome: receita.orgao.as_ref().map(|o| o.nome.clone()),
            tipo: receita.orgao.as_ref().map(|o| o.tipo),
            valor_total: Decimal::ZERO,
            quantidade: 0,
            receitas: Vec::new(),
        });
        grupo.valor_total += receita.receita.valor_total;
        grupo.quantidade += 1;
        grupo.receitas.push(receita.clone());
    }

    grupos
}

/// Texto vazio ou só com espaços conta como não informado.
fn texto_informado(texto: Option<String>) -> Option<String> {
    texto.filter(|t| !t.trim().is_empty())
}

pub fn titulo_padrao(gerado_em: DateTime<Utc>) -> String {
    format!("Relatório de Receitas ({})", gerado_em.format("%d/%m/%Y %H:%M"))
}

pub fn descricao_padrao(inicio: NaiveDate, fim: NaiveDate) -> String {
    format!(
        "Relatório de receitas no período de {} a {}",
        inicio.format("%d/%m/%Y"),
        fim.format("%d/%m/%Y")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sqlx::types::Json;

    use crate::models::{
        orgao::{Orgao, TipoOrgao},
        receita::Receita,
    };

    fn d(valor: &str) -> Decimal {
        valor.parse().unwrap()
    }

    fn orgao(nome: &str, tipo: TipoOrgao) -> Orgao {
        Orgao { id: Uuid::new_v4(), nome: nome.into(), tipo, orgao_superior_id: None, ativo: true }
    }

    fn receita(orgao: &Orgao, valor_total: &str) -> ReceitaDetalhada {
        ReceitaDetalhada {
            receita: Receita {
                id: Uuid::new_v4(),
                orgao_id: orgao.id,
                tipo_servico_id: Uuid::new_v4(),
                quantidade: 1,
                valor_unitario: d(valor_total),
                valor_total: d(valor_total),
                referencia: None,
                observacoes: None,
                usuario_registro_id: None,
                data_recebimento: Utc::now(),
            },
            orgao: Some(Json(orgao.clone())),
            tipo_servico: None,
            usuario_registro: None,
        }
    }

    #[test]
    fn duas_receitas_de_dois_orgaos_dao_dois_grupos() {
        let financas = orgao("Direção Municipal de Finanças", TipoOrgao::Municipal);
        let registo = orgao("Conservatória Comunal", TipoOrgao::Comunal);
        let receitas = vec![receita(&financas, "450.00"), receita(&registo, "120.50")];

        let grupos = agrupar_por_orgao(&receitas);

        assert_eq!(grupos.len(), 2);
        let grupo = &grupos[&financas.id];
        assert_eq!(grupo.quantidade, 1);
        assert_eq!(grupo.valor_total, d("450.00"));
        assert_eq!(grupo.nome.as_deref(), Some("Direção Municipal de Finanças"));
        assert_eq!(grupos[&registo.id].tipo, Some(TipoOrgao::Comunal));
    }

    #[test]
    fn grupo_acumula_as_receitas_do_mesmo_orgao() {
        let financas = orgao("Finanças", TipoOrgao::Provincial);
        let receitas = vec![receita(&financas, "10.00"), receita(&financas, "5.25")];

        let grupos = agrupar_por_orgao(&receitas);

        let grupo = &grupos[&financas.id];
        assert_eq!(grupo.quantidade, 2);
        assert_eq!(grupo.valor_total, d("15.25"));
        assert_eq!(grupo.receitas.len(), 2);
    }

    #[test]
    fn sem_receitas_nao_ha_grupos() {
        assert!(agrupar_por_orgao(&[]).is_empty());
    }

    #[test]
    fn periodo_e_obrigatorio_e_ordenado() {
        let mut pedido = PedidoRelatorio {
            data_inicio: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..Default::default()
        };
        assert!(matches!(validar_periodo(&pedido), Err(AppError::PeriodoObrigatorio)));

        pedido.data_fim = NaiveDate::from_ymd_opt(2024, 2, 1);
        assert!(matches!(validar_periodo(&pedido), Err(AppError::PeriodoInvalido)));

        pedido.data_fim = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert!(validar_periodo(&pedido).is_ok());
    }

    #[test]
    fn titulo_e_descricao_em_branco_ficam_com_o_padrao() {
        assert_eq!(texto_informado(Some(String::new())), None);
        assert_eq!(texto_informado(Some("   ".into())), None);
        assert_eq!(texto_informado(None), None);
        assert_eq!(texto_informado(Some("Março".into())).as_deref(), Some("Março"));
    }

    #[test]
    fn textos_padrao_usam_datas_no_formato_local() {
        let gerado_em = Utc.with_ymd_and_hms(2024, 4, 2, 9, 5, 0).unwrap();
        assert_eq!(titulo_padrao(gerado_em), "Relatório de Receitas (02/04/2024 09:05)");

        let inicio = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let fim = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(
            descricao_padrao(inicio, fim),
            "Relatório de receitas no período de 01/03/2024 a 31/03/2024"
        );
    }
}
