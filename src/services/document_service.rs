// src/services/document_service.rs

use genpdf::{elements, style, Element};
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RelatorioRepository,
    models::{
        receita::CASAS_DECIMAIS,
        relatorio::{RelatorioDetalhado, ResultadoRelatorio},
    },
};

#[derive(Clone)]
pub struct DocumentService {
    relatorio_repo: RelatorioRepository,
    fonts_dir: String,
}

impl DocumentService {
    pub fn new(relatorio_repo: RelatorioRepository, fonts_dir: String) -> Self {
        Self { relatorio_repo, fonts_dir }
    }

    /// PDF de um relatório salvo, montado só a partir do snapshot gravado.
    pub async fn gerar_pdf_relatorio(&self, relatorio_id: Uuid) -> Result<Vec<u8>, AppError> {
        let relatorio = self.relatorio_repo.get_by_id(relatorio_id).await?;
        self.renderizar(&relatorio)
    }

    fn renderizar(&self, detalhado: &RelatorioDetalhado) -> Result<Vec<u8>, AppError> {
        let relatorio = &detalhado.relatorio;
        let resultado: &ResultadoRelatorio = &relatorio.resultados;

        // Carrega a fonte da pasta configurada
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, "Roboto", None).map_err(|_| {
            AppError::FonteNaoEncontrada(format!("Fonte Roboto não encontrada em {}", self.fonts_dir))
        })?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(relatorio.titulo.clone());
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        doc.push(
            elements::Paragraph::new(relatorio.titulo.clone())
                .styled(style::Style::new().bold().with_font_size(16)),
        );
        if let Some(descricao) = &relatorio.descricao {
            doc.push(elements::Paragraph::new(descricao.clone()).styled(style::Style::new().with_font_size(10)));
        }
        doc.push(elements::Paragraph::new(format!(
            "Período: {} a {}",
            resultado.periodo.data_inicio.format("%d/%m/%Y"),
            resultado.periodo.data_fim.format("%d/%m/%Y")
        )));
        doc.push(elements::Paragraph::new(format!(
            "Gerado em: {}",
            relatorio.data_geracao.format("%d/%m/%Y %H:%M")
        )));
        if let Some(usuario) = &detalhado.usuario {
            doc.push(elements::Paragraph::new(format!("Por: {}", usuario.nome)));
        }

        doc.push(elements::Break::new(1.5));

        // --- RESUMO POR ÓRGÃO ---
        let style_bold = style::Style::new().bold();
        doc.push(elements::Paragraph::new("RECEITAS POR ÓRGÃO").styled(style_bold.with_font_size(12)));

        let mut resumo = elements::TableLayout::new(vec![5, 2, 1, 3]);
        resumo.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
        resumo
            .row()
            .element(elements::Paragraph::new("Órgão").styled(style_bold))
            .element(elements::Paragraph::new("Tipo").styled(style_bold))
            .element(elements::Paragraph::new("Qtd").styled(style_bold))
            .element(elements::Paragraph::new("Valor").styled(style_bold))
            .push()
            .map_err(erro_pdf)?;

        for grupo in resultado.receitas_por_orgao.values() {
            resumo
                .row()
                .element(elements::Paragraph::new(grupo.nome.clone().unwrap_or_else(|| "-".into())))
                .element(elements::Paragraph::new(
                    grupo.tipo.map(|t| format!("{t:?}")).unwrap_or_else(|| "-".into()),
                ))
                .element(elements::Paragraph::new(grupo.quantidade.to_string()))
                .element(elements::Paragraph::new(formatar_kwanza(grupo.valor_total)))
                .push()
                .map_err(erro_pdf)?;
        }
        doc.push(resumo);
        doc.push(elements::Break::new(1.5));

        // --- RECEITAS ---
        doc.push(elements::Paragraph::new("RECEITAS").styled(style_bold.with_font_size(12)));

        // Pesos das colunas: Data (2), Órgão (4), Serviço (4), Qtd (1), Unitário (2), Total (2)
        let mut tabela = elements::TableLayout::new(vec![2, 4, 4, 1, 2, 2]);
        tabela.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
        tabela
            .row()
            .element(elements::Paragraph::new("Data").styled(style_bold))
            .element(elements::Paragraph::new("Órgão").styled(style_bold))
            .element(elements::Paragraph::new("Serviço").styled(style_bold))
            .element(elements::Paragraph::new("Qtd").styled(style_bold))
            .element(elements::Paragraph::new("Unitário").styled(style_bold))
            .element(elements::Paragraph::new("Total").styled(style_bold))
            .push()
            .map_err(erro_pdf)?;

        for item in &resultado.receitas {
            let receita = &item.receita;
            tabela
                .row()
                .element(elements::Paragraph::new(receita.data_recebimento.format("%d/%m/%Y").to_string()))
                .element(elements::Paragraph::new(
                    item.orgao.as_ref().map(|o| o.nome.clone()).unwrap_or_default(),
                ))
                .element(elements::Paragraph::new(
                    item.tipo_servico.as_ref().map(|t| t.nome.clone()).unwrap_or_default(),
                ))
                .element(elements::Paragraph::new(receita.quantidade.to_string()))
                .element(elements::Paragraph::new(formatar_kwanza(receita.valor_unitario)))
                .element(elements::Paragraph::new(formatar_kwanza(receita.valor_total)))
                .push()
                .map_err(erro_pdf)?;
        }
        doc.push(tabela);
        doc.push(elements::Break::new(2));

        // --- TOTAIS ---
        let mut total_paragraph = elements::Paragraph::new(format!(
            "TOTAL: {} ({} receitas)",
            formatar_kwanza(resultado.totais.valor_total),
            resultado.totais.quantidade
        ));
        total_paragraph.set_alignment(genpdf::Alignment::Right);
        doc.push(total_paragraph.styled(style::Style::new().bold().with_font_size(12)));

        // Renderiza para Buffer (Memória)
        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(erro_pdf)?;

        Ok(buffer)
    }
}

fn erro_pdf(e: genpdf::error::Error) -> AppError {
    AppError::Pdf(e.to_string())
}

/// Valor em kwanzas no formato local: `1.234,56 Kz`.
pub fn formatar_kwanza(valor: Decimal) -> String {
    let arredondado = valor
        .abs()
        .round_dp_with_strategy(CASAS_DECIMAIS, RoundingStrategy::MidpointAwayFromZero);
    let texto = format!("{arredondado:.2}");
    let (inteiro, centavos) = texto.split_once('.').unwrap_or((texto.as_str(), "00"));

    let digitos: Vec<char> = inteiro.chars().collect();
    let mut agrupado = String::new();
    for (i, c) in digitos.iter().enumerate() {
        if i > 0 && (digitos.len() - i) % 3 == 0 {
            agrupado.push('.');
        }
        agrupado.push(*c);
    }

    let sinal = if valor.is_sign_negative() && !valor.is_zero() { "-" } else { "" };
    format!("{sinal}{agrupado},{centavos} Kz")
}
