// src/models/receita.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::db_utils::campo_anulavel,
    models::{orgao::Orgao, tipo_servico::TipoServico, usuario::UsuarioResumo},
};

/// Casas decimais dos valores monetários (NUMERIC(14, 2)).
pub const CASAS_DECIMAIS: u32 = 2;

/// Arredonda para centavos do mesmo jeito que o NUMERIC(14, 2) do Postgres (meio para longe do zero).
pub fn arredondar_centavos(valor: Decimal) -> Decimal {
    valor.round_dp_with_strategy(CASAS_DECIMAIS, RoundingStrategy::MidpointAwayFromZero)
}

/// `quantidade * valor_unitario`, com o valor unitário já como será gravado.
pub fn calcular_valor_total(quantidade: i32, valor_unitario: Decimal) -> Decimal {
    arredondar_centavos(Decimal::from(quantidade) * arredondar_centavos(valor_unitario))
}

fn validar_nao_negativo(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// --- Structs ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Receita {
    pub id: Uuid,
    pub orgao_id: Uuid,
    pub tipo_servico_id: Uuid,

    #[schema(example = 3)]
    pub quantidade: i32,

    #[schema(example = 150.00)]
    pub valor_unitario: Decimal,

    #[schema(example = 450.00)]
    pub valor_total: Decimal,

    pub referencia: Option<String>,
    pub observacoes: Option<String>,

    // Quem registrou (vem do token, não do corpo da requisição)
    pub usuario_registro_id: Option<Uuid>,

    pub data_recebimento: DateTime<Utc>,
}

/// Receita com órgão, tipo de serviço e usuário de registro embutidos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReceitaDetalhada {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub receita: Receita,

    #[schema(value_type = Option<Orgao>)]
    pub orgao: Option<Json<Orgao>>,

    #[schema(value_type = Option<TipoServico>)]
    pub tipo_servico: Option<Json<TipoServico>>,

    #[schema(value_type = Option<UsuarioResumo>)]
    pub usuario_registro: Option<Json<UsuarioResumo>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NovaReceita {
    pub orgao_id: Uuid,
    pub tipo_servico_id: Uuid,

    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    pub quantidade: i32,

    #[validate(custom(function = "validar_nao_negativo"))]
    pub valor_unitario: Decimal,

    // Quando ausente, é calculado a partir da quantidade e do valor unitário
    #[validate(custom(function = "validar_nao_negativo"))]
    pub valor_total: Option<Decimal>,

    pub referencia: Option<String>,
    pub observacoes: Option<String>,

    // Ausente = agora
    pub data_recebimento: Option<DateTime<Utc>>,
}

impl NovaReceita {
    /// Valor unitário em centavos, como fica na coluna.
    pub fn valor_unitario_gravado(&self) -> Decimal {
        arredondar_centavos(self.valor_unitario)
    }

    /// O total informado pelo cliente ou, na falta dele, o calculado.
    pub fn valor_total_efetivo(&self) -> Decimal {
        self.valor_total
            .map(arredondar_centavos)
            .unwrap_or_else(|| calcular_valor_total(self.quantidade, self.valor_unitario))
    }
}

#[derive(Debug, Default, Clone, Deserialize, Validate, ToSchema)]
pub struct AtualizaReceita {
    pub orgao_id: Option<Uuid>,
    pub tipo_servico_id: Option<Uuid>,

    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    pub quantidade: Option<i32>,

    pub valor_unitario: Option<Decimal>,
    pub valor_total: Option<Decimal>,

    #[serde(default, deserialize_with = "campo_anulavel")]
    #[schema(value_type = Option<String>)]
    pub referencia: Option<Option<String>>,

    #[serde(default, deserialize_with = "campo_anulavel")]
    #[schema(value_type = Option<String>)]
    pub observacoes: Option<Option<String>>,

    pub data_recebimento: Option<DateTime<Utc>>,
}

impl AtualizaReceita {
    /// Quantidade ou valor unitário mudaram e o cliente não mandou o total.
    pub fn precisa_recalcular_total(&self) -> bool {
        (self.quantidade.is_some() || self.valor_unitario.is_some()) && self.valor_total.is_none()
    }

    /// Leva os valores monetários informados para centavos antes de gravar.
    pub fn arredondar_valores(&mut self) {
        self.valor_unitario = self.valor_unitario.map(arredondar_centavos);
        self.valor_total = self.valor_total.map(arredondar_centavos);
    }

    /// Mescla os valores novos sobre os que estão gravados e recalcula o total.
    pub fn recalcular_total(&mut self, quantidade_atual: i32, valor_unitario_atual: Decimal) {
        let quantidade = self.quantidade.unwrap_or(quantidade_atual);
        let valor_unitario = self.valor_unitario.unwrap_or(valor_unitario_atual);
        self.valor_total = Some(calcular_valor_total(quantidade, valor_unitario));
    }

    /// Validações que o derive não cobre (Decimal opcional).
    pub fn validar_valores(&self) -> Result<(), validator::ValidationErrors> {
        let mut errors = validator::ValidationErrors::new();
        if let Some(Err(e)) = self.valor_unitario.as_ref().map(validar_nao_negativo) {
            errors.add("valor_unitario", e);
        }
        if let Some(Err(e)) = self.valor_total.as_ref().map(validar_nao_negativo) {
            errors.add("valor_total", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    pub fn is_empty(&self) -> bool {
        self.orgao_id.is_none()
            && self.tipo_servico_id.is_none()
            && self.quantidade.is_none()
            && self.valor_unitario.is_none()
            && self.valor_total.is_none()
            && self.referencia.is_none()
            && self.observacoes.is_none()
            && self.data_recebimento.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FiltroReceitas {
    pub orgao_id: Option<Uuid>,
    pub tipo_servico_id: Option<Uuid>,

    /// Usuário que registrou a receita
    pub usuario_id: Option<Uuid>,

    /// Primeiro dia do período (inclusive)
    pub data_inicio: Option<NaiveDate>,

    /// Último dia do período (inclusive)
    pub data_fim: Option<NaiveDate>,
}

/// Soma e contagem das receitas que atendem a um filtro.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Totais {
    pub valor_total: Decimal,
    pub quantidade: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(valor: &str) -> Decimal {
        valor.parse().unwrap()
    }

    #[test]
    fn total_e_quantidade_vezes_valor_unitario() {
        assert_eq!(calcular_valor_total(3, d("150.00")), d("450.00"));
    }

    #[test]
    fn total_e_arredondado_para_centavos() {
        assert_eq!(calcular_valor_total(7, d("12.34")), d("86.38"));
        assert_eq!(calcular_valor_total(1, d("0.125")), d("0.13"));
    }

    #[test]
    fn total_usa_o_valor_unitario_como_fica_gravado() {
        // 0.333 vira 0.33 na coluna; o total tem de bater com 3 x 0.33
        assert_eq!(calcular_valor_total(3, d("0.333")), d("0.99"));
        assert_eq!(calcular_valor_total(7, d("12.347")), d("86.45"));

        let mut receita = nova(None);
        receita.valor_unitario = d("0.333");
        assert_eq!(receita.valor_unitario_gravado(), d("0.33"));
        assert_eq!(receita.valor_total_efetivo(), d("0.99"));
    }

    #[test]
    fn patch_leva_valores_para_centavos() {
        let mut patch = AtualizaReceita {
            valor_unitario: Some(d("2.005")),
            valor_total: Some(d("10.014")),
            ..Default::default()
        };
        patch.arredondar_valores();
        assert_eq!(patch.valor_unitario, Some(d("2.01")));
        assert_eq!(patch.valor_total, Some(d("10.01")));
    }

    fn nova(valor_total: Option<Decimal>) -> NovaReceita {
        NovaReceita {
            orgao_id: Uuid::new_v4(),
            tipo_servico_id: Uuid::new_v4(),
            quantidade: 3,
            valor_unitario: d("150.00"),
            valor_total,
            referencia: None,
            observacoes: None,
            data_recebimento: None,
        }
    }

    #[test]
    fn criacao_sem_total_calcula() {
        assert_eq!(nova(None).valor_total_efetivo(), d("450.00"));
    }

    #[test]
    fn criacao_com_total_explicito_respeita_o_cliente() {
        assert_eq!(nova(Some(d("400.00"))).valor_total_efetivo(), d("400.00"));
        assert_eq!(nova(Some(Decimal::ZERO)).valor_total_efetivo(), Decimal::ZERO);
    }

    #[test]
    fn atualizacao_mescla_com_os_valores_gravados() {
        let mut patch = AtualizaReceita { quantidade: Some(5), ..Default::default() };
        assert!(patch.precisa_recalcular_total());

        patch.recalcular_total(3, d("150.00"));
        assert_eq!(patch.valor_total, Some(d("750.00")));

        let mut patch = AtualizaReceita { valor_unitario: Some(d("10.50")), ..Default::default() };
        patch.recalcular_total(4, d("150.00"));
        assert_eq!(patch.valor_total, Some(d("42.00")));
    }

    #[test]
    fn atualizacao_com_total_explicito_nao_recalcula() {
        let patch = AtualizaReceita {
            quantidade: Some(5),
            valor_total: Some(d("1.00")),
            ..Default::default()
        };
        assert!(!patch.precisa_recalcular_total());
    }

    #[test]
    fn atualizacao_sem_valores_nao_recalcula() {
        let patch = AtualizaReceita { referencia: Some(Some("GR-7".into())), ..Default::default() };
        assert!(!patch.precisa_recalcular_total());
    }

    #[test]
    fn valor_unitario_negativo_no_patch_e_rejeitado() {
        let patch = AtualizaReceita { valor_unitario: Some(d("-1")), ..Default::default() };
        let errors = patch.validar_valores().unwrap_err();
        assert!(errors.field_errors().contains_key("valor_unitario"));
    }

    #[test]
    fn nova_receita_valida_quantidade_e_valor() {
        let mut receita = nova(None);
        receita.quantidade = 0;
        receita.valor_unitario = d("-5");
        let errors = receita.validate().unwrap_err();
        let campos = errors.field_errors();
        assert!(campos.contains_key("quantidade"));
        assert!(campos.contains_key("valor_unitario"));
    }

    #[test]
    fn nova_receita_rejeita_total_negativo() {
        let errors = nova(Some(d("-1.00"))).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("valor_total"));
        assert!(nova(Some(Decimal::ZERO)).validate().is_ok());
    }

    #[test]
    fn totais_usam_as_chaves_do_relatorio() {
        let totais = Totais { valor_total: d("10.5"), quantidade: 2 };
        let json = serde_json::to_value(&totais).unwrap();
        assert_eq!(json["valorTotal"], 10.5);
        assert_eq!(json["quantidade"], 2);
    }
}
