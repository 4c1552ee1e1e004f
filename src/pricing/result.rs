//! Computed quote records (never persisted)

use crate::catalog::{CoPayment, Hospital, Municipality, WaitingPeriod};
use serde::{Deserialize, Serialize};

/// Price applied to one beneficiary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeneficiaryQuoteLine {
    #[serde(rename = "idade")]
    pub age: u32,

    /// Label of the first bracket that matched
    #[serde(rename = "faixa_etaria_usada")]
    pub bracket_label: String,

    /// Bracket price before discount
    #[serde(rename = "valor")]
    pub price: f64,

    #[serde(rename = "valor_desconto", default)]
    pub discount_amount: f64,

    /// Price after discount (equals `price` without a discount)
    #[serde(rename = "valor_final")]
    pub net_price: f64,
}

/// Priced outcome of one admitted plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanQuoteResult {
    #[serde(rename = "plano_id")]
    pub plan_id: u32,

    /// Insurer name, "N/A" when the plan has no insurer
    #[serde(rename = "operadora")]
    pub insurer_name: String,

    #[serde(rename = "plano")]
    pub plan_name: String,

    /// Sum of bracket prices, rounded to cents
    #[serde(rename = "preco_total")]
    pub total_price: f64,

    /// One line per requested age, in request order
    #[serde(rename = "beneficiarios")]
    pub beneficiaries: Vec<BeneficiaryQuoteLine>,

    #[serde(rename = "desconto_percentual", default)]
    pub discount_percent: Option<f64>,

    #[serde(rename = "valor_desconto", default)]
    pub discount_total: f64,

    /// Sum of discounted prices, rounded to cents
    #[serde(rename = "preco_final")]
    pub net_total: f64,

    #[serde(rename = "imagem_coparticipacao_url", default)]
    pub copayment_image_url: Option<String>,

    #[serde(rename = "hospitais", default)]
    pub hospitals: Vec<Hospital>,

    #[serde(rename = "carencias", default)]
    pub waiting_periods: Vec<WaitingPeriod>,

    #[serde(rename = "coparticipacoes", default)]
    pub copayments: Vec<CoPayment>,

    #[serde(rename = "municipios", default)]
    pub municipalities: Vec<Municipality>,

    #[serde(rename = "rede_credenciada_url", default)]
    pub network_url: Option<String>,
}

impl PlanQuoteResult {
    pub fn beneficiary_count(&self) -> usize {
        self.beneficiaries.len()
    }

    pub fn has_discount(&self) -> bool {
        self.discount_percent.is_some()
    }
}
