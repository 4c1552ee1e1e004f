//! Plan catalog records as supplied by the persistence layer
//!
//! Field names serialize with the wire names used by the quoting API
//! (`nome`, `faixa_etaria`, `rede_credenciada_url`, ...), so a JSON export of the
//! plan listing endpoint can be loaded directly.

use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder shown when a plan has no insurer association
pub const UNKNOWN_INSURER: &str = "N/A";

/// Nullable boolean columns read as `false`
fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Company underwriting one or more plans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insurer {
    pub id: u32,

    #[serde(rename = "nome")]
    pub name: String,

    /// Public listing of the accredited provider network
    #[serde(rename = "rede_credenciada_url", default)]
    pub network_url: Option<String>,
}

/// Labeled age range with its monthly price, e.g. `"19-23"` or `"59+"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeBracket {
    #[serde(rename = "faixa_etaria")]
    pub label: String,

    #[serde(rename = "valor")]
    pub price: f64,
}

impl AgeBracket {
    pub fn new(label: impl Into<String>, price: f64) -> Self {
        Self {
            label: label.into(),
            price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hospital {
    #[serde(default)]
    pub id: u32,

    #[serde(rename = "nome")]
    pub name: String,

    #[serde(rename = "endereco", default)]
    pub address: Option<String>,
}

/// Minimum elapsed time before a benefit category becomes usable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitingPeriod {
    #[serde(default)]
    pub id: u32,

    #[serde(rename = "descricao")]
    pub description: String,

    #[serde(rename = "dias")]
    pub days: u32,
}

/// Cost-sharing rule for a service category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoPayment {
    #[serde(default)]
    pub id: u32,

    #[serde(rename = "nome", default)]
    pub name: Option<String>,

    /// Contract type the rule was tabulated for (PF, PJ, Adesão)
    #[serde(rename = "tipo_plano", default)]
    pub plan_type: Option<String>,

    #[serde(rename = "imagem_url", default)]
    pub image_url: Option<String>,

    #[serde(rename = "tipo_servico", default)]
    pub service_type: Option<String>,

    /// Share paid by the beneficiary, in percent (20.0 = 20%)
    #[serde(rename = "percentual", default)]
    pub percentage: Option<f64>,

    /// Floor per occurrence
    #[serde(rename = "valor_minimo", default)]
    pub min_amount: Option<f64>,

    /// Cap per occurrence (None = uncapped)
    #[serde(rename = "valor_maximo", default)]
    pub max_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Municipality {
    #[serde(default)]
    pub id: u32,

    #[serde(rename = "nome")]
    pub name: String,
}

/// An insurance product with its eagerly-loaded associations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: u32,

    #[serde(rename = "nome")]
    pub name: String,

    /// Owning insurer (None when the association is missing)
    #[serde(rename = "operadora", default)]
    pub insurer: Option<Insurer>,

    /// PF, PJ, Adesão
    #[serde(rename = "tipo_contratacao")]
    pub contract_type: String,

    /// Enfermaria, Apartamento
    #[serde(rename = "acomodacao")]
    pub accommodation: String,

    /// Local, Regional, Nacional
    #[serde(rename = "abrangencia")]
    pub coverage: String,

    /// Whether the plan carries co-payment rules
    #[serde(rename = "coparticipacao", default, deserialize_with = "null_as_false")]
    pub copayment: bool,

    /// Whether the plan requires an eligibility proof
    #[serde(rename = "elegibilidade", default, deserialize_with = "null_as_false")]
    pub eligibility: bool,

    #[serde(rename = "imagem_coparticipacao_url", default)]
    pub copayment_image_url: Option<String>,

    /// Price brackets in stored order (first match wins)
    #[serde(rename = "faixas", default)]
    pub brackets: Vec<AgeBracket>,

    #[serde(rename = "hospitais", default)]
    pub hospitals: Vec<Hospital>,

    #[serde(rename = "carencias", default)]
    pub waiting_periods: Vec<WaitingPeriod>,

    #[serde(rename = "coparticipacoes", default)]
    pub copayments: Vec<CoPayment>,

    #[serde(rename = "municipios", default)]
    pub municipalities: Vec<Municipality>,
}

impl Plan {
    /// Create a plan with no associations
    pub fn new(
        id: u32,
        name: impl Into<String>,
        contract_type: impl Into<String>,
        accommodation: impl Into<String>,
        coverage: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            insurer: None,
            contract_type: contract_type.into(),
            accommodation: accommodation.into(),
            coverage: coverage.into(),
            copayment: false,
            eligibility: false,
            copayment_image_url: None,
            brackets: Vec::new(),
            hospitals: Vec::new(),
            waiting_periods: Vec::new(),
            copayments: Vec::new(),
            municipalities: Vec::new(),
        }
    }

    pub fn with_insurer(mut self, insurer: Insurer) -> Self {
        self.insurer = Some(insurer);
        self
    }

    pub fn with_brackets<I, S>(mut self, brackets: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        self.brackets = brackets
            .into_iter()
            .map(|(label, price)| AgeBracket::new(label, price))
            .collect();
        self
    }

    /// Insurer display name, "N/A" when the association is missing
    pub fn insurer_name(&self) -> &str {
        self.insurer
            .as_ref()
            .map(|i| i.name.as_str())
            .unwrap_or(UNKNOWN_INSURER)
    }

    pub fn insurer_id(&self) -> Option<u32> {
        self.insurer.as_ref().map(|i| i.id)
    }

    pub fn network_url(&self) -> Option<&str> {
        self.insurer.as_ref().and_then(|i| i.network_url.as_deref())
    }
}
