//! Semantic document model for the quote report
//!
//! `build_document` turns compiled quotes into an ordered list of blocks.
//! Nothing here knows about pages or coordinates; `compose` does the flowing.

use super::format::{
    beneficiary_count_label, format_currency_with, format_long_date, format_percent,
    format_timestamp,
};
use super::ReportOptions;
use crate::catalog::CoPayment;
use crate::pricing::discount::{effective_percent, round_cents};
use crate::pricing::{DiscountBreakdown, PlanQuoteResult};
use chrono::NaiveDateTime;

pub const EMPTY_RESULTS_NOTICE: &str = "Nenhum plano encontrado com os critérios selecionados.";

const ATTENTION_TEXT: &str = "Preço válido para o período de cobertura conforme especificado. \
                              Consulte os prazos de carência antes de contratar.";

const NETWORK_INTRO: &str = "Acesse a plataforma para visualizar a lista completa de hospitais, \
                             clínicas e laboratórios parceiros:";

/// Card highlight color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    Primary,
    Success,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceCard {
    pub label: String,
    pub value: String,
    pub caption: String,
    pub accent: Accent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Body,
    Muted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub heading: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title { text: String, subtitle: String },
    PlanHeader { title: String, subtitle: String },
    PriceCards(Vec<PriceCard>),
    Notice { lead: String, text: String },
    SectionTitle(String),
    /// `weights` are relative column widths
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
        weights: Vec<f32>,
    },
    Grid { columns: usize, cells: Vec<GridCell> },
    /// Check-marked item with an optional second line
    CheckItem { title: String, detail: Option<String> },
    Paragraph { text: String, role: TextRole },
    Link { url: String },
    Spacer(f32),
    PageBreak,
    Footer { lines: Vec<String> },
}

/// Label for a co-payment rule saved without a name
pub const UNKNOWN_COPAYMENT: &str = "Coparticipação";

/// `Consulta - Consulta eletiva (20%) · mín. R$ 50,00 · máx. R$ 200,00`
pub fn copayment_summary(copayment: &CoPayment, currency_prefix: &str) -> String {
    let mut text = copayment
        .name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(UNKNOWN_COPAYMENT)
        .to_string();

    if let Some(service) = copayment.service_type.as_deref().filter(|s| !s.trim().is_empty()) {
        text.push_str(" - ");
        text.push_str(service);
    }
    if let Some(pct) = copayment.percentage.filter(|p| *p != 0.0) {
        text.push_str(&format!(" ({}%)", format_percent(pct)));
    }
    if let Some(min) = copayment.min_amount.filter(|v| *v > 0.0) {
        text.push_str(&format!(" · mín. {}", format_currency_with(currency_prefix, min)));
    }
    if let Some(max) = copayment.max_amount.filter(|v| *v > 0.0) {
        text.push_str(&format!(" · máx. {}", format_currency_with(currency_prefix, max)));
    }
    text
}

/// Price cards: three with a discount, one without
fn price_cards(
    gross: f64,
    net: f64,
    discount_percent: Option<f64>,
    prefix: &str,
) -> Vec<PriceCard> {
    let total_card = PriceCard {
        label: "VALOR TOTAL".into(),
        value: format_currency_with(prefix, gross),
        caption: "sem desconto".into(),
        accent: Accent::Primary,
    };

    let Some(pct) = discount_percent else {
        return vec![total_card];
    };

    vec![
        total_card,
        PriceCard {
            label: "DESCONTO APLICADO".into(),
            value: format!("-{}%", format_percent(pct)),
            caption: format!("economize {}", format_currency_with(prefix, gross - net)),
            accent: Accent::Success,
        },
        PriceCard {
            label: "VALOR FINAL".into(),
            value: format_currency_with(prefix, net),
            caption: "Melhor preço".into(),
            accent: Accent::Success,
        },
    ]
}

fn beneficiary_table(result: &PlanQuoteResult, discount_percent: Option<f64>, prefix: &str) -> Block {
    let money = |amount: f64| format_currency_with(prefix, amount);

    match discount_percent {
        Some(pct) => Block::Table {
            header: ["Idade", "Faixa Etária", "Valor Base", "Desconto", "Valor Final"]
                .map(String::from)
                .to_vec(),
            rows: result
                .beneficiaries
                .iter()
                .map(|b| {
                    let line = DiscountBreakdown::of(b.price, Some(pct));
                    vec![
                        b.age.to_string(),
                        b.bracket_label.clone(),
                        money(line.gross),
                        money(line.discount),
                        money(line.net),
                    ]
                })
                .collect(),
            weights: vec![1.0, 1.5, 1.5, 1.5, 1.5],
        },
        None => Block::Table {
            header: ["Idade", "Faixa Etária", "Valor"].map(String::from).to_vec(),
            rows: result
                .beneficiaries
                .iter()
                .map(|b| vec![b.age.to_string(), b.bracket_label.clone(), money(b.price)])
                .collect(),
            weights: vec![1.5, 2.0, 2.0],
        },
    }
}

/// Blocks of one plan section
fn plan_section(result: &PlanQuoteResult, discount_percent: Option<f64>, options: &ReportOptions) -> Vec<Block> {
    let prefix = options.currency_prefix.as_str();
    let mut blocks = Vec::new();

    // Discounts are recomputed from base prices so the document follows the
    // percentage passed to the renderer.
    let totals = DiscountBreakdown::total(
        result
            .beneficiaries
            .iter()
            .map(|b| DiscountBreakdown::of(b.price, discount_percent)),
    );
    let gross = result.total_price;
    let net = if discount_percent.is_some() { round_cents(totals.net) } else { gross };

    blocks.push(Block::PlanHeader {
        title: format!("{} — {}", result.insurer_name, result.plan_name),
        subtitle: beneficiary_count_label(result.beneficiary_count()),
    });
    blocks.push(Block::PriceCards(price_cards(gross, net, discount_percent, prefix)));
    blocks.push(Block::Notice {
        lead: "Atenção:".into(),
        text: ATTENTION_TEXT.into(),
    });

    if !result.beneficiaries.is_empty() {
        blocks.push(Block::SectionTitle("Detalhamento por Beneficiário".into()));
        blocks.push(beneficiary_table(result, discount_percent, prefix));
        blocks.push(Block::Spacer(15.0));
    }

    if !result.waiting_periods.is_empty() {
        blocks.push(Block::SectionTitle("Carências".into()));
        blocks.push(Block::Grid {
            columns: 2,
            cells: result
                .waiting_periods
                .iter()
                .map(|w| GridCell {
                    heading: format!("{} dias", w.days),
                    text: w.description.clone(),
                })
                .collect(),
        });
        blocks.push(Block::Spacer(15.0));
    }

    if !result.copayments.is_empty() {
        blocks.push(Block::SectionTitle("Coparticipação".into()));
        blocks.extend(result.copayments.iter().map(|c| Block::CheckItem {
            title: copayment_summary(c, prefix),
            detail: None,
        }));
        blocks.push(Block::Spacer(7.0));
    }

    if !result.hospitals.is_empty() {
        blocks.push(Block::SectionTitle("Hospitais Credenciados".into()));
        blocks.extend(result.hospitals.iter().map(|h| Block::CheckItem {
            title: h.name.clone(),
            detail: h.address.clone().filter(|a| !a.trim().is_empty()),
        }));
        blocks.push(Block::Spacer(7.0));
    }

    if !result.municipalities.is_empty() {
        let names: Vec<&str> = result.municipalities.iter().map(|m| m.name.as_str()).collect();
        blocks.push(Block::SectionTitle("Municípios Atendidos".into()));
        blocks.push(Block::CheckItem {
            title: names.join(", "),
            detail: None,
        });
        blocks.push(Block::Spacer(15.0));
    }

    if let Some(url) = result.network_url.as_deref().filter(|u| !u.trim().is_empty()) {
        blocks.push(Block::SectionTitle("Consulte a Rede Credenciada".into()));
        blocks.push(Block::Paragraph {
            text: NETWORK_INTRO.into(),
            role: TextRole::Body,
        });
        blocks.push(Block::Link { url: url.to_string() });
        blocks.push(Block::Spacer(15.0));
    }

    blocks
}

/// Full document: title, one section per plan (page break between plans),
/// footer. An empty result set renders the "no plans" notice instead.
pub fn build_document(
    results: &[PlanQuoteResult],
    discount_percent: Option<f64>,
    generated_at: NaiveDateTime,
    options: &ReportOptions,
) -> Vec<Block> {
    let discount_percent = effective_percent(discount_percent);
    let mut blocks = vec![Block::Title {
        text: options.title.clone(),
        subtitle: format!("Data: {}", format_long_date(generated_at.date())),
    }];

    if results.is_empty() {
        blocks.push(Block::Paragraph {
            text: EMPTY_RESULTS_NOTICE.into(),
            role: TextRole::Muted,
        });
    }

    for (i, result) in results.iter().enumerate() {
        if i > 0 {
            blocks.push(Block::PageBreak);
        }
        blocks.extend(plan_section(result, discount_percent, options));
    }

    blocks.push(Block::Spacer(20.0));
    blocks.push(Block::Footer {
        lines: vec![
            format!(
                "Documento gerado automaticamente pelo {} em {}",
                options.system_name,
                format_timestamp(generated_at)
            ),
            format!(
                "Esta cotação é válida por {} dias. Depois disso, solicite uma nova cotação.",
                options.validity_days
            ),
        ],
    });

    blocks
}
