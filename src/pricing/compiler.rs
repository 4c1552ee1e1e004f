//! Quote compiler: prices every beneficiary age against each candidate plan
//!
//! Admission is all-or-nothing per plan: if any age finds no bracket the plan
//! is left out of the result set entirely.

use super::bracket::{classify, BracketMatch};
use super::discount::{effective_percent, round_cents, DiscountBreakdown};
use super::result::{BeneficiaryQuoteLine, PlanQuoteResult};
use crate::catalog::{AgeBracket, Plan};
use crate::error::{QuoteError, Result};
use log::debug;
use std::borrow::Borrow;

/// First bracket (in stored order) whose label covers `age`
pub fn find_bracket(brackets: &[AgeBracket], age: u32) -> Option<&AgeBracket> {
    brackets.iter().find(|bracket| match classify(age, &bracket.label) {
        BracketMatch::Matched => true,
        BracketMatch::NotMatched => false,
        BracketMatch::Malformed => {
            debug!("skipping malformed bracket label {:?}", bracket.label);
            false
        }
    })
}

/// Price one plan for all ages; None when some age is not covered
pub fn quote_plan(plan: &Plan, ages: &[u32], discount_percent: Option<f64>) -> Option<PlanQuoteResult> {
    let discount_percent = effective_percent(discount_percent);
    let mut beneficiaries = Vec::with_capacity(ages.len());
    let mut breakdowns = Vec::with_capacity(ages.len());

    for &age in ages {
        let Some(bracket) = find_bracket(&plan.brackets, age) else {
            debug!("plan {} ({}) excluded: no bracket covers age {}", plan.id, plan.name, age);
            return None;
        };

        let line = DiscountBreakdown::of(bracket.price, discount_percent);
        breakdowns.push(line);
        beneficiaries.push(BeneficiaryQuoteLine {
            age,
            bracket_label: bracket.label.clone(),
            price: bracket.price,
            discount_amount: line.discount,
            net_price: line.net,
        });
    }

    let total = DiscountBreakdown::total(breakdowns);
    let total_price = round_cents(total.gross);
    let net_total = round_cents(total.net);

    Some(PlanQuoteResult {
        plan_id: plan.id,
        insurer_name: plan.insurer_name().to_string(),
        plan_name: plan.name.clone(),
        total_price,
        beneficiaries,
        discount_percent,
        discount_total: round_cents(total_price - net_total),
        net_total,
        copayment_image_url: plan.copayment_image_url.clone(),
        hospitals: plan.hospitals.clone(),
        waiting_periods: plan.waiting_periods.clone(),
        copayments: plan.copayments.clone(),
        municipalities: plan.municipalities.clone(),
        network_url: plan.network_url().map(str::to_string),
    })
}

/// Compile quotes for the candidate plans, preserving their order.
///
/// # Errors
/// `QuoteError::InvalidInput` when `ages` is empty.
pub fn compile<P: Borrow<Plan>>(
    candidate_plans: &[P],
    ages: &[u32],
    discount_percent: Option<f64>,
) -> Result<Vec<PlanQuoteResult>> {
    if ages.is_empty() {
        return Err(QuoteError::InvalidInput(
            "at least one beneficiary age is required".to_string(),
        ));
    }

    Ok(candidate_plans
        .iter()
        .filter_map(|plan| {
            let plan: &Plan = plan.borrow();
            quote_plan(plan, ages, discount_percent)
        })
        .collect())
}
