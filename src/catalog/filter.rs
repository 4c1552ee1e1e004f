//! Candidate plan selection by categorical attributes

use super::{Catalog, Plan};
use serde::{Deserialize, Serialize};

/// Request-side plan filters. Unset fields do not constrain the selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanFilter {
    pub insurer_id: Option<u32>,

    /// Case-insensitive prefix on the contract type ("PF", "Ades" ...)
    pub contract_type: Option<String>,

    /// Case-insensitive prefix on the accommodation class
    pub accommodation: Option<String>,

    /// Case-insensitive prefix on the coverage scope
    pub coverage: Option<String>,

    pub eligibility: Option<bool>,

    pub copayment: Option<bool>,
}

/// Blank filter strings behave as "no filter"
fn prefix_matches(value: &str, prefix: Option<&str>) -> bool {
    match prefix.map(str::trim) {
        None | Some("") => true,
        Some(prefix) => value.to_lowercase().starts_with(&prefix.to_lowercase()),
    }
}

impl PlanFilter {
    pub fn accepts(&self, plan: &Plan) -> bool {
        if let Some(insurer_id) = self.insurer_id {
            if plan.insurer_id() != Some(insurer_id) {
                return false;
            }
        }

        if !prefix_matches(&plan.contract_type, self.contract_type.as_deref())
            || !prefix_matches(&plan.accommodation, self.accommodation.as_deref())
            || !prefix_matches(&plan.coverage, self.coverage.as_deref())
        {
            return false;
        }

        if let Some(eligibility) = self.eligibility {
            if plan.eligibility != eligibility {
                return false;
            }
        }

        if let Some(copayment) = self.copayment {
            if plan.copayment != copayment {
                return false;
            }
        }

        true
    }

    /// Candidate plans in catalog order
    pub fn select<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Plan> {
        catalog.plans().iter().filter(|p| self.accepts(p)).collect()
    }
}
