//! Plan catalog: the records the persistence layer hands to the quoting core

mod data;
pub mod filter;
pub mod loader;

pub use data::{AgeBracket, CoPayment, Hospital, Insurer, Municipality, Plan, WaitingPeriod, UNKNOWN_INSURER};
pub use filter::PlanFilter;
pub use loader::{
    load_catalog, load_catalog_dir, load_catalog_from_json_reader, load_catalog_from_readers,
    load_default_catalog, CsvTables, DEFAULT_CATALOG_PATH,
};

use crate::error::{QuoteError, Result};
use serde::Serialize;
use std::collections::HashSet;

/// Immutable, ordered set of fully-loaded plans
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    plans: Vec<Plan>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate plan ids
    pub fn from_plans(plans: Vec<Plan>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(plans.len());
        for plan in &plans {
            if !seen.insert(plan.id) {
                return Err(QuoteError::Catalog(format!("duplicate plan id {}", plan.id)));
            }
        }
        Ok(Self { plans })
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn get(&self, plan_id: u32) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id == plan_id)
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Distinct insurers in catalog order
    pub fn insurers(&self) -> Vec<&Insurer> {
        let mut seen = HashSet::new();
        self.plans
            .iter()
            .filter_map(|p| p.insurer.as_ref())
            .filter(|i| seen.insert(i.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insurer(id: u32, name: &str) -> Insurer {
        Insurer { id, name: name.into(), network_url: None }
    }

    #[test]
    fn test_catalog_lookup_and_insurers() {
        let catalog = Catalog::from_plans(vec![
            Plan::new(1, "A", "PF", "Enfermaria", "Regional").with_insurer(insurer(5, "Amil")),
            Plan::new(2, "B", "PJ", "Apartamento", "Nacional").with_insurer(insurer(6, "Hapvida")),
            Plan::new(3, "C", "PF", "Apartamento", "Nacional").with_insurer(insurer(5, "Amil")),
            Plan::new(4, "D", "PF", "Apartamento", "Nacional"),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.get(3).map(|p| p.name.as_str()), Some("C"));
        assert!(catalog.get(99).is_none());

        let names: Vec<&str> = catalog.insurers().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Amil", "Hapvida"]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Catalog::from_plans(vec![
            Plan::new(1, "A", "PF", "Enfermaria", "Regional"),
            Plan::new(1, "B", "PF", "Enfermaria", "Regional"),
        ]);
        assert!(matches!(result, Err(QuoteError::Catalog(_))));
    }
}
