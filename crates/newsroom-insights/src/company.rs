//! Company profile: the other half of the "(company_profile,
//! indicator_snapshot) pair" spec §4.7 scores per. No shared
//! `CompanyProfile` type exists in `newsroom_common` (it's insight-input,
//! not a persisted domain entity elsewhere in the pipeline), so it's
//! modeled here, grounded on the fields `risk_scorer.py`/`generator.py`
//! read off their `company_profile` dict (`business_scale`, `debt_level`,
//! `cash_reserves`, `annual_revenue`, `revenue_currency`, `industry`,
//! `operational_dependencies`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessScale {
    Small,
    Medium,
    Large,
    Enterprise,
}

impl BusinessScale {
    /// Smaller companies are more vulnerable to the same shock (spec
    /// §4.7 item 3: "category base × scale multiplier").
    pub fn impact_multiplier(self) -> f64 {
        match self {
            BusinessScale::Small => 1.3,
            BusinessScale::Medium => 1.0,
            BusinessScale::Large => 0.9,
            BusinessScale::Enterprise => 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtLevel {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyCriticality {
    Normal,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub company_id: String,
    pub company_name: String,
    pub industry: String,
    pub business_scale: BusinessScale,
    pub debt_level: DebtLevel,
    pub cash_reserves: Option<f64>,
    pub annual_revenue: Option<f64>,
    pub revenue_currency: String,
    pub operational_dependencies: BTreeMap<String, DependencyCriticality>,
}

impl CompanyProfile {
    /// `debt_level=high ⇒ ×1.15`; `debt_level=low` with cash reserves on
    /// hand `⇒ ×0.90`; moderate is unadjusted (`risk_scorer.py`
    /// `_calculate_impact`).
    pub fn debt_impact_modifier(&self) -> f64 {
        match self.debt_level {
            DebtLevel::High => 1.15,
            DebtLevel::Low if self.cash_reserves.is_some() => 0.90,
            _ => 1.0,
        }
    }

    pub fn critical_dependency_count(&self) -> usize {
        self.operational_dependencies.values().filter(|c| matches!(c, DependencyCriticality::Critical)).count()
    }
}
