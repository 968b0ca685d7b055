//! The per-company insight run (supplemented feature, SPEC_FULL.md §B.4):
//! ties detection, scoring, narrative, recommendations and portfolio
//! metrics together into one call, mirroring
//! `layer4_orchestrator.py::Layer4Orchestrator.generate_insights`.

use std::collections::BTreeMap;

use newsroom_common::{DetectedOpportunity, DetectedRisk, IndicatorId, TrendDirection};
use tracing::info;

use crate::company::CompanyProfile;
use crate::detect::{detect_opportunities, detect_pattern_risks, detect_rule_based_risks, merge_risks};
use crate::error::InsightError;
use crate::narrative::{generate_risk_narrative, NarrativeEnhancer, NoopNarrativeEnhancer, OpportunityNarrative, RiskNarrative};
use crate::portfolio::{calculate_portfolio_metrics, top_priority_opportunities, top_priority_risks, PortfolioMetrics};
use crate::precedent::{default_precedents, HistoricalPrecedent};
use crate::recommend::{generate_opportunity_recommendations, generate_risk_recommendations, Recommendation};
use crate::rules::{default_opportunity_catalog, default_risk_catalog, OpportunityRule, RiskRule};

const TOP_PRIORITY_LIMIT: usize = 5;

pub struct RiskInsight {
    pub risk: DetectedRisk,
    pub narrative: RiskNarrative,
    pub recommendations: Vec<Recommendation>,
}

pub struct OpportunityInsight {
    pub opportunity: DetectedOpportunity,
    pub narrative: OpportunityNarrative,
    pub recommendations: Vec<Recommendation>,
}

pub struct InsightRunSummary {
    pub company_id: String,
    pub risks: Vec<RiskInsight>,
    pub opportunities: Vec<OpportunityInsight>,
    pub portfolio: PortfolioMetrics,
    pub top_priority_risk_codes: Vec<String>,
    pub top_priority_opportunity_codes: Vec<String>,
}

/// Holds the rule/precedent catalogs so a long-lived pipeline worker
/// builds them once rather than per run.
pub struct InsightEngine {
    risk_catalog: Vec<RiskRule>,
    opportunity_catalog: Vec<OpportunityRule>,
    precedents: Vec<HistoricalPrecedent>,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self {
            risk_catalog: default_risk_catalog(),
            opportunity_catalog: default_opportunity_catalog(),
            precedents: default_precedents(),
        }
    }
}

impl InsightEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn produce_insights(
        &self,
        company: &CompanyProfile,
        indicator_values: &BTreeMap<IndicatorId, f64>,
        trend_directions: &BTreeMap<IndicatorId, TrendDirection>,
        enhancer: &dyn NarrativeEnhancer,
    ) -> Result<InsightRunSummary, InsightError> {
        if indicator_values.is_empty() {
            return Err(InsightError::NoIndicatorData(company.company_id.clone()));
        }

        let rule_risks = detect_rule_based_risks(company, indicator_values, trend_directions, &self.risk_catalog);
        let pattern_risks = detect_pattern_risks(company, indicator_values, trend_directions, &self.precedents);
        let risks = merge_risks(rule_risks, pattern_risks);
        let opportunities = detect_opportunities(company, indicator_values, &self.opportunity_catalog);

        info!(
            company_id = %company.company_id,
            risk_count = risks.len(),
            opportunity_count = opportunities.len(),
            "insight detection complete"
        );

        let top_risks = top_priority_risks(&risks, TOP_PRIORITY_LIMIT);
        let top_opportunities = top_priority_opportunities(&opportunities, TOP_PRIORITY_LIMIT);
        let top_priority_risk_codes = top_risks.iter().map(|r| r.code.clone()).collect();
        let top_priority_opportunity_codes = top_opportunities.iter().map(|o| o.code.clone()).collect();

        let portfolio = calculate_portfolio_metrics(&risks, &opportunities);

        let mut risk_insights = Vec::with_capacity(risks.len());
        for risk in risks {
            let narrative = generate_enhanced_or_base(&risk, company, enhancer).await;
            let recommendations = generate_risk_recommendations(&risk);
            risk_insights.push(RiskInsight { risk, narrative, recommendations });
        }

        let mut opportunity_insights = Vec::with_capacity(opportunities.len());
        for opportunity in opportunities {
            let narrative = crate::narrative::generate_opportunity_narrative(&opportunity, company);
            let recommendations = generate_opportunity_recommendations(&opportunity);
            opportunity_insights.push(OpportunityInsight { opportunity, narrative, recommendations });
        }

        Ok(InsightRunSummary {
            company_id: company.company_id.clone(),
            risks: risk_insights,
            opportunities: opportunity_insights,
            portfolio,
            top_priority_risk_codes,
            top_priority_opportunity_codes,
        })
    }
}

async fn generate_enhanced_or_base(
    risk: &DetectedRisk,
    company: &CompanyProfile,
    enhancer: &dyn NarrativeEnhancer,
) -> RiskNarrative {
    let mut narrative = generate_risk_narrative(risk, company);
    if let Some(enhanced) = enhancer.enhance_risk(risk, &narrative).await {
        narrative.summary = enhanced.summary;
        narrative.detailed_explanation = enhanced.detailed_explanation;
        narrative.what_it_means = enhanced.what_it_means;
    }
    narrative
}

/// Convenience constructor for callers with no LLM wired up.
pub fn noop_enhancer() -> NoopNarrativeEnhancer {
    NoopNarrativeEnhancer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::company::{BusinessScale, DebtLevel};

    fn company() -> CompanyProfile {
        CompanyProfile {
            company_id: "c1".to_string(),
            company_name: "Acme".to_string(),
            industry: "manufacturing".to_string(),
            business_scale: BusinessScale::Medium,
            debt_level: DebtLevel::Moderate,
            cash_reserves: None,
            annual_revenue: Some(5_000_000.0),
            revenue_currency: "LKR".to_string(),
            operational_dependencies: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn empty_indicator_values_returns_error() {
        let engine = InsightEngine::new();
        let result =
            engine.produce_insights(&company(), &BTreeMap::new(), &BTreeMap::new(), &NoopNarrativeEnhancer).await;
        assert!(matches!(result, Err(InsightError::NoIndicatorData(_))));
    }

    #[tokio::test]
    async fn breached_indicator_produces_risk_insight_with_narrative() {
        let engine = InsightEngine::new();
        let mut values = BTreeMap::new();
        values.insert("eco_currency".to_string(), 80.0);
        let summary = engine
            .produce_insights(&company(), &values, &BTreeMap::new(), &NoopNarrativeEnhancer)
            .await
            .unwrap();
        assert!(summary.risks.iter().any(|r| r.risk.code == "currency_volatility"));
        assert!(!summary.top_priority_risk_codes.is_empty());
    }
}
