//! Portfolio-level roll-up across a company's detected risks/opportunities
//! (spec §4.7 item 6), ported from
//! `layer4_orchestrator.py::_calculate_portfolio_metrics`/
//! `_identify_top_priorities`.

use std::collections::BTreeMap;

use newsroom_common::{DetectedOpportunity, DetectedRisk, SeverityLevel};
use serde::{Deserialize, Serialize};

fn severity_weight(severity: SeverityLevel) -> f64 {
    match severity {
        SeverityLevel::Critical => 4.0,
        SeverityLevel::High => 3.0,
        SeverityLevel::Medium => 2.0,
        SeverityLevel::Low => 1.0,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub total_risks: usize,
    pub total_opportunities: usize,
    pub severity_breakdown: BTreeMap<String, usize>,
    pub category_breakdown: BTreeMap<String, usize>,
    /// Weighted mean of `final_score` across risks, weighted by severity
    /// band (critical=4, high=3, medium=2, low=1); 0.0 with no risks.
    pub portfolio_risk_score: f64,
    pub requires_immediate_action: Vec<String>,
    pub average_opportunity_value: f64,
    pub average_opportunity_feasibility: f64,
}

pub fn calculate_portfolio_metrics(
    risks: &[DetectedRisk],
    opportunities: &[DetectedOpportunity],
) -> PortfolioMetrics {
    let mut severity_breakdown: BTreeMap<String, usize> = BTreeMap::new();
    let mut category_breakdown: BTreeMap<String, usize> = BTreeMap::new();
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    let mut requires_immediate_action = Vec::new();

    for risk in risks {
        *severity_breakdown.entry(format!("{:?}", risk.severity_level)).or_default() += 1;
        *category_breakdown.entry(risk.category.clone()).or_default() += 1;
        let weight = severity_weight(risk.severity_level);
        weighted_sum += risk.final_score * weight;
        weight_total += weight;
        if risk.requires_immediate_action {
            requires_immediate_action.push(risk.code.clone());
        }
    }

    let portfolio_risk_score = if weight_total > 0.0 { weighted_sum / weight_total } else { 0.0 };

    let average_opportunity_value = if opportunities.is_empty() {
        0.0
    } else {
        opportunities.iter().map(|o| o.impact).sum::<f64>() / opportunities.len() as f64
    };
    let average_opportunity_feasibility = if opportunities.is_empty() {
        0.0
    } else {
        opportunities.iter().map(|o| o.probability).sum::<f64>() / opportunities.len() as f64
    };

    PortfolioMetrics {
        total_risks: risks.len(),
        total_opportunities: opportunities.len(),
        severity_breakdown,
        category_breakdown,
        portfolio_risk_score,
        requires_immediate_action,
        average_opportunity_value,
        average_opportunity_feasibility,
    }
}

/// Top 5 risks by `(immediate_action? 1000 : 0) + final_score*10 + urgency`,
/// mirroring `_identify_top_priorities`'s risk ranking key.
pub fn top_priority_risks(risks: &[DetectedRisk], limit: usize) -> Vec<DetectedRisk> {
    let mut ranked: Vec<&DetectedRisk> = risks.iter().collect();
    ranked.sort_by(|a, b| priority_key(b).partial_cmp(&priority_key(a)).unwrap());
    ranked.into_iter().take(limit).cloned().collect()
}

fn priority_key(risk: &DetectedRisk) -> f64 {
    (if risk.requires_immediate_action { 1000.0 } else { 0.0 }) + risk.final_score * 10.0 + risk.urgency as f64
}

/// Top-N opportunities by `value * feasibility` (`_identify_top_priorities`'s
/// opportunity ranking key).
pub fn top_priority_opportunities(opportunities: &[DetectedOpportunity], limit: usize) -> Vec<DetectedOpportunity> {
    let mut ranked: Vec<&DetectedOpportunity> = opportunities.iter().collect();
    ranked.sort_by(|a, b| {
        let key_a = a.impact * a.probability;
        let key_b = b.impact * b.probability;
        key_b.partial_cmp(&key_a).unwrap()
    });
    ranked.into_iter().take(limit).cloned().collect()
}
