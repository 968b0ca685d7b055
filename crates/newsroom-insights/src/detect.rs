//! Risk and opportunity detection (spec §4.7 item 1–2): a rule-based
//! detector against indicator thresholds, a pattern-based detector
//! against historical precedents, and the union/de-dup step that merges
//! them by `risk_code`, keeping the highest-confidence detection and
//! tagging `detection_method = combined` when both fire.

use std::collections::BTreeMap;

use newsroom_common::{DetectedOpportunity, DetectedRisk, DetectionMethod, IndicatorId, TrendDirection};

use crate::company::CompanyProfile;
use crate::precedent::HistoricalPrecedent;
use crate::rules::{OpportunityRule, RiskRule};
use crate::score::{score_opportunity, score_risk, OpportunityDetection, RiskDetection};

/// A deviation of 15+ points off the neutral 50 baseline in either
/// direction is treated as "notable" for pattern matching — precedents
/// carry no per-indicator threshold of their own, unlike rule-based
/// triggers.
const PATTERN_DEVIATION_THRESHOLD: f64 = 15.0;

pub fn detect_rule_based_risks(
    company: &CompanyProfile,
    indicator_values: &BTreeMap<IndicatorId, f64>,
    trend_directions: &BTreeMap<IndicatorId, TrendDirection>,
    catalog: &[RiskRule],
) -> Vec<DetectedRisk> {
    let mut risks = Vec::new();
    for rule in catalog {
        let mut triggering = BTreeMap::new();
        let mut severe = 0;
        let mut moderate = 0;

        for trigger in &rule.triggers {
            let Some(&value) = indicator_values.get(&trigger.indicator_id) else { continue };
            if !trigger.is_breached(value) {
                continue;
            }
            triggering.insert(trigger.indicator_id.clone(), value);
            if trigger.is_severe_breach(value) {
                severe += 1;
            } else {
                moderate += 1;
            }
        }

        if triggering.is_empty() {
            continue;
        }

        risks.push(score_risk(
            RiskDetection {
                code: rule.code.clone(),
                title: rule.title.clone(),
                description: rule.description.clone(),
                category: rule.category.clone(),
                base_probability: rule.base_probability,
                base_urgency: rule.base_urgency,
                triggering_indicators: triggering,
                severe_breaches: severe,
                moderate_breaches: moderate,
                method: DetectionMethod::RuleBased,
            },
            trend_directions,
            company,
        ));
    }
    risks
}

pub fn detect_pattern_risks(
    company: &CompanyProfile,
    indicator_values: &BTreeMap<IndicatorId, f64>,
    trend_directions: &BTreeMap<IndicatorId, TrendDirection>,
    precedents: &[HistoricalPrecedent],
) -> Vec<DetectedRisk> {
    let mut risks = Vec::new();
    for precedent in precedents {
        let mut triggering = BTreeMap::new();
        for indicator_id in &precedent.matching_indicators {
            if let Some(&value) = indicator_values.get(indicator_id) {
                if (value - 50.0).abs() >= PATTERN_DEVIATION_THRESHOLD {
                    triggering.insert(indicator_id.clone(), value);
                }
            }
        }

        if triggering.is_empty() {
            continue;
        }

        let description = format!("{} Historical precedent: {}", precedent.description, precedent.lessons_learned);

        risks.push(score_risk(
            RiskDetection {
                code: precedent.risk_code.clone(),
                title: precedent.title.clone(),
                description,
                category: precedent.category.clone(),
                base_probability: precedent.typical_probability,
                base_urgency: precedent.typical_urgency,
                triggering_indicators: triggering,
                severe_breaches: 0,
                moderate_breaches: 1,
                method: DetectionMethod::Pattern,
            },
            trend_directions,
            company,
        ));
    }
    risks
}

/// Groups detections by `code`, keeps the highest-confidence one, and
/// re-tags `detection_method = Combined` (with `Combined`'s confidence
/// floor re-applied) whenever more than one method fired for the same
/// code (`layer4_orchestrator.py::_deduplicate_risks`).
pub fn merge_risks(rule_risks: Vec<DetectedRisk>, pattern_risks: Vec<DetectedRisk>) -> Vec<DetectedRisk> {
    let mut grouped: BTreeMap<String, Vec<DetectedRisk>> = BTreeMap::new();
    for risk in rule_risks.into_iter().chain(pattern_risks) {
        grouped.entry(risk.code.clone()).or_default().push(risk);
    }

    grouped
        .into_values()
        .map(|mut group| {
            if group.len() == 1 {
                return group.pop().unwrap();
            }

            let methods_differ = group.iter().any(|r| r.detection_method != group[0].detection_method);
            let mut best =
                group.into_iter().max_by(|a, b| a.confidence.partial_cmp(&b.confidence).unwrap()).unwrap();

            if methods_differ {
                best.detection_method = DetectionMethod::Combined;
                best.confidence = best.confidence.max(0.90);
                best.final_score = newsroom_common::compute_final_score(
                    best.probability,
                    best.impact,
                    best.urgency,
                    best.confidence,
                );
                best.severity_level = newsroom_common::SeverityLevel::from_final_score(best.final_score);
                best.reasoning.push_str(" Confirmed by multiple detection methods.");
            }

            best
        })
        .collect()
}

pub fn detect_opportunities(
    company: &CompanyProfile,
    indicator_values: &BTreeMap<IndicatorId, f64>,
    catalog: &[OpportunityRule],
) -> Vec<DetectedOpportunity> {
    let mut opportunities = Vec::new();
    for rule in catalog {
        let mut triggering = BTreeMap::new();
        for trigger in &rule.triggers {
            if let Some(&value) = indicator_values.get(&trigger.indicator_id) {
                if trigger.is_breached(value) {
                    triggering.insert(trigger.indicator_id.clone(), value);
                }
            }
        }

        if triggering.is_empty() {
            continue;
        }

        opportunities.push(score_opportunity(
            OpportunityDetection {
                code: rule.code.clone(),
                title: rule.title.clone(),
                description: rule.description.clone(),
                category: rule.category.clone(),
                base_value: rule.base_value,
                base_feasibility: rule.base_feasibility,
                window_days: rule.window_days,
                triggering_indicators: triggering,
            },
            company,
        ));
    }
    opportunities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::company::{BusinessScale, DebtLevel};
    use crate::precedent::default_precedents;
    use crate::rules::{default_opportunity_catalog, default_risk_catalog};

    fn company() -> CompanyProfile {
        CompanyProfile {
            company_id: "c1".to_string(),
            company_name: "Acme".to_string(),
            industry: "manufacturing".to_string(),
            business_scale: BusinessScale::Medium,
            debt_level: DebtLevel::Moderate,
            cash_reserves: None,
            annual_revenue: None,
            revenue_currency: "LKR".to_string(),
            operational_dependencies: BTreeMap::new(),
        }
    }

    #[test]
    fn breached_indicator_fires_matching_rule() {
        let mut values = BTreeMap::new();
        values.insert("eco_currency".to_string(), 80.0);
        let risks = detect_rule_based_risks(&company(), &values, &BTreeMap::new(), &default_risk_catalog());
        assert!(risks.iter().any(|r| r.code == "currency_volatility"));
    }

    #[test]
    fn unbreached_indicators_fire_no_rules() {
        let mut values = BTreeMap::new();
        values.insert("eco_currency".to_string(), 50.0);
        let risks = detect_rule_based_risks(&company(), &values, &BTreeMap::new(), &default_risk_catalog());
        assert!(risks.is_empty());
    }

    #[test]
    fn double_detection_merges_into_combined() {
        let mut values = BTreeMap::new();
        values.insert("eco_currency".to_string(), 80.0);
        let rule_risks = detect_rule_based_risks(&company(), &values, &BTreeMap::new(), &default_risk_catalog());
        let pattern_risks =
            detect_pattern_risks(&company(), &values, &BTreeMap::new(), &default_precedents());
        assert!(rule_risks.iter().any(|r| r.code == "currency_volatility"));
        assert!(pattern_risks.iter().any(|r| r.code == "currency_volatility"));

        let merged = merge_risks(rule_risks, pattern_risks);
        let combined = merged.iter().find(|r| r.code == "currency_volatility").unwrap();
        assert_eq!(combined.detection_method, DetectionMethod::Combined);
        assert!(combined.confidence >= 0.90);
    }

    #[test]
    fn single_detection_keeps_its_own_method() {
        let mut values = BTreeMap::new();
        values.insert("tec_power".to_string(), 70.0);
        let rule_risks = detect_rule_based_risks(&company(), &values, &BTreeMap::new(), &default_risk_catalog());
        let merged = merge_risks(rule_risks, Vec::new());
        let risk = merged.iter().find(|r| r.code == "power_supply_risk").unwrap();
        assert_eq!(risk.detection_method, DetectionMethod::RuleBased);
    }

    #[test]
    fn opportunity_rule_fires_on_breach() {
        let mut values = BTreeMap::new();
        values.insert("eco_tourism".to_string(), 70.0);
        let opportunities = detect_opportunities(&company(), &values, &default_opportunity_catalog());
        assert!(opportunities.iter().any(|o| o.code == "tourism_rebound"));
    }
}
