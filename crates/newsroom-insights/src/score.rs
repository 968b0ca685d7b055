//! Risk/opportunity scoring (spec §4.7 item 3), a direct port of
//! `risk_scorer.py::RiskScorer`: `final_score = probability × impact ×
//! urgency × confidence`, severity bands at 40/30/15.

use std::collections::BTreeMap;

use newsroom_common::{
    compute_final_score, DetectedOpportunity, DetectedRisk, DetectionMethod, IndicatorId, SeverityLevel,
    TrendDirection,
};

use crate::company::CompanyProfile;

fn is_falling(direction: TrendDirection) -> bool {
    matches!(direction, TrendDirection::WeakFalling | TrendDirection::Falling | TrendDirection::StrongFalling)
}

/// Base severity-if-it-occurs by risk category (`risk_scorer.py`'s
/// `category_impacts`); unnamed categories fall back to the analyzer's
/// own mid-range estimate.
fn category_impact_base(category: &str) -> f64 {
    match category {
        "operational" => 7.0,
        "financial" => 8.0,
        "competitive" => 6.0,
        "reputational" => 6.5,
        "compliance" => 5.5,
        "strategic" => 7.5,
        _ => 6.0,
    }
}

fn method_confidence(method: DetectionMethod) -> f64 {
    match method {
        DetectionMethod::RuleBased => 0.85,
        DetectionMethod::Pattern => 0.80,
        DetectionMethod::Ml => 0.75,
        DetectionMethod::Combined => 0.90,
    }
}

pub struct RiskDetection {
    pub code: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub base_probability: f64,
    pub base_urgency: u8,
    pub triggering_indicators: BTreeMap<IndicatorId, f64>,
    pub severe_breaches: usize,
    pub moderate_breaches: usize,
    pub method: DetectionMethod,
}

/// Ports `RiskScorer.calculate_risk_score` end to end: probability,
/// impact, urgency, confidence, then `final_score` and its severity band.
pub fn score_risk(
    detection: RiskDetection,
    trend_directions: &BTreeMap<IndicatorId, TrendDirection>,
    company: &CompanyProfile,
) -> DetectedRisk {
    let mut probability = detection.base_probability;
    probability += detection.severe_breaches as f64 * 0.10 + detection.moderate_breaches as f64 * 0.05;
    let falling_total = trend_directions.values().filter(|d| is_falling(**d)).count();
    if falling_total > 3 {
        probability += 0.05;
    }
    probability = probability.min(1.0);

    let mut impact = category_impact_base(&detection.category);
    impact *= company.business_scale.impact_multiplier();
    impact *= company.debt_impact_modifier();
    if detection.category == "operational" && company.critical_dependency_count() >= 2 {
        impact *= 1.10;
    } else if detection.category == "financial" && matches!(company.debt_level, crate::company::DebtLevel::High) {
        impact *= 1.20;
    }
    impact = impact.min(10.0);

    let rapid_decline = detection
        .triggering_indicators
        .keys()
        .filter(|id| trend_directions.get(*id).copied().is_some_and(is_falling))
        .count();
    let mut urgency = detection.base_urgency;
    if rapid_decline >= 2 {
        urgency = (urgency + 1).min(5);
    }
    urgency = urgency.clamp(1, 5);

    let mut confidence: f64 = 0.5;
    confidence = confidence.max(method_confidence(detection.method));
    let num_indicators = detection.triggering_indicators.len();
    if num_indicators >= 3 {
        confidence += 0.05;
    } else if num_indicators == 1 {
        confidence -= 0.05;
    }
    confidence = confidence.clamp(0.0, 1.0);

    let final_score = compute_final_score(probability, impact, urgency, confidence);
    let severity_level = SeverityLevel::from_final_score(final_score);
    let requires_immediate_action =
        matches!(severity_level, SeverityLevel::Critical | SeverityLevel::High) && urgency >= 4;

    let reasoning = format!(
        "{:.0}% base probability from {:?} detection; {} indicator(s) triggering \
         ({} severe, {} moderate breach). {} category impact with {:?} scale and {:?} debt.",
        detection.base_probability * 100.0,
        detection.method,
        num_indicators,
        detection.severe_breaches,
        detection.moderate_breaches,
        detection.category,
        company.business_scale,
        company.debt_level,
    );

    DetectedRisk {
        code: detection.code,
        company_id: company.company_id.clone(),
        title: detection.title,
        description: detection.description,
        category: detection.category,
        probability,
        impact,
        urgency,
        confidence,
        final_score,
        severity_level,
        triggering_indicators: detection.triggering_indicators,
        detection_method: detection.method,
        reasoning,
        requires_immediate_action,
    }
}

pub struct OpportunityDetection {
    pub code: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub base_value: f64,
    pub base_feasibility: f64,
    pub window_days: u32,
    pub triggering_indicators: BTreeMap<IndicatorId, f64>,
}

/// Rule-based only (spec §4.7 item 2): `business_scale` adjusts
/// feasibility rather than impact. No `opportunity_scorer.py` source was
/// retrieved; the scale modifier direction (smaller companies move
/// faster, so feasibility is higher) is an Open Question resolution.
pub fn score_opportunity(detection: OpportunityDetection, company: &CompanyProfile) -> DetectedOpportunity {
    let feasibility_modifier = match company.business_scale {
        crate::company::BusinessScale::Small => 1.15,
        crate::company::BusinessScale::Medium => 1.0,
        crate::company::BusinessScale::Large => 0.95,
        crate::company::BusinessScale::Enterprise => 0.85,
    };
    let feasibility = (detection.base_feasibility * feasibility_modifier).min(1.0);

    let value = (detection.base_value + detection.triggering_indicators.len() as f64 * 0.2).min(10.0);

    let urgency: u8 = if detection.window_days <= 7 {
        5
    } else if detection.window_days <= 30 {
        3
    } else {
        2
    };

    let confidence = method_confidence(DetectionMethod::RuleBased);
    let final_score = compute_final_score(feasibility, value, urgency, confidence);
    let severity_level = SeverityLevel::from_final_score(final_score);
    let requires_immediate_action =
        matches!(severity_level, SeverityLevel::Critical | SeverityLevel::High) && urgency >= 4;

    let reasoning = format!(
        "{} category opportunity, {:.0}% feasibility ({:?} scale), {}-day window.",
        detection.category,
        feasibility * 100.0,
        company.business_scale,
        detection.window_days,
    );

    DetectedOpportunity {
        code: detection.code,
        company_id: company.company_id.clone(),
        title: detection.title,
        description: detection.description,
        category: detection.category,
        probability: feasibility,
        impact: value,
        urgency,
        confidence,
        final_score,
        severity_level,
        triggering_indicators: detection.triggering_indicators,
        detection_method: DetectionMethod::RuleBased,
        reasoning,
        requires_immediate_action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::company::{BusinessScale, DebtLevel};
    use std::collections::BTreeMap;

    fn company(scale: BusinessScale, debt: DebtLevel) -> CompanyProfile {
        CompanyProfile {
            company_id: "c1".to_string(),
            company_name: "Acme".to_string(),
            industry: "manufacturing".to_string(),
            business_scale: scale,
            debt_level: debt,
            cash_reserves: None,
            annual_revenue: Some(10_000_000.0),
            revenue_currency: "LKR".to_string(),
            operational_dependencies: BTreeMap::new(),
        }
    }

    fn detection(severe: usize, moderate: usize, method: DetectionMethod) -> RiskDetection {
        let mut triggering = BTreeMap::new();
        triggering.insert("eco_currency".to_string(), 75.0);
        RiskDetection {
            code: "currency_volatility".to_string(),
            title: "Currency volatility".to_string(),
            description: "desc".to_string(),
            category: "financial".to_string(),
            base_probability: 0.35,
            base_urgency: 3,
            triggering_indicators: triggering,
            severe_breaches: severe,
            moderate_breaches: moderate,
            method,
        }
    }

    #[test]
    fn small_company_gets_higher_impact_than_enterprise() {
        let trends = BTreeMap::new();
        let small = score_risk(detection(1, 0, DetectionMethod::RuleBased), &trends, &company(BusinessScale::Small, DebtLevel::Moderate));
        let enterprise = score_risk(
            detection(1, 0, DetectionMethod::RuleBased),
            &trends,
            &company(BusinessScale::Enterprise, DebtLevel::Moderate),
        );
        assert!(small.impact > enterprise.impact);
    }

    #[test]
    fn combined_method_has_highest_confidence_floor() {
        let trends = BTreeMap::new();
        let combined =
            score_risk(detection(0, 1, DetectionMethod::Combined), &trends, &company(BusinessScale::Medium, DebtLevel::Moderate));
        assert!(combined.confidence >= 0.90);
    }

    #[test]
    fn severity_bands_match_named_thresholds() {
        assert_eq!(SeverityLevel::from_final_score(45.0), SeverityLevel::Critical);
        assert_eq!(SeverityLevel::from_final_score(32.0), SeverityLevel::High);
        assert_eq!(SeverityLevel::from_final_score(20.0), SeverityLevel::Medium);
        assert_eq!(SeverityLevel::from_final_score(5.0), SeverityLevel::Low);
    }

    #[test]
    fn short_window_opportunity_gets_high_urgency() {
        let mut triggering = BTreeMap::new();
        triggering.insert("eco_tourism".to_string(), 70.0);
        let opp = score_opportunity(
            OpportunityDetection {
                code: "tourism_rebound".to_string(),
                title: "Tourism rebound".to_string(),
                description: "desc".to_string(),
                category: "strategic".to_string(),
                base_value: 7.0,
                base_feasibility: 0.6,
                window_days: 5,
                triggering_indicators: triggering,
            },
            &company(BusinessScale::Medium, DebtLevel::Moderate),
        );
        assert_eq!(opp.urgency, 5);
    }
}
