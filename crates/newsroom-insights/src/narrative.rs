//! Narrative generation (spec §4.7 item 4): templated multi-paragraph
//! text with emoji markers, a direct port of
//! `narrative/generator.py::NarrativeGenerator`. LLM enhancement is
//! optional and uses the same key-rotation-backed `LlmClient` capability
//! as `newsroom-enrichment` (`groq_insight_service.py` reuses layer 2's
//! API key manager for exactly this); on any LLM failure, the rule-based
//! narrative below is the fallback, never an error.

use async_trait::async_trait;
use newsroom_common::{DetectedOpportunity, DetectedRisk, DetectionMethod, SeverityLevel};
use newsroom_core::capability::{LlmClient, LlmResponseSource};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::company::CompanyProfile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskNarrative {
    pub emoji: &'static str,
    pub headline: String,
    pub summary: String,
    pub detailed_explanation: String,
    pub why_now: String,
    pub what_it_means: String,
    pub historical_context: String,
    pub urgency_statement: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunityNarrative {
    pub emoji: &'static str,
    pub headline: String,
    pub summary: String,
    pub detailed_explanation: String,
    pub why_now: String,
    pub what_it_means: String,
    pub urgency_statement: String,
}

fn risk_emoji(severity: SeverityLevel) -> &'static str {
    match severity {
        SeverityLevel::Critical => "🚨",
        SeverityLevel::High => "⚠️",
        SeverityLevel::Medium => "⚡",
        SeverityLevel::Low => "ℹ️",
    }
}

fn opportunity_emoji(severity: SeverityLevel) -> &'static str {
    match severity {
        SeverityLevel::Critical | SeverityLevel::High => "🎯",
        SeverityLevel::Medium => "💡",
        SeverityLevel::Low => "🔍",
    }
}

fn timeframe_for_urgency(urgency: u8) -> &'static str {
    match urgency {
        5 => "within 24-48 hours",
        4 => "within this week",
        3 => "within the next two weeks",
        2 => "in the near term",
        1 => "over the coming period",
        _ => "in the foreseeable future",
    }
}

fn method_label(method: DetectionMethod) -> &'static str {
    match method {
        DetectionMethod::RuleBased => "Rule-Based Detection",
        DetectionMethod::Pattern => "Historical Pattern Matching",
        DetectionMethod::Ml => "Machine Learning Prediction",
        DetectionMethod::Combined => "Multiple Detection Methods",
    }
}

pub fn generate_risk_narrative(risk: &DetectedRisk, company: &CompanyProfile) -> RiskNarrative {
    let severity = risk.severity_level;

    let headline = format!("{:?} RISK: {}", severity, risk.title).to_uppercase();

    let summary = format!(
        "{}'s {} operations show {:?} signals. {} key indicators have reached concerning levels. \
         {:.0}% probability of impact {}.",
        company.company_name,
        risk.category,
        severity,
        risk.triggering_indicators.len(),
        risk.probability * 100.0,
        timeframe_for_urgency(risk.urgency),
    );

    let mut explanation = vec![format!("**Current Situation:**\n{}", risk.description)];
    if !risk.triggering_indicators.is_empty() {
        explanation.push("\n**Key Indicators:**".to_string());
        for (indicator, value) in &risk.triggering_indicators {
            explanation.push(format!("- {indicator}: {value:.1}/100"));
        }
    }
    explanation.push(format!("\n**Detection Method:** {}", method_label(risk.detection_method)));
    explanation.push(format!("\n**Company Context:** {:?} {} business", company.business_scale, company.industry));
    let detailed_explanation = explanation.join("\n");

    let why_now = match risk.urgency {
        5 => "IMMEDIATE ACTION REQUIRED - Impact expected within 24-48 hours".to_string(),
        4 => "URGENT - Address within this week to prevent escalation".to_string(),
        3 => "TIMELY - Action needed within 2 weeks to avoid deterioration".to_string(),
        2 => "MONITOR - Review situation and prepare response plan".to_string(),
        _ => "AWARENESS - Keep on radar for potential future impact".to_string(),
    };

    let mut impact_parts = vec![
        "**Potential Business Impact:**".to_string(),
        format!("- Severity: {:?} ({:.1}/10)", severity, risk.impact),
        format!("- Probability: {:.0}%", risk.probability * 100.0),
        format!("- Confidence: {:.0}%", risk.confidence * 100.0),
    ];
    if let Some(revenue) = company.annual_revenue {
        if revenue > 0.0 {
            let estimated_pct = (risk.impact / 10.0) * 0.20;
            let estimated_amount = revenue * estimated_pct;
            impact_parts.insert(
                2,
                format!(
                    "- Estimated revenue impact: {:.1}% (~{:.0} {})",
                    estimated_pct * 100.0,
                    estimated_amount,
                    company.revenue_currency
                ),
            );
        }
    }
    let what_it_means = impact_parts.join("\n");

    let historical_context = if risk.detection_method == DetectionMethod::Pattern
        || (risk.detection_method == DetectionMethod::Combined && risk.reasoning.contains("Historical precedent"))
    {
        format!("**Historical Precedent:**\n{}", risk.description)
    } else {
        String::new()
    };

    let urgency_statement = if risk.requires_immediate_action {
        "⏰ **IMMEDIATE ACTION REQUIRED** - Review recommendations and implement response plan today.".to_string()
    } else if risk.urgency >= 3 {
        "📅 **ACTION NEEDED SOON** - Schedule response planning within the next few days.".to_string()
    } else {
        "👁️ **MONITORING RECOMMENDED** - Track indicators and prepare contingency plans.".to_string()
    };

    RiskNarrative {
        emoji: risk_emoji(severity),
        headline,
        summary,
        detailed_explanation,
        why_now,
        what_it_means,
        historical_context,
        urgency_statement,
    }
}

pub fn generate_opportunity_narrative(
    opportunity: &DetectedOpportunity,
    company: &CompanyProfile,
) -> OpportunityNarrative {
    let severity = opportunity.severity_level;

    let headline = format!("{:?} PRIORITY OPPORTUNITY: {}", severity, opportunity.title).to_uppercase();

    let summary = format!(
        "{} has a {:?}-priority {} opportunity. Potential value score: {:.1}/10, feasibility: {:.0}%.",
        company.company_name,
        severity,
        opportunity.category,
        opportunity.impact,
        opportunity.probability * 100.0,
    );

    let mut explanation = vec![format!("**Opportunity Description:**\n{}", opportunity.description)];
    if !opportunity.triggering_indicators.is_empty() {
        explanation.push("\n**Triggering Factors:**".to_string());
        for (indicator, value) in &opportunity.triggering_indicators {
            explanation.push(format!("- {indicator}: {value:.1}"));
        }
    }
    explanation.push(format!("\n**Company Context:** {:?} {} business", company.business_scale, company.industry));
    let detailed_explanation = explanation.join("\n");

    let why_now = match opportunity.urgency {
        5 => "ACT QUICKLY - Window closing imminently".to_string(),
        4 | 3 => "TIMELY ACTION NEEDED - Act within the coming weeks".to_string(),
        _ => "PLAN AND EXECUTE - Longer window available".to_string(),
    };

    let mut value_parts = vec![
        "**Potential Business Value:**".to_string(),
        format!("- Value Score: {:.1}/10", opportunity.impact),
        format!("- Feasibility: {:.0}%", opportunity.probability * 100.0),
    ];
    if let Some(revenue) = company.annual_revenue {
        if revenue > 0.0 {
            let estimated_gain = revenue * (opportunity.impact / 10.0) * opportunity.probability * 0.10;
            value_parts.push(format!("- Estimated value: ~{:.0} {}", estimated_gain, company.revenue_currency));
        }
    }
    let what_it_means = value_parts.join("\n");

    let urgency_statement = if opportunity.urgency >= 4 {
        "🎯 **ACT NOW** - High-value opportunity with limited window. Begin implementation immediately.".to_string()
    } else if opportunity.urgency >= 3 {
        "💡 **PLAN AND EXECUTE** - Develop implementation plan and allocate resources soon.".to_string()
    } else {
        "🔍 **EVALUATE** - Assess feasibility and strategic alignment before committing resources.".to_string()
    };

    OpportunityNarrative {
        emoji: opportunity_emoji(severity),
        headline,
        summary,
        detailed_explanation,
        why_now,
        what_it_means,
        urgency_statement,
    }
}

/// Strict JSON output contract for LLM-enhanced risk narratives — the
/// model is asked to fill in these fields only, never free text.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LlmRiskNarrative {
    pub summary: String,
    pub detailed_explanation: String,
    pub what_it_means: String,
}

#[async_trait]
pub trait NarrativeEnhancer: Send + Sync {
    async fn enhance_risk(&self, risk: &DetectedRisk, base: &RiskNarrative) -> Option<LlmRiskNarrative>;
}

/// Always defers to the rule-based narrative (no model available).
pub struct NoopNarrativeEnhancer;

#[async_trait]
impl NarrativeEnhancer for NoopNarrativeEnhancer {
    async fn enhance_risk(&self, _risk: &DetectedRisk, _base: &RiskNarrative) -> Option<LlmRiskNarrative> {
        None
    }
}

/// Wraps any `LlmClient`, asking it to rewrite the summary/explanation
/// fields as JSON and falling back to `None` on any parse failure or
/// fallback-sourced response — the caller then keeps the rule-based text.
pub struct LlmNarrativeEnhancer<C: LlmClient> {
    client: C,
}

impl<C: LlmClient> LlmNarrativeEnhancer<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: LlmClient> NarrativeEnhancer for LlmNarrativeEnhancer<C> {
    async fn enhance_risk(&self, risk: &DetectedRisk, base: &RiskNarrative) -> Option<LlmRiskNarrative> {
        let system = "Rewrite the given risk narrative fields more naturally. \
                      Respond with JSON matching {summary, detailed_explanation, what_it_means} only.";
        let user = serde_json::to_string(&serde_json::json!({
            "title": risk.title,
            "category": risk.category,
            "summary": base.summary,
            "detailed_explanation": base.detailed_explanation,
            "what_it_means": base.what_it_means,
        }))
        .ok()?;

        let response = self.client.invoke(system, &user).await;
        if response.source == LlmResponseSource::Fallback {
            return None;
        }
        serde_json::from_str(&response.text).ok()
    }
}

/// Runs the rule-based narrative first, then tries the enhancer;
/// whatever the enhancer returns overwrites only the three LLM-owned
/// fields. A failed/absent enhancer leaves the rule-based text untouched.
pub async fn generate_enhanced_risk_narrative(
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

#[cfg(test)]
mod tests {
    use super::*;
    use newsroom_core::capability::LlmResponse;
    use std::collections::BTreeMap;

    fn company() -> CompanyProfile {
        CompanyProfile {
            company_id: "c1".to_string(),
            company_name: "Acme".to_string(),
            industry: "manufacturing".to_string(),
            business_scale: crate::company::BusinessScale::Medium,
            debt_level: crate::company::DebtLevel::Moderate,
            cash_reserves: None,
            annual_revenue: Some(5_000_000.0),
            revenue_currency: "LKR".to_string(),
            operational_dependencies: BTreeMap::new(),
        }
    }

    fn risk(urgency: u8, method: DetectionMethod) -> DetectedRisk {
        let mut triggering = BTreeMap::new();
        triggering.insert("eco_currency".to_string(), 80.0);
        DetectedRisk {
            code: "currency_volatility".to_string(),
            company_id: "c1".to_string(),
            title: "Currency volatility".to_string(),
            description: "Currency instability coverage is rising.".to_string(),
            category: "financial".to_string(),
            probability: 0.5,
            impact: 8.0,
            urgency,
            confidence: 0.85,
            final_score: 40.0,
            severity_level: SeverityLevel::Critical,
            triggering_indicators: triggering,
            detection_method: method,
            reasoning: "reasoning".to_string(),
            requires_immediate_action: urgency >= 4,
        }
    }

    #[test]
    fn critical_risk_gets_siren_emoji() {
        let narrative = generate_risk_narrative(&risk(5, DetectionMethod::RuleBased), &company());
        assert_eq!(narrative.emoji, "🚨");
        assert!(narrative.headline.contains("CRITICAL RISK"));
    }

    #[test]
    fn immediate_action_risk_gets_urgent_statement() {
        let narrative = generate_risk_narrative(&risk(5, DetectionMethod::RuleBased), &company());
        assert!(narrative.urgency_statement.contains("IMMEDIATE ACTION"));
    }

    #[tokio::test]
    async fn noop_enhancer_leaves_narrative_unchanged() {
        let base = generate_risk_narrative(&risk(3, DetectionMethod::RuleBased), &company());
        let enhanced = generate_enhanced_risk_narrative(&risk(3, DetectionMethod::RuleBased), &company(), &NoopNarrativeEnhancer).await;
        assert_eq!(enhanced.summary, base.summary);
    }

    struct FallbackLlm;
    #[async_trait::async_trait]
    impl LlmClient for FallbackLlm {
        async fn invoke(&self, _system: &str, _user: &str) -> LlmResponse {
            LlmResponse { text: String::new(), source: LlmResponseSource::Fallback }
        }
    }

    #[tokio::test]
    async fn llm_fallback_response_leaves_narrative_unchanged() {
        let base = generate_risk_narrative(&risk(3, DetectionMethod::RuleBased), &company());
        let enhancer = LlmNarrativeEnhancer::new(FallbackLlm);
        let enhanced =
            generate_enhanced_risk_narrative(&risk(3, DetectionMethod::RuleBased), &company(), &enhancer).await;
        assert_eq!(enhanced.summary, base.summary);
    }
}
