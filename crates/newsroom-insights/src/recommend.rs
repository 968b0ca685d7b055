//! Action recommendations (spec §4.7 item 5). No `recommendation/engine.py`
//! was retrieved in the corpus; recommendations are authored from the
//! severity/urgency bands `score.rs` already computes, banded into the
//! four horizons spec §4.7 names.

use newsroom_common::{DetectedOpportunity, DetectedRisk, SeverityLevel};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    Immediate,
    ShortTerm,
    MediumTerm,
    LongTerm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: RecommendationCategory,
    /// 1 is highest priority.
    pub priority: u8,
    pub action: String,
}

fn horizon_for_urgency(urgency: u8) -> RecommendationCategory {
    match urgency {
        5 | 4 => RecommendationCategory::Immediate,
        3 => RecommendationCategory::ShortTerm,
        2 => RecommendationCategory::MediumTerm,
        _ => RecommendationCategory::LongTerm,
    }
}

pub fn generate_risk_recommendations(risk: &DetectedRisk) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    let horizon = horizon_for_urgency(risk.urgency);

    recommendations.push(Recommendation {
        category: horizon,
        priority: 1,
        action: format!("Review exposure to {} and brief leadership on the {:?} severity finding.", risk.title, risk.severity_level),
    });

    if risk.requires_immediate_action {
        recommendations.push(Recommendation {
            category: RecommendationCategory::Immediate,
            priority: 1,
            action: format!("Activate contingency response for {} — estimated impact within 24-48 hours.", risk.title),
        });
    }

    match risk.category.as_str() {
        "financial" => recommendations.push(Recommendation {
            category: RecommendationCategory::ShortTerm,
            priority: 2,
            action: "Hedge or renegotiate exposed contracts to limit currency/cost pass-through.".to_string(),
        }),
        "operational" => recommendations.push(Recommendation {
            category: RecommendationCategory::ShortTerm,
            priority: 2,
            action: "Stress-test continuity plans for the affected operational dependency.".to_string(),
        }),
        "compliance" => recommendations.push(Recommendation {
            category: RecommendationCategory::ShortTerm,
            priority: 2,
            action: "Confirm regulatory/workforce obligations remain met under the current conditions.".to_string(),
        }),
        "competitive" => recommendations.push(Recommendation {
            category: RecommendationCategory::MediumTerm,
            priority: 3,
            action: "Reassess demand forecasts and pricing strategy against the competitive signal.".to_string(),
        }),
        _ => {}
    }

    recommendations.push(Recommendation {
        category: RecommendationCategory::LongTerm,
        priority: 4,
        action: format!("Track {} indicators for sustained deterioration or recovery.", risk.category),
    });

    recommendations
}

pub fn generate_opportunity_recommendations(opportunity: &DetectedOpportunity) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    let horizon = horizon_for_urgency(opportunity.urgency);

    recommendations.push(Recommendation {
        category: horizon,
        priority: 1,
        action: format!("Evaluate feasibility of capturing {} before the window narrows.", opportunity.title),
    });

    if matches!(opportunity.severity_level, SeverityLevel::Critical | SeverityLevel::High) {
        recommendations.push(Recommendation {
            category: RecommendationCategory::ShortTerm,
            priority: 2,
            action: format!("Allocate resources to pursue {} — high value score with workable feasibility.", opportunity.title),
        });
    }

    recommendations.push(Recommendation {
        category: RecommendationCategory::MediumTerm,
        priority: 3,
        action: format!("Build a go/no-go review for {} into the next planning cycle.", opportunity.category),
    });

    recommendations
}
