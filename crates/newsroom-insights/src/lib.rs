pub mod company;
pub mod detect;
pub mod error;
pub mod narrative;
pub mod portfolio;
pub mod precedent;
pub mod recommend;
pub mod rules;
pub mod run;
pub mod score;

pub use company::{BusinessScale, CompanyProfile, DebtLevel, DependencyCriticality};
pub use detect::{detect_opportunities, detect_pattern_risks, detect_rule_based_risks, merge_risks};
pub use error::InsightError;
pub use narrative::{
    generate_enhanced_risk_narrative, generate_opportunity_narrative, generate_risk_narrative, LlmNarrativeEnhancer,
    LlmRiskNarrative, NarrativeEnhancer, NoopNarrativeEnhancer, OpportunityNarrative, RiskNarrative,
};
pub use portfolio::{calculate_portfolio_metrics, top_priority_opportunities, top_priority_risks, PortfolioMetrics};
pub use precedent::{default_precedents, HistoricalPrecedent};
pub use recommend::{
    generate_opportunity_recommendations, generate_risk_recommendations, Recommendation, RecommendationCategory,
};
pub use rules::{default_opportunity_catalog, default_risk_catalog, IndicatorTrigger, Operator, OpportunityRule, RiskRule};
pub use run::{noop_enhancer, InsightEngine, InsightRunSummary, OpportunityInsight, RiskInsight};
pub use score::{score_opportunity, score_risk, OpportunityDetection, RiskDetection};
