//! The rule catalog a rule-based detector applies against
//! triggering-indicator thresholds (spec §4.7 item 1). Indicator ids and
//! the "severe vs. moderate breach" banding (20% beyond threshold) are
//! ported from `risk_scorer.py::_calculate_probability`; no
//! `risk_catalog.py`/`opportunity_catalog.py` was retrieved, so the
//! concrete rule set below is authored from the ten indicator ids in
//! `newsroom-indicators::classify` and the six risk categories named in
//! `risk_scorer.py`'s `category_impacts`.

use newsroom_common::IndicatorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    LessThan,
    GreaterThan,
}

#[derive(Debug, Clone)]
pub struct IndicatorTrigger {
    pub indicator_id: IndicatorId,
    pub threshold: f64,
    pub operator: Operator,
}

impl IndicatorTrigger {
    pub fn new(indicator_id: &str, threshold: f64, operator: Operator) -> Self {
        Self { indicator_id: indicator_id.to_string(), threshold, operator }
    }

    /// `true` once `value` has crossed the threshold in the risky
    /// direction.
    pub fn is_breached(&self, value: f64) -> bool {
        match self.operator {
            Operator::LessThan => value < self.threshold,
            Operator::GreaterThan => value > self.threshold,
        }
    }

    /// `true` when the breach is 20%+ past the threshold — the "severe"
    /// band from `risk_scorer.py`; otherwise a breach is "moderate".
    pub fn is_severe_breach(&self, value: f64) -> bool {
        match self.operator {
            Operator::LessThan => value < self.threshold * 0.8,
            Operator::GreaterThan => value > self.threshold * 1.2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RiskRule {
    pub code: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub base_probability: f64,
    pub base_urgency: u8,
    pub triggers: Vec<IndicatorTrigger>,
}

pub fn default_risk_catalog() -> Vec<RiskRule> {
    vec![
        RiskRule {
            code: "supply_chain_disruption".into(),
            title: "Supply chain disruption risk".into(),
            description: "Transport and logistics coverage points to mounting supply chain disruption.".into(),
            category: "operational".into(),
            base_probability: 0.30,
            base_urgency: 3,
            triggers: vec![IndicatorTrigger::new("ops_transport", 60.0, Operator::GreaterThan)],
        },
        RiskRule {
            code: "currency_volatility".into(),
            title: "Currency volatility exposure".into(),
            description: "Currency instability coverage has risen past the concern threshold.".into(),
            category: "financial".into(),
            base_probability: 0.35,
            base_urgency: 3,
            triggers: vec![IndicatorTrigger::new("eco_currency", 60.0, Operator::GreaterThan)],
        },
        RiskRule {
            code: "inflation_cost_pressure".into(),
            title: "Inflation-driven cost pressure".into(),
            description: "Inflation coverage suggests sustained upward pressure on input costs.".into(),
            category: "financial".into(),
            base_probability: 0.30,
            base_urgency: 2,
            triggers: vec![IndicatorTrigger::new("eco_inflation", 60.0, Operator::GreaterThan)],
        },
        RiskRule {
            code: "civil_unrest_exposure".into(),
            title: "Civil unrest exposure".into(),
            description: "Political unrest coverage threatens continuity of operations.".into(),
            category: "operational".into(),
            base_probability: 0.25,
            base_urgency: 4,
            triggers: vec![IndicatorTrigger::new("pol_unrest", 60.0, Operator::GreaterThan)],
        },
        RiskRule {
            code: "power_supply_risk".into(),
            title: "Power supply disruption risk".into(),
            description: "Power outage coverage has crossed the disruption threshold.".into(),
            category: "operational".into(),
            base_probability: 0.30,
            base_urgency: 3,
            triggers: vec![IndicatorTrigger::new("tec_power", 60.0, Operator::GreaterThan)],
        },
        RiskRule {
            code: "consumer_demand_slump".into(),
            title: "Consumer demand slump".into(),
            description: "Consumer confidence has fallen below the demand-risk threshold.".into(),
            category: "competitive".into(),
            base_probability: 0.25,
            base_urgency: 2,
            triggers: vec![IndicatorTrigger::new("eco_consumer_conf", 40.0, Operator::LessThan)],
        },
        RiskRule {
            code: "extreme_weather_disruption".into(),
            title: "Extreme weather disruption".into(),
            description: "Severe weather coverage points to operational disruption risk.".into(),
            category: "operational".into(),
            base_probability: 0.20,
            base_urgency: 3,
            triggers: vec![IndicatorTrigger::new("env_weather", 60.0, Operator::GreaterThan)],
        },
        RiskRule {
            code: "healthcare_workforce_risk".into(),
            title: "Healthcare/workforce disruption risk".into(),
            description: "Healthcare-system coverage suggests workforce availability risk.".into(),
            category: "compliance".into(),
            base_probability: 0.20,
            base_urgency: 2,
            triggers: vec![IndicatorTrigger::new("soc_healthcare", 60.0, Operator::GreaterThan)],
        },
    ]
}

#[derive(Debug, Clone)]
pub struct OpportunityRule {
    pub code: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub base_value: f64,
    pub base_feasibility: f64,
    pub window_days: u32,
    pub triggers: Vec<IndicatorTrigger>,
}

pub fn default_opportunity_catalog() -> Vec<OpportunityRule> {
    vec![
        OpportunityRule {
            code: "tourism_rebound".into(),
            title: "Tourism demand rebound".into(),
            description: "Positive tourism coverage signals a window to expand hospitality-linked offerings.".into(),
            category: "strategic".into(),
            base_value: 7.0,
            base_feasibility: 0.6,
            window_days: 60,
            triggers: vec![IndicatorTrigger::new("eco_tourism", 65.0, Operator::GreaterThan)],
        },
        OpportunityRule {
            code: "consumer_confidence_upswing".into(),
            title: "Consumer confidence upswing".into(),
            description: "Rising consumer confidence coverage supports demand-side expansion.".into(),
            category: "competitive".into(),
            base_value: 6.0,
            base_feasibility: 0.65,
            window_days: 45,
            triggers: vec![IndicatorTrigger::new("eco_consumer_conf", 65.0, Operator::GreaterThan)],
        },
        OpportunityRule {
            code: "logistics_capacity_opening".into(),
            title: "Logistics capacity opening".into(),
            description: "Improving transport coverage suggests freed-up logistics capacity.".into(),
            category: "operational".into(),
            base_value: 5.5,
            base_feasibility: 0.55,
            window_days: 30,
            triggers: vec![IndicatorTrigger::new("ops_transport", 40.0, Operator::LessThan)],
        },
    ]
}
