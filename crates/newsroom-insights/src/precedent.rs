//! Historical pattern precedents (supplemented feature, SPEC_FULL.md §B.5):
//! records with a `lessons_learned` field, looked up by category, feeding
//! the pattern-based risk detector named in spec §4.7 item 1. No
//! `historical_precedents.py` was retrieved, so the catalog below is
//! authored to mirror the risk catalog's categories.

#[derive(Debug, Clone)]
pub struct HistoricalPrecedent {
    pub risk_code: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub lessons_learned: String,
    pub typical_probability: f64,
    pub typical_urgency: u8,
    /// Indicators whose breach historically preceded this pattern.
    pub matching_indicators: Vec<String>,
}

pub fn default_precedents() -> Vec<HistoricalPrecedent> {
    vec![
        HistoricalPrecedent {
            risk_code: "currency_volatility".into(),
            category: "financial".into(),
            title: "Currency volatility (historical pattern)".into(),
            description: "A prior currency depreciation episode preceded by the same coverage pattern.".into(),
            lessons_learned: "Companies that hedged import costs early weathered the depreciation with \
                              materially lower margin compression than those that waited."
                .into(),
            typical_probability: 0.40,
            typical_urgency: 3,
            matching_indicators: vec!["eco_currency".into()],
        },
        HistoricalPrecedent {
            risk_code: "civil_unrest_exposure".into(),
            category: "operational".into(),
            title: "Civil unrest exposure (historical pattern)".into(),
            description: "A prior unrest episode with a comparable rise in political-coverage intensity.".into(),
            lessons_learned: "Firms with documented contingency staffing and remote-operation fallback \
                              plans sustained far less continuity disruption."
                .into(),
            typical_probability: 0.30,
            typical_urgency: 4,
            matching_indicators: vec!["pol_unrest".into()],
        },
        HistoricalPrecedent {
            risk_code: "power_supply_risk".into(),
            category: "operational".into(),
            title: "Power supply disruption (historical pattern)".into(),
            description: "A prior grid-stability episode with similar outage-coverage intensity.".into(),
            lessons_learned: "Sites with backup generation capacity reported negligible output loss \
                              compared to sites without."
                .into(),
            typical_probability: 0.35,
            typical_urgency: 3,
            matching_indicators: vec!["tec_power".into()],
        },
    ]
}
