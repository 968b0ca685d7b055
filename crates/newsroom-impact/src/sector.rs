//! Sector relevance and cascade (spec §4.4 "Sector relevance"; supplemented
//! per SPEC_FULL.md §B.3): a closed set of 17 sectors, keyword matching,
//! event-type multipliers, and a weighted dependency DAG walked to depth 2
//! for cascade effects.

use std::collections::BTreeMap;

use crate::error::ImpactError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndustrySector {
    Tourism,
    Finance,
    Retail,
    Manufacturing,
    Agriculture,
    Transport,
    Energy,
    Healthcare,
    Construction,
    ItServices,
    Telecommunications,
    Apparel,
    TeaExport,
    Seafood,
    RealEstate,
    Education,
    General,
}

pub const ALL_SECTORS: [IndustrySector; 17] = [
    IndustrySector::Tourism,
    IndustrySector::Finance,
    IndustrySector::Retail,
    IndustrySector::Manufacturing,
    IndustrySector::Agriculture,
    IndustrySector::Transport,
    IndustrySector::Energy,
    IndustrySector::Healthcare,
    IndustrySector::Construction,
    IndustrySector::ItServices,
    IndustrySector::Telecommunications,
    IndustrySector::Apparel,
    IndustrySector::TeaExport,
    IndustrySector::Seafood,
    IndustrySector::RealEstate,
    IndustrySector::Education,
    IndustrySector::General,
];

fn sector_keywords(sector: IndustrySector) -> &'static [&'static str] {
    match sector {
        IndustrySector::Tourism => &["tourist", "tourism", "hotel", "resort", "visitor arrivals", "travel advisory"],
        IndustrySector::Finance => &["bank", "interest rate", "central bank", "lending", "credit", "forex", "treasury bill"],
        IndustrySector::Retail => &["retail", "supermarket", "consumer spending", "shopping", "store chain"],
        IndustrySector::Manufacturing => &["factory", "manufacturing", "industrial output", "production line", "assembly plant"],
        IndustrySector::Agriculture => &["farmer", "harvest", "paddy", "crop", "agriculture", "irrigation"],
        IndustrySector::Transport => &["transport", "railway", "bus strike", "fuel queue", "logistics", "freight"],
        IndustrySector::Energy => &["power plant", "electricity", "fuel", "petroleum", "grid", "energy supply"],
        IndustrySector::Healthcare => &["hospital", "healthcare", "medicine shortage", "health ministry", "patients"],
        IndustrySector::Construction => &["construction", "building permit", "cement", "infrastructure project"],
        IndustrySector::ItServices => &["software", "it services", "tech park", "data center", "outsourcing"],
        IndustrySector::Telecommunications => &["telecom", "mobile network", "broadband", "spectrum auction"],
        IndustrySector::Apparel => &["garment", "apparel", "textile", "clothing export"],
        IndustrySector::TeaExport => &["tea export", "tea auction", "tea estate", "tea industry"],
        IndustrySector::Seafood => &["fisheries", "seafood export", "fishing fleet", "fish catch"],
        IndustrySector::RealEstate => &["real estate", "property market", "housing price", "land value"],
        IndustrySector::Education => &["university", "school", "education ministry", "exam", "curriculum"],
        IndustrySector::General => &["economy", "business", "market", "industry"],
    }
}

fn sector_dependencies(sector: IndustrySector) -> &'static [(IndustrySector, f64)] {
    match sector {
        IndustrySector::Energy => &[
            (IndustrySector::Manufacturing, 0.9),
            (IndustrySector::Retail, 0.7),
            (IndustrySector::ItServices, 0.8),
            (IndustrySector::Transport, 0.6),
        ],
        IndustrySector::Transport => &[
            (IndustrySector::Retail, 0.8),
            (IndustrySector::Manufacturing, 0.7),
            (IndustrySector::Agriculture, 0.6),
            (IndustrySector::Tourism, 0.5),
        ],
        IndustrySector::Finance => &[
            (IndustrySector::RealEstate, 0.8),
            (IndustrySector::Construction, 0.7),
            (IndustrySector::Retail, 0.6),
        ],
        IndustrySector::Tourism => &[
            (IndustrySector::Transport, 0.7),
            (IndustrySector::Retail, 0.6),
            (IndustrySector::Healthcare, 0.3),
        ],
        IndustrySector::Agriculture => &[(IndustrySector::Retail, 0.7), (IndustrySector::Manufacturing, 0.5)],
        IndustrySector::Construction => &[(IndustrySector::RealEstate, 0.8), (IndustrySector::Manufacturing, 0.6)],
        IndustrySector::Telecommunications => &[
            (IndustrySector::ItServices, 0.8),
            (IndustrySector::Finance, 0.5),
            (IndustrySector::Retail, 0.4),
        ],
        _ => &[],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    FuelShortage,
    PowerCrisis,
    CurrencyCrisis,
    NaturalDisaster,
    PolicyChange,
}

const EVENT_PATTERNS: &[(EventType, &[&str])] = &[
    (EventType::FuelShortage, &["fuel", "petrol", "diesel", "shortage", "queue"]),
    (EventType::PowerCrisis, &["power cut", "load shedding", "electricity", "blackout"]),
    (EventType::CurrencyCrisis, &["dollar", "forex", "currency", "depreciation", "exchange rate"]),
    (EventType::NaturalDisaster, &["flood", "earthquake", "cyclone", "disaster", "tsunami"]),
    (EventType::PolicyChange, &["policy", "regulation", "gazette", "amendment", "new law"]),
];

pub fn detect_event_type(title: &str, content: &str) -> Option<EventType> {
    let text = format!("{title} {content}").to_lowercase();
    EVENT_PATTERNS
        .iter()
        .find(|(_, patterns)| patterns.iter().filter(|p| text.contains(**p)).count() >= 2)
        .map(|(event_type, _)| *event_type)
}

fn event_multiplier(event_type: EventType, sector: IndustrySector) -> Option<f64> {
    use IndustrySector::*;
    match event_type {
        EventType::FuelShortage => match sector {
            Transport => Some(1.5),
            Manufacturing => Some(1.3),
            Agriculture => Some(1.2),
            Tourism => Some(1.2),
            _ => None,
        },
        EventType::PowerCrisis => match sector {
            Manufacturing => Some(1.5),
            ItServices => Some(1.4),
            Healthcare => Some(1.3),
            Retail => Some(1.2),
            _ => None,
        },
        EventType::CurrencyCrisis => match sector {
            Finance => Some(1.5),
            Retail => Some(1.3),
            Manufacturing => Some(1.2),
            Apparel => Some(1.1),
            _ => None,
        },
        EventType::NaturalDisaster => match sector {
            Agriculture => Some(1.5),
            Tourism => Some(1.4),
            Construction => Some(1.3),
            Transport => Some(1.2),
            _ => None,
        },
        EventType::PolicyChange => match sector {
            Finance => Some(1.3),
            Retail => Some(1.2),
            Manufacturing => Some(1.2),
            _ => None,
        },
    }
}

const CRISIS_INTENSIFIER_KEYWORDS: &[&str] = &["crisis", "collapse", "emergency", "shutdown"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactType {
    Direct,
    Indirect,
    Cascading,
}

#[derive(Debug, Clone)]
pub struct SectorImpact {
    pub sector: IndustrySector,
    pub impact_score: f64,
    pub relevance_score: f64,
    pub keywords_matched: Vec<String>,
    pub impact_type: ImpactType,
}

#[derive(Debug, Clone)]
pub struct CascadeEffect {
    pub from_sector: IndustrySector,
    pub sector: IndustrySector,
    pub cascade_impact_score: f64,
    pub depth: u8,
}

#[derive(Debug, Clone)]
pub struct SectorAnalysisResult {
    pub primary_sectors: Vec<SectorImpact>,
    pub secondary_sectors: Vec<SectorImpact>,
    pub overall_sector_score: f64,
    pub sector_count: usize,
    pub cascade_effects: Vec<CascadeEffect>,
}

/// Weighted sector-dependency DAG. Acyclicity is validated once at
/// construction (spec §8: "implementations must validate acyclicity on
/// load"); `ALL_SECTORS`' static dependency table never cycles, so
/// construction only fails if the table is edited to introduce one.
pub struct SectorGraph {
    edges: BTreeMap<IndustrySector, Vec<(IndustrySector, f64)>>,
}

impl SectorGraph {
    pub fn new() -> Result<Self, ImpactError> {
        let mut edges = BTreeMap::new();
        for sector in ALL_SECTORS {
            edges.insert(sector, sector_dependencies(sector).to_vec());
        }
        let graph = Self { edges };
        graph.validate_acyclic()?;
        Ok(graph)
    }

    fn validate_acyclic(&self) -> Result<(), ImpactError> {
        #[derive(PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }
        let mut marks: BTreeMap<IndustrySector, Mark> = BTreeMap::new();

        fn visit(
            node: IndustrySector,
            edges: &BTreeMap<IndustrySector, Vec<(IndustrySector, f64)>>,
            marks: &mut BTreeMap<IndustrySector, Mark>,
        ) -> Result<(), ImpactError> {
            match marks.get(&node) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    return Err(ImpactError::CyclicSectorGraph(format!("{node:?}")));
                }
                None => {}
            }
            marks.insert(node, Mark::Visiting);
            if let Some(children) = edges.get(&node) {
                for (child, _) in children {
                    visit(*child, edges, marks)?;
                }
            }
            marks.insert(node, Mark::Done);
            Ok(())
        }

        for sector in ALL_SECTORS {
            visit(sector, &self.edges, &mut marks)?;
        }
        Ok(())
    }

    /// Cascade effects from `primary` outward, to depth 2: direct
    /// dependents (`primary.impact_score × strength × 0.7`, kept ≥20) and
    /// their own dependents (`× 0.6`, kept ≥25, capped to 2 extra entries).
    pub fn cascade(&self, primary: IndustrySector, primary_impact: f64) -> Vec<CascadeEffect> {
        let mut effects = Vec::new();
        let direct = self.edges.get(&primary).cloned().unwrap_or_default();

        for (child, strength) in &direct {
            let cascade_impact = primary_impact * strength * 0.7;
            if cascade_impact >= 20.0 {
                effects.push(CascadeEffect {
                    from_sector: primary,
                    sector: *child,
                    cascade_impact_score: cascade_impact,
                    depth: 1,
                });
            }
        }

        let mut second_order = Vec::new();
        for (child, strength) in &direct {
            let child_impact = primary_impact * strength;
            for (grandchild, strength2) in self.edges.get(child).cloned().unwrap_or_default() {
                let cascade_impact = child_impact * strength2 * 0.6;
                if cascade_impact >= 25.0 {
                    second_order.push(CascadeEffect {
                        from_sector: *child,
                        sector: grandchild,
                        cascade_impact_score: cascade_impact,
                        depth: 2,
                    });
                }
            }
        }
        second_order.sort_by(|a, b| b.cascade_impact_score.partial_cmp(&a.cascade_impact_score).unwrap());
        effects.extend(second_order.into_iter().take(2));

        effects.sort_by(|a, b| b.cascade_impact_score.partial_cmp(&a.cascade_impact_score).unwrap());
        effects.truncate(5);
        effects
    }
}

pub struct SectorImpactEngine {
    graph: SectorGraph,
}

impl SectorImpactEngine {
    pub fn new() -> Result<Self, ImpactError> {
        Ok(Self { graph: SectorGraph::new()? })
    }

    pub fn analyze_sectors(
        &self,
        title: &str,
        content: &str,
        target_sectors: Option<&[IndustrySector]>,
        event_type: Option<EventType>,
    ) -> SectorAnalysisResult {
        let full_text = format!("{title} {content}").to_lowercase();
        let title_lower = title.to_lowercase();

        let mut scored: Vec<SectorImpact> = ALL_SECTORS
            .iter()
            .filter(|s| target_sectors.map(|t| t.contains(s)).unwrap_or(true))
            .filter_map(|&sector| score_sector(sector, &full_text, &title_lower, event_type))
            .collect();

        scored.sort_by(|a, b| b.impact_score.partial_cmp(&a.impact_score).unwrap());

        let sector_count = scored.len();
        let mut secondary: Vec<SectorImpact> = if scored.len() > 3 { scored.split_off(3) } else { Vec::new() };
        secondary.truncate(3);
        let primary = scored;

        let overall_sector_score = if primary.is_empty() {
            0.0
        } else {
            primary.iter().map(|s| s.impact_score).sum::<f64>() / primary.len() as f64
        };

        let mut cascade_effects = Vec::new();
        for p in &primary {
            cascade_effects.extend(self.graph.cascade(p.sector, p.impact_score));
        }
        cascade_effects.sort_by(|a, b| b.cascade_impact_score.partial_cmp(&a.cascade_impact_score).unwrap());
        cascade_effects.truncate(5);

        for effect in &cascade_effects {
            if !primary.iter().any(|s| s.sector == effect.sector)
                && !secondary.iter().any(|s| s.sector == effect.sector)
                && secondary.len() < 5
            {
                secondary.push(SectorImpact {
                    sector: effect.sector,
                    impact_score: effect.cascade_impact_score,
                    relevance_score: effect.cascade_impact_score,
                    keywords_matched: Vec::new(),
                    impact_type: ImpactType::Cascading,
                });
            }
        }

        SectorAnalysisResult {
            primary_sectors: primary,
            secondary_sectors: secondary,
            overall_sector_score,
            sector_count,
            cascade_effects,
        }
    }
}

fn score_sector(
    sector: IndustrySector,
    full_text: &str,
    title_lower: &str,
    event_type: Option<EventType>,
) -> Option<SectorImpact> {
    let keywords = sector_keywords(sector);
    let matched: Vec<String> = keywords.iter().filter(|kw| full_text.contains(**kw)).map(|s| s.to_string()).collect();
    if matched.is_empty() {
        return None;
    }

    let match_ratio = matched.len() as f64 / keywords.len() as f64;
    let title_matches = matched.iter().filter(|kw| title_lower.contains(kw.as_str())).count();
    let title_boost = title_matches as f64 * 15.0;
    let multi_match_boost = (((matched.len() as f64) - 1.0) * 10.0).clamp(0.0, 30.0);

    let relevance_score = (match_ratio * 100.0 + title_boost + multi_match_boost).min(100.0);

    let mut impact_score = relevance_score * 0.7;
    if let Some(event_type) = event_type {
        if let Some(multiplier) = event_multiplier(event_type, sector) {
            impact_score *= multiplier;
        }
    }
    if CRISIS_INTENSIFIER_KEYWORDS.iter().any(|kw| full_text.contains(kw)) {
        impact_score *= 1.3;
    }
    impact_score = impact_score.min(100.0);

    Some(SectorImpact {
        sector,
        impact_score,
        relevance_score,
        keywords_matched: matched,
        impact_type: ImpactType::Direct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sector_graph_constructs_without_cycles() {
        assert!(SectorGraph::new().is_ok());
    }

    #[test]
    fn matching_keywords_in_title_boost_relevance() {
        let engine = SectorImpactEngine::new().unwrap();
        let result = engine.analyze_sectors(
            "Fuel shortage hits transport sector",
            "Bus operators report long queues at the petrol pump.",
            None,
            None,
        );
        assert!(result.primary_sectors.iter().any(|s| s.sector == IndustrySector::Transport));
    }

    #[test]
    fn event_type_multiplier_boosts_relevant_sector() {
        let engine = SectorImpactEngine::new().unwrap();
        let without = engine.analyze_sectors(
            "Transport update",
            "Bus routes adjusted for the logistics sector.",
            None,
            None,
        );
        let with = engine.analyze_sectors(
            "Transport update",
            "Bus routes adjusted for the logistics sector.",
            None,
            Some(EventType::FuelShortage),
        );
        let without_score = without.primary_sectors.iter().find(|s| s.sector == IndustrySector::Transport).unwrap().impact_score;
        let with_score = with.primary_sectors.iter().find(|s| s.sector == IndustrySector::Transport).unwrap().impact_score;
        assert!(with_score > without_score);
    }

    #[test]
    fn detects_event_type_from_two_or_more_pattern_hits() {
        assert_eq!(
            detect_event_type("Fuel queues", "Long petrol shortage reported at filling stations"),
            Some(EventType::FuelShortage)
        );
        assert_eq!(detect_event_type("Ordinary day", "Nothing happened"), None);
    }

    #[test]
    fn cascade_walks_energy_dependents_to_depth_two() {
        let graph = SectorGraph::new().unwrap();
        let effects = graph.cascade(IndustrySector::Energy, 100.0);
        assert!(effects.iter().any(|e| e.sector == IndustrySector::Manufacturing && e.depth == 1));
        assert!(effects.iter().all(|e| e.depth <= 2));
    }

    #[test]
    fn no_keyword_match_returns_no_sectors() {
        let engine = SectorImpactEngine::new().unwrap();
        let result = engine.analyze_sectors("asdf qwer", "zxcv poiu", None, None);
        assert!(result.primary_sectors.is_empty());
        assert_eq!(result.overall_sector_score, 0.0);
    }
}
