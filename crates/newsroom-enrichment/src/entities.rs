//! Entity extraction (spec §4.5 item 3): a ranked list over a closed
//! ontology (`newsroom_common::EntityType`); failure returns an empty list,
//! never an error. No teacher analogue extracts entities, so the regex
//! heuristics below are built directly from the closed ontology and the
//! `OnceLock<Regex>` idiom used throughout `newsroom-cache`/`newsroom-impact`.

use std::sync::OnceLock;

use regex::Regex;

use newsroom_common::{Entity, EntityType};

fn money_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:(?:rs\.?|usd|\$|€|£)\s?[\d,]+(?:\.\d+)?\s?(?:million|billion|trillion)?|[\d,]+(?:\.\d+)?\s?(?:million|billion|trillion)\s?(?:rupees|dollars|usd))")
            .expect("valid money regex")
    })
}

fn event_keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(election|summit|conference|protest|strike|earthquake|flood|cyclone|curfew|referendum)\b")
            .expect("valid event regex")
    })
}

fn organization_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b([A-Z][\w&.]*(?:\s+[A-Z][\w&.]*){0,3}\s+(?:Ministry|Authority|Corporation|Bank|Commission|Council|Board|Company|Ltd|Inc|Party|Union))\b")
            .expect("valid organization regex")
    })
}

fn location_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)\s+(?:District|Province|region|city|town)\b").expect("valid location regex")
    })
}

fn person_title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:President|Prime Minister|Minister|Governor|Senator|Dr\.|Mr\.|Ms\.|Mrs\.)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)\b")
            .expect("valid person regex")
    })
}

/// Extracts a ranked list of entities from title+body text. Returns an
/// empty `Vec` on any malformed input rather than propagating an error —
/// entity extraction is advisory, never load-bearing for the pipeline.
pub fn extract_entities(title: &str, body: &str) -> Vec<Entity> {
    let combined = format!("{title} {body}");
    let mut entities: Vec<Entity> = Vec::new();

    for caps in person_title_re().captures_iter(&combined) {
        push_entity(&mut entities, &caps[1], EntityType::Person, 0.8);
    }
    for caps in organization_suffix_re().captures_iter(&combined) {
        push_entity(&mut entities, &caps[1], EntityType::Organization, 0.7);
    }
    for caps in location_re().captures_iter(&combined) {
        push_entity(&mut entities, &caps[1], EntityType::Location, 0.6);
    }
    for m in money_re().find_iter(&combined) {
        push_entity(&mut entities, m.as_str(), EntityType::Money, 0.75);
    }
    for m in event_keyword_re().find_iter(&combined) {
        push_entity(&mut entities, m.as_str(), EntityType::Event, 0.5);
    }

    entities.sort_by(|a, b| b.importance.partial_cmp(&a.importance).expect("importance is never NaN"));
    entities
}

fn push_entity(entities: &mut Vec<Entity>, text: &str, entity_type: EntityType, base_importance: f64) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if let Some(existing) = entities.iter_mut().find(|e| e.text.eq_ignore_ascii_case(text) && e.entity_type == entity_type) {
        existing.importance = (existing.importance + 0.1).min(1.0);
        return;
    }
    entities.push(Entity { text: text.to_string(), entity_type, importance: base_importance });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_person_with_title() {
        let entities = extract_entities("President Fernando addresses the nation", "In a televised address President Fernando outlined new measures.");
        let person = entities.iter().find(|e| e.entity_type == EntityType::Person);
        assert!(person.is_some());
        assert_eq!(person.unwrap().text, "Fernando");
    }

    #[test]
    fn extracts_organization_with_known_suffix() {
        let entities = extract_entities("Central Bank raises rates", "The Central Bank announced a policy shift today.");
        assert!(entities.iter().any(|e| e.entity_type == EntityType::Organization));
    }

    #[test]
    fn extracts_money_amount() {
        let entities = extract_entities("Budget allocates new funds", "The budget allocates Rs. 500 million for relief efforts.");
        assert!(entities.iter().any(|e| e.entity_type == EntityType::Money));
    }

    #[test]
    fn repeated_mentions_increase_importance() {
        let entities = extract_entities("Central Bank statement", "The Central Bank spoke today. Later, the Central Bank clarified its statement.");
        let org = entities.iter().find(|e| e.entity_type == EntityType::Organization).unwrap();
        assert!(org.importance > 0.7);
    }

    #[test]
    fn text_with_no_entities_returns_empty_list() {
        let entities = extract_entities("Quiet afternoon", "Nothing of note happened in the village today.");
        assert!(entities.is_empty());
    }
}
