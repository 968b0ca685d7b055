//! Pure classification of a similarity score into a duplicate verdict
//! (spec §4.2 step 4). Closed-below boundaries: a score exactly at a
//! threshold belongs to the higher band.

use newsroom_common::config::DedupConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateType {
    Unique,
    Related,
    NearDuplicate,
    ExactDuplicate,
}

pub fn classify(score: f64, config: &DedupConfig) -> DuplicateType {
    if score >= config.threshold_exact {
        DuplicateType::ExactDuplicate
    } else if score >= config.threshold_near {
        DuplicateType::NearDuplicate
    } else if score >= config.threshold_related {
        DuplicateType::Related
    } else {
        DuplicateType::Unique
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DedupConfig {
        DedupConfig::default()
    }

    #[test]
    fn exact_at_0_95() {
        assert_eq!(classify(0.95, &config()), DuplicateType::ExactDuplicate);
    }

    #[test]
    fn near_at_0_85() {
        assert_eq!(classify(0.85, &config()), DuplicateType::NearDuplicate);
    }

    #[test]
    fn related_at_0_70() {
        assert_eq!(classify(0.70, &config()), DuplicateType::Related);
    }

    #[test]
    fn unique_below_0_70() {
        assert_eq!(classify(0.69, &config()), DuplicateType::Unique);
    }

    #[test]
    fn just_below_exact_is_near() {
        assert_eq!(classify(0.9499, &config()), DuplicateType::NearDuplicate);
    }
}
