use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Proficiency {
    Basic,
    Intermediate,
    Advanced,
    Proficient,
}

/// Tiers by total score, checked highest first.
pub fn classify(total: usize) -> Proficiency {
    match total {
        35.. => Proficiency::Proficient,
        28..=34 => Proficiency::Advanced,
        20..=27 => Proficiency::Intermediate,
        _ => Proficiency::Basic,
    }
}

impl Proficiency {
    pub fn label(&self) -> &'static str {
        match self {
            Proficiency::Basic => "Basic",
            Proficiency::Intermediate => "Intermediate",
            Proficiency::Advanced => "Advanced",
            Proficiency::Proficient => "Proficient",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Proficiency::Basic => "Foundation level with room for growth",
            Proficiency::Intermediate => "Good understanding of essential grammar rules",
            Proficiency::Advanced => "Strong grasp of complex grammatical structures",
            Proficiency::Proficient => "Exceptional command of English grammar",
        }
    }

    /// Machine-readable tier tag.
    pub fn category(&self) -> &'static str {
        match self {
            Proficiency::Basic => "basic",
            Proficiency::Intermediate => "intermediate",
            Proficiency::Advanced => "advanced",
            Proficiency::Proficient => "proficient",
        }
    }
}

impl fmt::Display for Proficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_land_on_the_documented_side() {
        assert_eq!(classify(34), Proficiency::Advanced);
        assert_eq!(classify(35), Proficiency::Proficient);
        assert_eq!(classify(19), Proficiency::Basic);
        assert_eq!(classify(20), Proficiency::Intermediate);
        assert_eq!(classify(27), Proficiency::Intermediate);
        assert_eq!(classify(28), Proficiency::Advanced);
    }

    #[test]
    fn extremes() {
        assert_eq!(classify(0), Proficiency::Basic);
        assert_eq!(classify(40), Proficiency::Proficient);
        assert_eq!(classify(40).label(), "Proficient");
    }

    #[test]
    fn tiers_are_monotonic_in_score() {
        let tiers: Vec<Proficiency> = (0..=40).map(classify).collect();
        assert!(tiers.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn every_tier_has_text() {
        for tier in [
            Proficiency::Basic,
            Proficiency::Intermediate,
            Proficiency::Advanced,
            Proficiency::Proficient,
        ] {
            assert!(!tier.description().is_empty());
            assert_eq!(tier.to_string(), tier.label());
            assert_eq!(tier.category(), tier.label().to_lowercase());
        }
    }
}
