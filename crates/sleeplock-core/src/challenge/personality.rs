//! Big Five personality profile chosen by the one-question quiz.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    Extraversion,
    Conscientiousness,
    Agreeableness,
    Neuroticism,
    Openness,
}

impl Personality {
    pub const ALL: [Personality; 5] = [
        Personality::Extraversion,
        Personality::Conscientiousness,
        Personality::Agreeableness,
        Personality::Neuroticism,
        Personality::Openness,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Personality::Extraversion => "extraversion",
            Personality::Conscientiousness => "conscientiousness",
            Personality::Agreeableness => "agreeableness",
            Personality::Neuroticism => "neuroticism",
            Personality::Openness => "openness",
        }
    }

    /// Quiz statement for this trait.
    pub fn statement(self) -> &'static str {
        match self {
            Personality::Extraversion => "I get my energy from being around other people.",
            Personality::Conscientiousness => "I like to plan ahead and stick to a routine.",
            Personality::Agreeableness => "I care a lot about keeping the people around me happy.",
            Personality::Neuroticism => "I often worry about things going wrong.",
            Personality::Openness => "I love new ideas, art and trying things I've never done.",
        }
    }
}

impl FromStr for Personality {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Personality::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::UnknownPersonality(s.to_string()))
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Simplified Big Five scores: the selected trait scores 5, the rest 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigFiveScores {
    pub extraversion: u8,
    pub conscientiousness: u8,
    pub agreeableness: u8,
    pub neuroticism: u8,
    pub openness: u8,
}

impl BigFiveScores {
    pub fn for_selection(selected: Personality) -> Self {
        let score = |p: Personality| if p == selected { 5 } else { 3 };
        Self {
            extraversion: score(Personality::Extraversion),
            conscientiousness: score(Personality::Conscientiousness),
            agreeableness: score(Personality::Agreeableness),
            neuroticism: score(Personality::Neuroticism),
            openness: score(Personality::Openness),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_category_names() {
        assert_eq!("openness".parse::<Personality>(), Ok(Personality::Openness));
        assert_eq!(" Neuroticism ".parse::<Personality>(), Ok(Personality::Neuroticism));
        assert!(matches!(
            "balanced".parse::<Personality>(),
            Err(ValidationError::UnknownPersonality(_))
        ));
    }

    #[test]
    fn selected_trait_scores_five() {
        let scores = BigFiveScores::for_selection(Personality::Agreeableness);
        assert_eq!(scores.agreeableness, 5);
        assert_eq!(scores.extraversion, 3);
        assert_eq!(scores.openness, 3);
        let json = serde_json::to_value(scores).unwrap();
        assert_eq!(json["agreeableness"], 5);
    }
}
