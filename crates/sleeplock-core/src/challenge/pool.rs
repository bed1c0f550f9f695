//! Aphorism pools and the challenge generator.

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;

use super::personality::Personality;

/// Pool key used when a category name is not recognised. No pool carries
/// this key, so lookups through it yield no challenge.
const FALLBACK_POOL: &str = "balanced";

const EXTRAVERSION: &[&str] = &[
    "You miss 100% of the shots you don't take.",
    "The way to get started is to quit talking and begin doing.",
    "Success is the sum of small efforts repeated day in and day out.",
    "Don't watch the clock; do what it does. Keep going.",
    "The best time to plant a tree was 20 years ago. The second best time is now.",
    "Great things never come from comfort zones.",
];

const CONSCIENTIOUSNESS: &[&str] = &[
    "Success is the sum of small efforts repeated day in and day out.",
    "The only way to do great work is to love what you do.",
    "Don't watch the clock; do what it does. Keep going.",
    "The way to get started is to quit talking and begin doing.",
    "Early to bed and early to rise makes a man healthy, wealthy, and wise.",
    "The best time to plant a tree was 20 years ago. The second best time is now.",
];

const AGREEABLENESS: &[&str] = &[
    "The journey of a thousand miles begins with a single step.",
    "In the middle of difficulty lies opportunity.",
    "It is during our darkest moments that we must focus to see the light.",
    "Life is what happens to you while you're busy making other plans.",
    "The two most important days in your life are the day you are born and the day you find out why.",
    "The only person you are destined to become is the person you decide to be.",
];

const NEUROTICISM: &[&str] = &[
    "It is during our darkest moments that we must focus to see the light.",
    "In the middle of difficulty lies opportunity.",
    "The journey of a thousand miles begins with a single step.",
    "Believe you can and you're halfway there.",
    "The only person you are destined to become is the person you decide to be.",
    "Life is what happens to you while you're busy making other plans.",
];

const OPENNESS: &[&str] = &[
    "The future belongs to those who believe in the beauty of their dreams.",
    "Go confidently in the direction of your dreams. Live the life you have imagined.",
    "Believe you can and you're halfway there.",
    "The only impossible journey is the one you never begin.",
    "Your limitation\u{2014}it's only your imagination.",
    "Innovation distinguishes between a leader and a follower.",
    "Great things never come from comfort zones.",
];

/// The fixed aphorism pool for a personality.
pub fn pool_for(personality: Personality) -> &'static [&'static str] {
    match personality {
        Personality::Extraversion => EXTRAVERSION,
        Personality::Conscientiousness => CONSCIENTIOUSNESS,
        Personality::Agreeableness => AGREEABLENESS,
        Personality::Neuroticism => NEUROTICISM,
        Personality::Openness => OPENNESS,
    }
}

fn pool_by_key(key: &str) -> Option<&'static [&'static str]> {
    Personality::ALL
        .into_iter()
        .find(|p| p.as_str() == key)
        .map(pool_for)
}

/// Picks aphorisms uniformly at random.
#[derive(Debug, Clone)]
pub struct ChallengeGenerator {
    rng: Mcg128Xsl64,
}

impl Default for ChallengeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChallengeGenerator {
    pub fn new() -> Self {
        Self {
            rng: Mcg128Xsl64::from_entropy(),
        }
    }

    /// Deterministic generator for reproducible sequences.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mcg128Xsl64::seed_from_u64(seed),
        }
    }

    pub fn generate_for(&mut self, personality: Personality) -> &'static str {
        let pool = pool_for(personality);
        pool[self.rng.gen_range(0..pool.len())]
    }

    /// Lookup by category name. Unknown names go through the fallback key,
    /// which has no pool, and yield `None`.
    pub fn generate(&mut self, category: &str) -> Option<&'static str> {
        let pool = pool_by_key(category).or_else(|| pool_by_key(FALLBACK_POOL))?;
        pool.choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pools_have_six_or_seven_entries() {
        for p in Personality::ALL {
            let n = pool_for(p).len();
            assert!((6..=7).contains(&n), "{p} has {n} entries");
        }
        assert_eq!(pool_for(Personality::Openness).len(), 7);
    }

    #[test]
    fn generated_text_comes_from_the_category_pool() {
        let mut generator = ChallengeGenerator::seeded(7);
        for p in Personality::ALL {
            for _ in 0..20 {
                assert!(pool_for(p).contains(&generator.generate_for(p)));
            }
        }
    }

    #[test]
    fn seeded_generators_agree() {
        let mut a = ChallengeGenerator::seeded(42);
        let mut b = ChallengeGenerator::seeded(42);
        for _ in 0..10 {
            assert_eq!(
                a.generate_for(Personality::Openness),
                b.generate_for(Personality::Openness)
            );
        }
    }

    #[test]
    fn every_entry_is_reachable() {
        let mut generator = ChallengeGenerator::seeded(1);
        let pool = pool_for(Personality::Openness);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(generator.generate_for(Personality::Openness));
        }
        assert_eq!(seen.len(), pool.len());
    }

    #[test]
    fn unknown_category_yields_no_challenge() {
        let mut generator = ChallengeGenerator::seeded(3);
        assert!(generator.generate("balanced").is_none());
        assert!(generator.generate("").is_none());
        assert!(generator.generate("openness").is_some());
    }
}
