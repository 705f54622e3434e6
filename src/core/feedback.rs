/// Feedback pool: positive and negative flavor phrases with rotation-aware draws.
use rand::Rng;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use std::path::Path;

use crate::core::bank::LoadError;
use crate::core::pool::{choose_excluding, Pool, PoolError};
use crate::schema::feedback::{FeedbackPhrase, PhraseId, Polarity};

/// RON shape of a feedback file: two plain string lists.
#[derive(Debug, Deserialize)]
struct RonFeedback {
    positive: Vec<String>,
    negative: Vec<String>,
}

/// Immutable positive/negative phrase pools, each indexed by stable [`PhraseId`].
#[derive(Debug, Clone)]
pub struct FeedbackPool {
    positive: Vec<FeedbackPhrase>,
    negative: Vec<FeedbackPhrase>,
}

impl FeedbackPool {
    /// Build the pools from plain strings. Either list being empty is a
    /// startup failure.
    pub fn new<S: Into<String>>(
        positive: impl IntoIterator<Item = S>,
        negative: impl IntoIterator<Item = S>,
    ) -> Result<Self, LoadError> {
        let positive = tag(positive, Polarity::Positive);
        let negative = tag(negative, Polarity::Negative);
        if positive.is_empty() {
            return Err(PoolError::Empty(Pool::PositiveFeedback).into());
        }
        if negative.is_empty() {
            return Err(PoolError::Empty(Pool::NegativeFeedback).into());
        }
        Ok(Self { positive, negative })
    }

    /// Parse a feedback pool from a RON string:
    /// `(positive: ["..."], negative: ["..."])`.
    pub fn parse_ron(input: &str) -> Result<Self, LoadError> {
        let raw: RonFeedback = ron::from_str(input)?;
        Self::new(raw.positive, raw.negative)
    }

    /// Load a feedback pool from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn len(&self, polarity: Polarity) -> usize {
        self.phrases(polarity).len()
    }

    pub fn phrases(&self, polarity: Polarity) -> &[FeedbackPhrase] {
        match polarity {
            Polarity::Positive => &self.positive,
            Polarity::Negative => &self.negative,
        }
    }

    /// Draw a phrase of the given polarity uniformly from those not in `excluding`.
    pub fn draw<R: Rng + ?Sized>(
        &self,
        polarity: Polarity,
        excluding: &FxHashSet<PhraseId>,
        rng: &mut R,
    ) -> Result<&FeedbackPhrase, PoolError> {
        let pool = match polarity {
            Polarity::Positive => Pool::PositiveFeedback,
            Polarity::Negative => Pool::NegativeFeedback,
        };
        let phrases = self.phrases(polarity);
        let index = choose_excluding(phrases.len(), |i| phrases[i].id, excluding, pool, rng)?;
        Ok(&phrases[index])
    }

    pub fn draw_positive<R: Rng + ?Sized>(
        &self,
        excluding: &FxHashSet<PhraseId>,
        rng: &mut R,
    ) -> Result<&FeedbackPhrase, PoolError> {
        self.draw(Polarity::Positive, excluding, rng)
    }

    pub fn draw_negative<R: Rng + ?Sized>(
        &self,
        excluding: &FxHashSet<PhraseId>,
        rng: &mut R,
    ) -> Result<&FeedbackPhrase, PoolError> {
        self.draw(Polarity::Negative, excluding, rng)
    }
}

fn tag<S: Into<String>>(texts: impl IntoIterator<Item = S>, polarity: Polarity) -> Vec<FeedbackPhrase> {
    texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| FeedbackPhrase {
            id: PhraseId(i as u32),
            polarity,
            text: text.into(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pool::Rotation;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn make_pool() -> FeedbackPool {
        FeedbackPool::new(
            ["Nice!", "Correct!", "Spot on!", "Brilliant!"],
            ["Nope.", "Not quite.", "Wrong!"],
        )
        .unwrap()
    }

    #[test]
    fn phrases_are_tagged_with_polarity_and_index() {
        let pool = make_pool();
        assert_eq!(pool.len(Polarity::Positive), 4);
        assert_eq!(pool.len(Polarity::Negative), 3);
        let second = &pool.phrases(Polarity::Negative)[1];
        assert_eq!(second.id, PhraseId(1));
        assert_eq!(second.polarity, Polarity::Negative);
        assert_eq!(second.text, "Not quite.");
    }

    #[test]
    fn empty_polarity_is_rejected() {
        let err = FeedbackPool::new(["yay"], Vec::<&str>::new()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Pool(PoolError::Empty(Pool::NegativeFeedback))
        ));
    }

    #[test]
    fn no_repeat_until_polarity_exhausted() {
        let pool = make_pool();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut used = Rotation::new();
            for _ in 0..pool.len(Polarity::Positive) {
                let phrase = pool.draw_positive(used.seen(), &mut rng).unwrap();
                assert!(!used.contains(phrase.id));
                used.record(phrase.id);
            }
            assert!(used.reset_if_exhausted(pool.len(Polarity::Positive)));
        }
    }

    #[test]
    fn polarities_draw_from_their_own_pool() {
        let pool = make_pool();
        let mut rng = StdRng::seed_from_u64(5);
        let none = FxHashSet::default();
        for _ in 0..10 {
            assert_eq!(pool.draw_negative(&none, &mut rng).unwrap().polarity, Polarity::Negative);
            assert_eq!(pool.draw_positive(&none, &mut rng).unwrap().polarity, Polarity::Positive);
        }
    }

    #[test]
    fn parse_ron_pool() {
        let pool = FeedbackPool::parse_ron(
            r#"(
                positive: ["Great job!"],
                negative: ["Better luck next time.", "Ouch."],
            )"#,
        )
        .unwrap();
        assert_eq!(pool.len(Polarity::Positive), 1);
        assert_eq!(pool.len(Polarity::Negative), 2);
    }

    #[test]
    fn load_fixture_file() {
        let pool = FeedbackPool::load_from_ron(Path::new("tests/fixtures/feedback.ron")).unwrap();
        assert_eq!(pool.len(Polarity::Negative), 3);
    }
}
