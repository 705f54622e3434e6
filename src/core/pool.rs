/// Exhaustion-tracked selection shared by every pool in the engine.
///
/// A [`Rotation`] remembers which entries of a pool a user has already
/// seen in the current cycle. Draws pick uniformly among the unseen
/// entries, and once every entry has been seen the rotation is cleared
/// so the next cycle can repeat them.
use rand::seq::IteratorRandom;
use rand::Rng;
use rustc_hash::FxHashSet;
use std::fmt;
use std::hash::Hash;
use thiserror::Error;

/// Identifies one of the engine's backing pools, for errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pool {
    Trivia,
    Riddles,
    PositiveFeedback,
    NegativeFeedback,
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Trivia => "trivia",
            Self::Riddles => "riddle",
            Self::PositiveFeedback => "positive feedback",
            Self::NegativeFeedback => "negative feedback",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("the {0} pool has no entries")]
    Empty(Pool),
    #[error("every entry of the {0} pool is excluded")]
    Exhausted(Pool),
}

/// The entries of one pool already shown to one user this cycle.
#[derive(Debug, Clone)]
pub struct Rotation<K> {
    seen: FxHashSet<K>,
}

impl<K: Eq + Hash> PartialEq for Rotation<K> {
    fn eq(&self, other: &Self) -> bool {
        self.seen == other.seen
    }
}

impl<K: Eq + Hash> Eq for Rotation<K> {}

impl<K> Default for Rotation<K> {
    fn default() -> Self {
        Self {
            seen: FxHashSet::default(),
        }
    }
}

impl<K: Copy + Eq + Hash> Rotation<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the rotation if it already covers a pool of `pool_len` entries.
    ///
    /// Returns `true` when a new cycle was started. The check is an exact
    /// size match, so pools must not shrink after load.
    pub fn reset_if_exhausted(&mut self, pool_len: usize) -> bool {
        if self.seen.len() == pool_len {
            self.seen.clear();
            true
        } else {
            false
        }
    }

    pub fn record(&mut self, key: K) {
        self.seen.insert(key);
    }

    pub fn contains(&self, key: K) -> bool {
        self.seen.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// The exclusion set to pass to a draw.
    pub fn seen(&self) -> &FxHashSet<K> {
        &self.seen
    }
}

/// Uniformly pick an index in `0..len` whose key is not in `excluding`.
///
/// Never falls back to an excluded entry: when everything is excluded the
/// caller gets [`PoolError::Exhausted`] and must reset its rotation first.
pub fn choose_excluding<K, R>(
    len: usize,
    key_of: impl Fn(usize) -> K,
    excluding: &FxHashSet<K>,
    pool: Pool,
    rng: &mut R,
) -> Result<usize, PoolError>
where
    K: Eq + Hash,
    R: Rng + ?Sized,
{
    if len == 0 {
        return Err(PoolError::Empty(pool));
    }
    (0..len)
        .filter(|&i| !excluding.contains(&key_of(i)))
        .choose(rng)
        .ok_or(PoolError::Exhausted(pool))
}
