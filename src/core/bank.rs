/// Question bank: immutable trivia and riddle pools with exclusion-aware draws.
use rand::Rng;
use rustc_hash::FxHashSet;
use std::path::Path;
use thiserror::Error;

use crate::core::pool::{choose_excluding, Pool, PoolError};
use crate::schema::question::{Question, QuestionId, Riddle, RiddleId};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("trivia question {index} has {found} incorrect answers, expected {expected}")]
    MalformedQuestion {
        index: usize,
        found: usize,
        expected: usize,
    },
}

/// The trivia and riddle pools, fixed at construction and shared read-only
/// across every session.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    trivia: Vec<Question>,
    riddles: Vec<Riddle>,
}

impl QuestionBank {
    /// Build a bank. Either pool being empty, or a trivia question that
    /// cannot fill all four answer slots, is a startup failure.
    pub fn new(trivia: Vec<Question>, riddles: Vec<Riddle>) -> Result<Self, LoadError> {
        if trivia.is_empty() {
            return Err(PoolError::Empty(Pool::Trivia).into());
        }
        if riddles.is_empty() {
            return Err(PoolError::Empty(Pool::Riddles).into());
        }
        if let Some((index, q)) = trivia.iter().enumerate().find(|(_, q)| !q.is_well_formed()) {
            return Err(LoadError::MalformedQuestion {
                index,
                found: q.incorrect_answers.len(),
                expected: Question::INCORRECT_ANSWERS,
            });
        }
        Ok(Self { trivia, riddles })
    }

    pub fn trivia_len(&self) -> usize {
        self.trivia.len()
    }

    pub fn riddle_len(&self) -> usize {
        self.riddles.len()
    }

    pub fn trivia(&self, id: QuestionId) -> Option<&Question> {
        self.trivia.get(id.0 as usize)
    }

    pub fn riddle(&self, id: RiddleId) -> Option<&Riddle> {
        self.riddles.get(id.0 as usize)
    }

    /// Draw a trivia question uniformly from those not in `excluding`.
    pub fn draw_trivia<R: Rng + ?Sized>(
        &self,
        excluding: &FxHashSet<QuestionId>,
        rng: &mut R,
    ) -> Result<(QuestionId, &Question), PoolError> {
        let index = choose_excluding(
            self.trivia.len(),
            |i| QuestionId(i as u32),
            excluding,
            Pool::Trivia,
            rng,
        )?;
        Ok((QuestionId(index as u32), &self.trivia[index]))
    }

    /// Draw a riddle uniformly from those not in `excluding`.
    pub fn draw_riddle<R: Rng + ?Sized>(
        &self,
        excluding: &FxHashSet<RiddleId>,
        rng: &mut R,
    ) -> Result<(RiddleId, &Riddle), PoolError> {
        let index = choose_excluding(
            self.riddles.len(),
            |i| RiddleId(i as u32),
            excluding,
            Pool::Riddles,
            rng,
        )?;
        Ok((RiddleId(index as u32), &self.riddles[index]))
    }
}

/// Parse a trivia pool from a RON list of questions.
pub fn parse_trivia_ron(input: &str) -> Result<Vec<Question>, LoadError> {
    Ok(ron::from_str(input)?)
}

/// Load a trivia pool from a RON file.
pub fn load_trivia_ron(path: &Path) -> Result<Vec<Question>, LoadError> {
    let contents = std::fs::read_to_string(path)?;
    parse_trivia_ron(&contents)
}

/// Parse a riddle pool from a RON list of `(prompt, answer)` records.
pub fn parse_riddles_ron(input: &str) -> Result<Vec<Riddle>, LoadError> {
    Ok(ron::from_str(input)?)
}

/// Load a riddle pool from a RON file.
pub fn load_riddles_ron(path: &Path) -> Result<Vec<Riddle>, LoadError> {
    let contents = std::fs::read_to_string(path)?;
    parse_riddles_ron(&contents)
}
