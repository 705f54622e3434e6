use serde::{Deserialize, Serialize};

/// Newtype wrapper for trivia question IDs (stable index within the pool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(pub u32);

/// Newtype wrapper for riddle IDs (stable index within the pool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RiddleId(pub u32);

/// How hard a trivia question is rated by its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Returns the query-string form (e.g., "easy").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn parse(s: &str) -> Option<Difficulty> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

/// A multiple-choice trivia question.
///
/// Field names follow the remote source's JSON shape, so the same struct
/// deserializes fetched results and the bundled RON pool. Text may still
/// contain HTML entities; they are decoded when a prompt is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub category: String,
    pub difficulty: Difficulty,
    #[serde(rename = "question")]
    pub prompt: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
}

impl Question {
    /// Number of incorrect answers a question needs to fill every [`Choice`].
    pub const INCORRECT_ANSWERS: usize = Choice::ALL.len() - 1;

    /// Whether this question can be laid out on the four-choice keyboard.
    pub fn is_well_formed(&self) -> bool {
        self.incorrect_answers.len() == Self::INCORRECT_ANSWERS
    }
}

/// A free-text riddle. Answers are compared exactly, case included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Riddle {
    pub prompt: String,
    pub answer: String,
}

/// Label of one of the four answer slots of a trivia prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    A,
    B,
    C,
    D,
}

impl Choice {
    pub const ALL: [Choice; 4] = [Choice::A, Choice::B, Choice::C, Choice::D];

    /// The single-letter label shown to the user and expected back.
    pub fn label(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    /// Exact, case-sensitive match against the label after trimming.
    pub fn matches(&self, raw: &str) -> bool {
        raw.trim() == self.label()
    }
}
