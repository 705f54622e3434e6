use serde::{Deserialize, Serialize};
use std::fmt;

use super::feedback::PhraseId;
use super::question::{Choice, QuestionId, RiddleId};
use crate::core::pool::Rotation;

/// Opaque user identifier supplied by the chat transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The trivia question a session is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTrivia {
    pub question: QuestionId,
    /// Label the correct answer was shuffled into.
    pub correct_choice: Choice,
    /// Decoded correct answer text, revealed after a miss.
    pub correct_answer: String,
}

/// The riddle a session is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRiddle {
    pub riddle: RiddleId,
    pub correct_answer: String,
}

/// A borrowed view of whatever question is awaiting an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending<'a> {
    Trivia(&'a PendingTrivia),
    Riddle(&'a PendingRiddle),
}

/// Conversation state of one user.
///
/// The waiting states own their pending question, so a session can never
/// wait for an answer without knowing what the answer is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConvState {
    #[default]
    Menu,
    WaitingTriviaAnswer(PendingTrivia),
    WaitingRiddleAnswer(PendingRiddle),
    /// Accepted as a destination, but no game logic runs here.
    MultiplayerGame,
    /// Terminal until the user sends `/start` again.
    Ended,
}

impl ConvState {
    /// Short name used in logs (e.g., "waiting_trivia_answer").
    pub fn name(&self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::WaitingTriviaAnswer(_) => "waiting_trivia_answer",
            Self::WaitingRiddleAnswer(_) => "waiting_riddle_answer",
            Self::MultiplayerGame => "multiplayer_game",
            Self::Ended => "ended",
        }
    }

    pub fn is_waiting(&self) -> bool {
        matches!(
            self,
            Self::WaitingTriviaAnswer(_) | Self::WaitingRiddleAnswer(_)
        )
    }

    pub fn pending(&self) -> Option<Pending<'_>> {
        match self {
            Self::WaitingTriviaAnswer(p) => Some(Pending::Trivia(p)),
            Self::WaitingRiddleAnswer(p) => Some(Pending::Riddle(p)),
            _ => None,
        }
    }
}

/// Per-user conversation state, score, and exclusion history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub state: ConvState,
    /// Correct answers this process lifetime. Never decreases.
    pub score: u32,
    pub asked_trivia: Rotation<QuestionId>,
    pub asked_riddles: Rotation<RiddleId>,
    pub positive_used: Rotation<PhraseId>,
    pub negative_used: Rotation<PhraseId>,
}

impl Session {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            state: ConvState::default(),
            score: 0,
            asked_trivia: Rotation::new(),
            asked_riddles: Rotation::new(),
            positive_used: Rotation::new(),
            negative_used: Rotation::new(),
        }
    }

    pub fn pending(&self) -> Option<Pending<'_>> {
        self.state.pending()
    }
}
