/// Riddle rounds: free-text answers matched exactly.
use rand::Rng;
use std::sync::Arc;

use crate::core::bank::QuestionBank;
use crate::core::feedback::FeedbackPool;
use crate::core::round::{self, ContractViolation, Verdict};
use crate::core::transport::Reply;
use crate::schema::session::{ConvState, PendingRiddle, Session};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiddleRound {
    pub prompt: Reply,
    pub pending: PendingRiddle,
}

impl RiddleRound {
    pub fn next_state(&self) -> ConvState {
        ConvState::WaitingRiddleAnswer(self.pending.clone())
    }
}

/// Runs riddle rounds. Pool exhaustion and feedback rotation follow the
/// same rules as [`QuizEngine`](crate::core::quiz::QuizEngine).
#[derive(Debug, Clone)]
pub struct RiddleEngine {
    bank: Arc<QuestionBank>,
    feedback: Arc<FeedbackPool>,
}

impl RiddleEngine {
    pub fn new(bank: Arc<QuestionBank>, feedback: Arc<FeedbackPool>) -> Self {
        Self { bank, feedback }
    }

    pub fn start_round<R: Rng + ?Sized>(
        &self,
        session: &mut Session,
        rng: &mut R,
    ) -> Result<RiddleRound, ContractViolation> {
        session.asked_riddles.reset_if_exhausted(self.bank.riddle_len());
        let (id, riddle) = self.bank.draw_riddle(session.asked_riddles.seen(), rng)?;
        session.asked_riddles.record(id);

        tracing::debug!(user = %session.user_id, riddle = id.0, "posed riddle");

        Ok(RiddleRound {
            prompt: Reply::text(riddle.prompt.clone()),
            pending: PendingRiddle {
                riddle: id,
                correct_answer: riddle.answer.clone(),
            },
        })
    }

    /// Judge `answer` by exact, case-sensitive equality with the stored answer.
    ///
    /// No normalization happens here; surrounding whitespace is stripped
    /// once when the inbound text is decoded.
    pub fn check_answer<R: Rng + ?Sized>(
        &self,
        session: &mut Session,
        answer: &str,
        rng: &mut R,
    ) -> Result<Verdict, ContractViolation> {
        let pending = pending_riddle(session)?;
        if answer == pending.correct_answer {
            round::praise(session, &self.feedback, rng)
        } else {
            round::commiserate(session, &self.feedback, &pending.correct_answer, rng)
        }
    }

    pub fn skip(&self, session: &Session) -> Result<Verdict, ContractViolation> {
        let pending = pending_riddle(session)?;
        Ok(round::reveal(&pending.correct_answer))
    }
}

fn pending_riddle(session: &Session) -> Result<PendingRiddle, ContractViolation> {
    match &session.state {
        ConvState::WaitingRiddleAnswer(pending) => Ok(pending.clone()),
        other => Err(ContractViolation::NoPendingQuestion {
            game: "riddle",
            state: other.name(),
        }),
    }
}
