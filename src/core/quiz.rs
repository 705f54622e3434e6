/// Trivia rounds: multiple-choice prompts, shuffled labels, and scoring.
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

use crate::core::bank::QuestionBank;
use crate::core::feedback::FeedbackPool;
use crate::core::markup::decode_entities;
use crate::core::round::{self, ContractViolation, Verdict};
use crate::core::transport::{Keyboard, Reply};
use crate::schema::question::Choice;
use crate::schema::session::{ConvState, PendingTrivia, Session};

/// A freshly posed trivia question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriviaRound {
    pub prompt: Reply,
    /// What the session must wait for next.
    pub pending: PendingTrivia,
}

impl TriviaRound {
    pub fn next_state(&self) -> ConvState {
        ConvState::WaitingTriviaAnswer(self.pending.clone())
    }
}

/// Runs trivia rounds against a shared bank and feedback pool.
#[derive(Debug, Clone)]
pub struct QuizEngine {
    bank: Arc<QuestionBank>,
    feedback: Arc<FeedbackPool>,
}

impl QuizEngine {
    pub fn new(bank: Arc<QuestionBank>, feedback: Arc<FeedbackPool>) -> Self {
        Self { bank, feedback }
    }

    /// Pose a question the user has not seen this cycle.
    ///
    /// Starts a new cycle first when every question has been asked, so a
    /// round always succeeds on a non-empty pool. Records the question in
    /// `session.asked_trivia`; the caller moves the session into the
    /// returned pending state.
    pub fn start_round<R: Rng + ?Sized>(
        &self,
        session: &mut Session,
        rng: &mut R,
    ) -> Result<TriviaRound, ContractViolation> {
        session.asked_trivia.reset_if_exhausted(self.bank.trivia_len());
        let (id, question) = self.bank.draw_trivia(session.asked_trivia.seen(), rng)?;

        // Shuffle answer slots rather than answer texts so duplicate texts
        // cannot confuse which slot is correct.
        let mut slots: Vec<Option<&str>> = question
            .incorrect_answers
            .iter()
            .map(|a| Some(a.as_str()))
            .chain(std::iter::once(None))
            .collect();
        slots.shuffle(rng);

        let mut lines = Vec::with_capacity(slots.len());
        let mut correct_choice = Choice::A;
        for (choice, slot) in Choice::ALL.iter().zip(&slots) {
            let text = match *slot {
                Some(incorrect) => incorrect,
                None => {
                    correct_choice = *choice;
                    question.correct_answer.as_str()
                }
            };
            lines.push(format!("{}) {}", choice.label(), decode_entities(text)));
        }

        let text = format!("{}\n\n{}", decode_entities(&question.prompt), lines.join("\n"));
        session.asked_trivia.record(id);

        tracing::debug!(
            user = %session.user_id,
            question = id.0,
            correct = correct_choice.label(),
            "posed trivia question"
        );

        Ok(TriviaRound {
            prompt: Reply::text(text).with_keyboard(choice_keyboard()),
            pending: PendingTrivia {
                question: id,
                correct_choice,
                correct_answer: decode_entities(&question.correct_answer).into_owned(),
            },
        })
    }

    /// Judge `raw` against the pending question's correct label.
    ///
    /// The comparison is trimmed and case-sensitive. Fails without touching
    /// the session when nothing is pending.
    pub fn check_answer<R: Rng + ?Sized>(
        &self,
        session: &mut Session,
        raw: &str,
        rng: &mut R,
    ) -> Result<Verdict, ContractViolation> {
        let pending = pending_trivia(session)?;
        if pending.correct_choice.matches(raw) {
            round::praise(session, &self.feedback, rng)
        } else {
            round::commiserate(session, &self.feedback, &pending.correct_answer, rng)
        }
    }

    /// Give up on the pending question.
    pub fn skip(&self, session: &Session) -> Result<Verdict, ContractViolation> {
        let pending = pending_trivia(session)?;
        Ok(round::reveal(&pending.correct_answer))
    }
}

fn pending_trivia(session: &Session) -> Result<PendingTrivia, ContractViolation> {
    match &session.state {
        ConvState::WaitingTriviaAnswer(pending) => Ok(pending.clone()),
        other => Err(ContractViolation::NoPendingQuestion {
            game: "trivia",
            state: other.name(),
        }),
    }
}

/// The 2x2 answer keyboard.
fn choice_keyboard() -> Keyboard {
    let [a, b, c, d] = Choice::ALL.map(|c| c.label());
    Keyboard::one_time([[a, b], [c, d]])
}
