/// Judging plumbing shared by the trivia and riddle engines.
use rand::Rng;
use thiserror::Error;

use crate::core::feedback::FeedbackPool;
use crate::core::pool::PoolError;
use crate::core::transport::Reply;
use crate::schema::feedback::Polarity;
use crate::schema::session::Session;

/// Sent after a miss, one time in three.
pub const QUIT_HINT: &str = "Had enough? Send /cancel whenever you want to stop playing.";

/// A programming error inside a request. Never shown verbatim to users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("answer checked with no pending {game} question (state: {state})")]
    NoPendingQuestion { game: &'static str, state: &'static str },
    #[error("pool draw failed: {0}")]
    Pool(#[from] PoolError),
}

/// Outcome of judging one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub correct: bool,
    pub score_delta: u32,
    pub replies: Vec<Reply>,
}

/// Draw a feedback phrase for `session`, starting a new cycle first when the
/// polarity's pool has been fully used.
pub(crate) fn draw_feedback<R: Rng + ?Sized>(
    session: &mut Session,
    feedback: &FeedbackPool,
    polarity: Polarity,
    rng: &mut R,
) -> Result<String, PoolError> {
    let used = match polarity {
        Polarity::Positive => &mut session.positive_used,
        Polarity::Negative => &mut session.negative_used,
    };
    used.reset_if_exhausted(feedback.len(polarity));
    let phrase = feedback.draw(polarity, used.seen(), rng)?;
    used.record(phrase.id);
    Ok(phrase.text.clone())
}

/// Verdict for a matching answer: one positive phrase and a point.
pub(crate) fn praise<R: Rng + ?Sized>(
    session: &mut Session,
    feedback: &FeedbackPool,
    rng: &mut R,
) -> Result<Verdict, ContractViolation> {
    let phrase = draw_feedback(session, feedback, Polarity::Positive, rng)?;
    Ok(Verdict {
        correct: true,
        score_delta: 1,
        replies: vec![Reply::text(phrase)],
    })
}

/// Verdict for a miss: one negative phrase, the correct answer, and
/// sometimes a hint that `/cancel` exists.
pub(crate) fn commiserate<R: Rng + ?Sized>(
    session: &mut Session,
    feedback: &FeedbackPool,
    correct_answer: &str,
    rng: &mut R,
) -> Result<Verdict, ContractViolation> {
    let phrase = draw_feedback(session, feedback, Polarity::Negative, rng)?;
    let mut replies = vec![
        Reply::text(phrase),
        Reply::text(format!("The correct answer was: {}", correct_answer)),
    ];
    if rng.gen_range(0..=100) % 3 == 0 {
        replies.push(Reply::text(QUIT_HINT));
    }
    Ok(Verdict {
        correct: false,
        score_delta: 0,
        replies,
    })
}

/// Verdict for `/skip`: reveal the answer without feedback or score.
pub(crate) fn reveal(correct_answer: &str) -> Verdict {
    Verdict {
        correct: false,
        score_delta: 0,
        replies: vec![Reply::text(format!(
            "Skipped. The correct answer was: {}",
            correct_answer
        ))],
    }
}
