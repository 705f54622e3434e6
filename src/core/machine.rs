/// Conversation state machine: inbound message → engine → replies + next state.
///
/// Inbound text is decoded once into a [`Command`]; the transition table
/// then matches on `(state, command)` and never on raw strings.
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::core::bank::{LoadError, QuestionBank};
use crate::core::feedback::FeedbackPool;
use crate::core::pool::{Pool, PoolError};
use crate::core::quiz::QuizEngine;
use crate::core::riddle::RiddleEngine;
use crate::core::round::{ContractViolation, Verdict};
use crate::core::store::SessionStore;
use crate::core::transport::{Inbound, Keyboard, ParseMode, Payload, Reply, Transport};
use crate::schema::session::{ConvState, Session, UserId};

pub const DEFAULT_BOT_NAME: &str = "Botsulting";

pub const TRIVIA_LABEL: &str = "Trivia knowledge";
pub const RIDDLE_LABEL: &str = "Riddle me this";
pub const MULTIPLAYER_LABEL: &str = "Multiplayer Game";

const FAREWELL: &str = "Oh no... Did I insult you? I thought you wouldn't notice";
pub const APOLOGY: &str = "Sorry, something went wrong on my side. Please try that again.";

/// A decoded inbound text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Cancel,
    Skip,
    PlayTrivia,
    PlayRiddle,
    PlayMultiplayer,
    /// Anything else, trimmed.
    Text(String),
}

impl Command {
    /// Decode raw message text. Slash commands match on their first word,
    /// so `/start now` is still `/start`; menu buttons must match exactly.
    pub fn decode(raw: &str) -> Command {
        let text = raw.trim();
        match text.split_whitespace().next() {
            Some("/start") => return Command::Start,
            Some("/cancel") => return Command::Cancel,
            Some("/skip") => return Command::Skip,
            _ => {}
        }
        match text {
            TRIVIA_LABEL => Command::PlayTrivia,
            RIDDLE_LABEL => Command::PlayRiddle,
            MULTIPLAYER_LABEL => Command::PlayMultiplayer,
            other => Command::Text(other.to_string()),
        }
    }

    /// The text as the user typed it (trimmed), for answer checking and echoes.
    pub fn as_text(&self) -> &str {
        match self {
            Self::Start => "/start",
            Self::Cancel => "/cancel",
            Self::Skip => "/skip",
            Self::PlayTrivia => TRIVIA_LABEL,
            Self::PlayRiddle => RIDDLE_LABEL,
            Self::PlayMultiplayer => MULTIPLAYER_LABEL,
            Self::Text(text) => text,
        }
    }
}

/// Per-message RNGs, reproducible when a seed is configured.
#[derive(Debug)]
struct RngSource {
    seed: Option<u64>,
    generation_count: AtomicU64,
}

impl RngSource {
    fn next(&self) -> StdRng {
        match self.seed {
            Some(seed) => {
                let n = self.generation_count.fetch_add(1, Ordering::Relaxed);
                StdRng::seed_from_u64(seed.wrapping_add(n.wrapping_mul(7919)))
            }
            None => StdRng::from_entropy(),
        }
    }
}

/// The top-level engine. Built via `ConversationMachine::builder()`.
#[derive(Debug)]
pub struct ConversationMachine {
    quiz: QuizEngine,
    riddle: RiddleEngine,
    store: SessionStore,
    rng: RngSource,
    bot_name: String,
}

/// Builder for constructing a `ConversationMachine`.
#[derive(Debug, Default)]
pub struct ConversationMachineBuilder {
    bank: Option<QuestionBank>,
    feedback: Option<FeedbackPool>,
    seed: Option<u64>,
    bot_name: Option<String>,
}

impl ConversationMachineBuilder {
    pub fn with_bank(mut self, bank: QuestionBank) -> Self {
        self.bank = Some(bank);
        self
    }

    pub fn with_feedback(mut self, feedback: FeedbackPool) -> Self {
        self.feedback = Some(feedback);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn bot_name(mut self, name: impl Into<String>) -> Self {
        self.bot_name = Some(name.into());
        self
    }

    /// Fails when the bank or feedback pool was never provided.
    pub fn build(self) -> Result<ConversationMachine, LoadError> {
        let bank = Arc::new(self.bank.ok_or(PoolError::Empty(Pool::Trivia))?);
        let feedback = Arc::new(
            self.feedback
                .ok_or(PoolError::Empty(Pool::PositiveFeedback))?,
        );
        Ok(ConversationMachine {
            quiz: QuizEngine::new(Arc::clone(&bank), Arc::clone(&feedback)),
            riddle: RiddleEngine::new(bank, feedback),
            store: SessionStore::new(),
            rng: RngSource {
                seed: self.seed,
                generation_count: AtomicU64::new(0),
            },
            bot_name: self.bot_name.unwrap_or_else(|| DEFAULT_BOT_NAME.to_string()),
        })
    }
}

impl ConversationMachine {
    pub fn builder() -> ConversationMachineBuilder {
        ConversationMachineBuilder::default()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.store
    }

    /// Handle one inbound update and return the replies to send, in order.
    ///
    /// Holds the user's session for the whole step. A contract violation
    /// rolls the session back to how it was before the message and
    /// answers with a generic apology.
    pub async fn handle(&self, inbound: Inbound) -> Vec<Reply> {
        let mut session = self.store.checkout(inbound.user_id).await;
        let command = match inbound.payload {
            Payload::Text(text) => Command::decode(&text),
            Payload::Photo(_) | Payload::Location { .. } => {
                log_media(&session);
                return Vec::new();
            }
        };

        let before = session.clone();
        let mut rng = self.rng.next();
        match self.step(&mut session, inbound.display_name.as_deref(), command, &mut rng) {
            Ok(replies) => {
                if before.state.name() != session.state.name() {
                    tracing::debug!(
                        user = %session.user_id,
                        from = before.state.name(),
                        to = session.state.name(),
                        "state transition"
                    );
                }
                replies
            }
            Err(violation) => {
                tracing::error!(
                    user = %before.user_id,
                    state = before.state.name(),
                    error = %violation,
                    "contract violation; session left unchanged"
                );
                *session = before;
                vec![Reply::text(APOLOGY)]
            }
        }
    }

    /// Handle one inbound update and deliver every reply through `transport`.
    pub async fn dispatch<T: Transport>(
        &self,
        inbound: Inbound,
        transport: &T,
    ) -> Result<(), T::Error> {
        let user_id = inbound.user_id;
        for reply in self.handle(inbound).await {
            transport
                .send_text(user_id, &reply.text, reply.options.as_ref())
                .await?;
        }
        Ok(())
    }

    /// A copy of a user's session, for inspection.
    pub async fn session(&self, user_id: UserId) -> Option<Session> {
        self.store.snapshot(user_id).await
    }

    fn step(
        &self,
        session: &mut Session,
        display_name: Option<&str>,
        command: Command,
        rng: &mut StdRng,
    ) -> Result<Vec<Reply>, ContractViolation> {
        let state = session.state.clone();
        match (state, command) {
            // Global entry and exit
            (_, Command::Start) => {
                session.state = ConvState::Menu;
                Ok(vec![self.menu_prompt()])
            }
            (ConvState::Ended, _) => Ok(Vec::new()),
            (_, Command::Cancel) => {
                session.state = ConvState::Ended;
                tracing::info!(user = %session.user_id, "user cancelled the conversation");
                Ok(vec![Reply::text(FAREWELL)])
            }

            // Menu
            (ConvState::Menu, Command::PlayTrivia) => {
                let mut replies = vec![welcome(TRIVIA_LABEL)];
                if let Some(name) = display_name {
                    replies.push(Reply::text(format!("Ready to lose, {}?", name)));
                }
                let round = self.quiz.start_round(session, rng)?;
                session.state = round.next_state();
                replies.push(round.prompt);
                Ok(replies)
            }
            (ConvState::Menu, Command::PlayRiddle) => {
                let round = self.riddle.start_round(session, rng)?;
                session.state = round.next_state();
                Ok(vec![welcome(RIDDLE_LABEL), round.prompt])
            }
            (ConvState::Menu, Command::PlayMultiplayer) => {
                session.state = ConvState::MultiplayerGame;
                Ok(vec![welcome(MULTIPLAYER_LABEL)])
            }
            (ConvState::Menu, other) => Ok(vec![Reply::text(format!(
                "Got it! You said \"{}\". Pick one of the games below to play.",
                other.as_text()
            ))
            .with_keyboard(menu_keyboard())]),

            // Trivia loop
            (ConvState::WaitingTriviaAnswer(_), Command::Skip) => {
                let verdict = self.quiz.skip(session)?;
                self.next_trivia(session, verdict, rng)
            }
            (ConvState::WaitingTriviaAnswer(_), other) => {
                let verdict = self.quiz.check_answer(session, other.as_text(), rng)?;
                self.next_trivia(session, verdict, rng)
            }

            // Riddle loop
            (ConvState::WaitingRiddleAnswer(_), Command::Skip) => {
                let verdict = self.riddle.skip(session)?;
                self.next_riddle(session, verdict, rng)
            }
            (ConvState::WaitingRiddleAnswer(_), other) => {
                let verdict = self.riddle.check_answer(session, other.as_text(), rng)?;
                self.next_riddle(session, verdict, rng)
            }

            (ConvState::MultiplayerGame, other) => {
                tracing::error!(
                    user = %session.user_id,
                    input = other.as_text(),
                    "multiplayer game is not implemented; ignoring input"
                );
                Ok(Vec::new())
            }
        }
    }

    fn next_trivia(
        &self,
        session: &mut Session,
        verdict: Verdict,
        rng: &mut StdRng,
    ) -> Result<Vec<Reply>, ContractViolation> {
        let mut replies = settle(session, verdict);
        let round = self.quiz.start_round(session, rng)?;
        session.state = round.next_state();
        replies.push(round.prompt);
        Ok(replies)
    }

    fn next_riddle(
        &self,
        session: &mut Session,
        verdict: Verdict,
        rng: &mut StdRng,
    ) -> Result<Vec<Reply>, ContractViolation> {
        let mut replies = settle(session, verdict);
        let round = self.riddle.start_round(session, rng)?;
        session.state = round.next_state();
        replies.push(round.prompt);
        Ok(replies)
    }

    fn menu_prompt(&self) -> Reply {
        Reply::text(format!(
            "Hello, I am {}. <b>What</b> do you want to do today?",
            self.bot_name
        ))
        .with_parse_mode(ParseMode::Html)
        .with_keyboard(menu_keyboard())
    }
}

/// Apply a verdict's score and append the running total.
fn settle(session: &mut Session, verdict: Verdict) -> Vec<Reply> {
    session.score += verdict.score_delta;
    let mut replies = verdict.replies;
    replies.push(Reply::text(format!("Your score: {}", session.score)));
    replies
}

fn welcome(game: &str) -> Reply {
    Reply::text(format!("Welcome to {}! Let's get started...", game))
}

fn menu_keyboard() -> Keyboard {
    Keyboard::one_time([[TRIVIA_LABEL, RIDDLE_LABEL, MULTIPLAYER_LABEL]])
}

fn log_media(session: &Session) {
    match session.state {
        ConvState::MultiplayerGame => tracing::error!(
            user = %session.user_id,
            "multiplayer game is not implemented; ignoring media"
        ),
        _ => tracing::warn!(
            user = %session.user_id,
            state = session.state.name(),
            "ignoring non-text message"
        ),
    }
}
