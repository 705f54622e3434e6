//! Startup wiring: configuration in, ready-to-serve machine out.
//!
//! Every pool must be present and non-empty before the first message is
//! handled, so any failure here is fatal to the process.

use thiserror::Error;

use crate::config::{ConfigError, QuizConfig, TriviaOrigin};
use crate::core::bank::{self, LoadError, QuestionBank};
use crate::core::feedback::FeedbackPool;
use crate::core::machine::ConversationMachine;
use crate::core::source::{FetchError, OpenTdbSource, QuestionSource};
use crate::schema::feedback::Polarity;
use crate::schema::question::Question;

/// Pools compiled into the library.
pub mod data {
    pub const TRIVIA: &str = include_str!("../data/trivia.ron");
    pub const RIDDLES: &str = include_str!("../data/riddles.ron");
    pub const FEEDBACK: &str = include_str!("../data/feedback.ron");
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to load pools: {0}")]
    Load(#[from] LoadError),
    #[error("failed to fetch trivia: {0}")]
    Fetch(#[from] FetchError),
}

/// Build a machine from `config`, fetching trivia over HTTP when the
/// config points at a remote source.
pub async fn bootstrap(config: &QuizConfig) -> Result<ConversationMachine, StartupError> {
    let source = match &config.trivia {
        TriviaOrigin::Remote { url, .. } => OpenTdbSource::new(url.clone()),
        TriviaOrigin::File(_) => OpenTdbSource::default(),
    };
    bootstrap_with_source(config, &source).await
}

/// Same as [`bootstrap`], with the remote trivia source supplied by the caller.
pub async fn bootstrap_with_source<S: QuestionSource>(
    config: &QuizConfig,
    source: &S,
) -> Result<ConversationMachine, StartupError> {
    let trivia = match &config.trivia {
        TriviaOrigin::Remote { query, .. } => source.fetch_trivia(query).await?,
        TriviaOrigin::File(path) => {
            tracing::info!(path = %path.display(), "loading trivia pool from file");
            bank::load_trivia_ron(path)?
        }
    };
    bootstrap_with_trivia(config, trivia)
}

/// Build a machine around an already loaded trivia pool. Riddles and
/// feedback come from the configured override files or the bundled data.
pub fn bootstrap_with_trivia(
    config: &QuizConfig,
    trivia: Vec<Question>,
) -> Result<ConversationMachine, StartupError> {
    let riddles = match &config.riddles_path {
        Some(path) => bank::load_riddles_ron(path)?,
        None => bank::parse_riddles_ron(data::RIDDLES)?,
    };
    let feedback = match &config.feedback_path {
        Some(path) => FeedbackPool::load_from_ron(path)?,
        None => FeedbackPool::parse_ron(data::FEEDBACK)?,
    };
    let bank = QuestionBank::new(trivia, riddles)?;

    tracing::info!(
        trivia = bank.trivia_len(),
        riddles = bank.riddle_len(),
        positive = feedback.len(Polarity::Positive),
        negative = feedback.len(Polarity::Negative),
        "pools loaded"
    );

    let mut builder = ConversationMachine::builder()
        .with_bank(bank)
        .with_feedback(feedback)
        .bot_name(config.bot_name.clone());
    if let Some(seed) = config.seed {
        builder = builder.seed(seed);
    }
    Ok(builder.build()?)
}

/// The trivia pool bundled with the library, for running without network access.
pub fn bundled_trivia() -> Result<Vec<Question>, StartupError> {
    Ok(bank::parse_trivia_ron(data::TRIVIA)?)
}
