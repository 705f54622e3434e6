//! Process configuration read from environment variables.
//!
//! [`QuizConfig`] covers everything the engine needs and is enough for the
//! offline tools. [`BotConfig`] adds the bot token, which only a deployed
//! bot requires.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::core::machine::DEFAULT_BOT_NAME;
use crate::core::source::{TriviaQuery, DEFAULT_TRIVIA_AMOUNT, DEFAULT_TRIVIA_URL};
use crate::schema::question::Difficulty;

pub const TOKEN_VAR: &str = "TELEGRAM_KEY";
pub const TRIVIA_PATH_VAR: &str = "QUIZ_TRIVIA_PATH";
pub const TRIVIA_AMOUNT_VAR: &str = "QUIZ_TRIVIA_AMOUNT";
pub const TRIVIA_CATEGORY_VAR: &str = "QUIZ_TRIVIA_CATEGORY";
pub const TRIVIA_DIFFICULTY_VAR: &str = "QUIZ_TRIVIA_DIFFICULTY";
pub const TRIVIA_URL_VAR: &str = "QUIZ_TRIVIA_URL";
pub const RIDDLES_PATH_VAR: &str = "QUIZ_RIDDLES_PATH";
pub const FEEDBACK_PATH_VAR: &str = "QUIZ_FEEDBACK_PATH";
pub const SEED_VAR: &str = "QUIZ_SEED";
pub const BOT_NAME_VAR: &str = "QUIZ_BOT_NAME";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {var} has invalid value {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Bot API credential. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct BotToken(String);

impl BotToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BotToken(<redacted>)")
    }
}

/// Where the trivia pool comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriviaOrigin {
    Remote { url: String, query: TriviaQuery },
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    pub trivia: TriviaOrigin,
    /// Override for the bundled riddle pool.
    pub riddles_path: Option<PathBuf>,
    /// Override for the bundled feedback pool.
    pub feedback_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub bot_name: String,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            trivia: TriviaOrigin::Remote {
                url: DEFAULT_TRIVIA_URL.to_string(),
                query: TriviaQuery::default(),
            },
            riddles_path: None,
            feedback_path: None,
            seed: None,
            bot_name: DEFAULT_BOT_NAME.to_string(),
        }
    }
}

impl QuizConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let trivia = match get(TRIVIA_PATH_VAR) {
            Some(path) => TriviaOrigin::File(PathBuf::from(path)),
            None => {
                let difficulty = match get(TRIVIA_DIFFICULTY_VAR) {
                    Some(raw) => Some(Difficulty::parse(raw.trim()).ok_or(ConfigError::Invalid {
                        var: TRIVIA_DIFFICULTY_VAR,
                        value: raw,
                    })?),
                    None => None,
                };
                TriviaOrigin::Remote {
                    url: get(TRIVIA_URL_VAR).unwrap_or_else(|| DEFAULT_TRIVIA_URL.to_string()),
                    query: TriviaQuery {
                        amount: parse_var(TRIVIA_AMOUNT_VAR, get(TRIVIA_AMOUNT_VAR))?
                            .unwrap_or(DEFAULT_TRIVIA_AMOUNT),
                        category: parse_var(TRIVIA_CATEGORY_VAR, get(TRIVIA_CATEGORY_VAR))?,
                        difficulty,
                    },
                }
            }
        };

        Ok(Self {
            trivia,
            riddles_path: get(RIDDLES_PATH_VAR).map(PathBuf::from),
            feedback_path: get(FEEDBACK_PATH_VAR).map(PathBuf::from),
            seed: parse_var(SEED_VAR, get(SEED_VAR))?,
            bot_name: get(BOT_NAME_VAR).unwrap_or_else(|| DEFAULT_BOT_NAME.to_string()),
        })
    }
}

/// Full configuration of a deployed bot.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: BotToken,
    pub quiz: QuizConfig,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(TOKEN_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(TOKEN_VAR))?;
        Ok(Self {
            token: BotToken::new(token.trim()),
            quiz: QuizConfig::from_lookup(lookup)?,
        })
    }
}

fn parse_var<T: FromStr>(var: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError> {
    raw.map(|value| {
        value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value })
    })
    .transpose()
}
