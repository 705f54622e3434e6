/// Remote trivia source: fetches questions from an Open Trivia DB style API.
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::future::Future;
use thiserror::Error;

use crate::schema::question::{Difficulty, Question};

pub const DEFAULT_TRIVIA_URL: &str = "https://opentdb.com/api.php";
pub const DEFAULT_TRIVIA_AMOUNT: u32 = 100;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("trivia source answered HTTP {status}")]
    Status { status: StatusCode },
    #[error("trivia source returned response code {0}")]
    ResponseCode(u8),
    #[error("could not decode trivia response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Which questions to ask the source for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriviaQuery {
    pub amount: u32,
    pub category: Option<u32>,
    pub difficulty: Option<Difficulty>,
}

impl Default for TriviaQuery {
    fn default() -> Self {
        Self {
            amount: DEFAULT_TRIVIA_AMOUNT,
            category: None,
            difficulty: None,
        }
    }
}

impl TriviaQuery {
    /// Request URL against `base`. Always asks for four-choice questions.
    pub fn url(&self, base: &str) -> String {
        let mut url = format!("{}?amount={}&type=multiple", base, self.amount);
        if let Some(category) = self.category {
            url.push_str(&format!("&category={}", category));
        }
        if let Some(difficulty) = self.difficulty {
            url.push_str(&format!("&difficulty={}", difficulty.as_str()));
        }
        url
    }
}

/// Where trivia questions come from at startup.
pub trait QuestionSource: Send + Sync {
    fn fetch_trivia(
        &self,
        query: &TriviaQuery,
    ) -> impl Future<Output = Result<Vec<Question>, FetchError>> + Send;
}

/// HTTP client for the Open Trivia DB API.
#[derive(Debug, Clone)]
pub struct OpenTdbSource {
    client: Client,
    base_url: String,
}

impl OpenTdbSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for OpenTdbSource {
    fn default() -> Self {
        Self::new(DEFAULT_TRIVIA_URL)
    }
}

impl QuestionSource for OpenTdbSource {
    async fn fetch_trivia(&self, query: &TriviaQuery) -> Result<Vec<Question>, FetchError> {
        let url = query.url(&self.base_url);
        tracing::info!(url = %url, "fetching trivia questions");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }
        let body = response.text().await?;
        let questions = parse_response(&body)?;

        tracing::info!(count = questions.len(), "fetched trivia questions");
        Ok(questions)
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    response_code: u8,
    #[serde(default)]
    results: Vec<Question>,
}

/// Decode an API response body, keeping only questions that fill all four
/// answer slots.
pub fn parse_response(body: &str) -> Result<Vec<Question>, FetchError> {
    let response: ApiResponse = serde_json::from_str(body)?;
    if response.response_code != 0 {
        return Err(FetchError::ResponseCode(response.response_code));
    }
    Ok(response
        .results
        .into_iter()
        .filter(|q| {
            let keep = q.is_well_formed();
            if !keep {
                tracing::warn!(
                    prompt = %q.prompt,
                    incorrect = q.incorrect_answers.len(),
                    "skipping trivia question without three incorrect answers"
                );
            }
            keep
        })
        .collect())
}
