use serde::{Deserialize, Serialize};

/// Newtype wrapper for feedback phrase IDs (stable index within a polarity pool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PhraseId(pub u32);

/// Whether a phrase congratulates or commiserates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

/// A flavor-text line sent after an answer is judged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackPhrase {
    pub id: PhraseId,
    pub polarity: Polarity,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polarity_names() {
        assert_eq!(Polarity::Positive.name(), "positive");
        assert_eq!(Polarity::Negative.name(), "negative");
    }
}
