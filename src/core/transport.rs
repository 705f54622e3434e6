/// Boundary types exchanged with the chat transport.
///
/// The engine never talks to a chat service directly. Inbound updates are
/// handed to the conversation machine as [`Inbound`] values and replies
/// come back as [`Reply`] values, which a [`Transport`] implementation
/// renders and delivers.
use std::future::Future;

use crate::schema::session::UserId;

/// Payload of an inbound update.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Photo(Vec<u8>),
    Location { latitude: f64, longitude: f64 },
}

/// One update received from a user.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    pub user_id: UserId,
    /// First name as reported by the transport, if any.
    pub display_name: Option<String>,
    pub payload: Payload,
}

impl Inbound {
    pub fn text(user_id: UserId, text: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: None,
            payload: Payload::Text(text.into()),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Rich-text mode the transport should render a reply with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Html,
}

/// A reply keyboard: rows of button labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<String>>,
    /// Hide the keyboard after one press.
    pub one_time: bool,
}

impl Keyboard {
    pub fn one_time<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
            one_time: true,
        }
    }
}

/// Rendering hints attached to a reply. Opaque to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyOptions {
    pub keyboard: Option<Keyboard>,
    pub parse_mode: Option<ParseMode>,
}

/// A message to send back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub options: Option<ReplyOptions>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.options.get_or_insert_with(ReplyOptions::default).keyboard = Some(keyboard);
        self
    }

    pub fn with_parse_mode(mut self, mode: ParseMode) -> Self {
        self.options.get_or_insert_with(ReplyOptions::default).parse_mode = Some(mode);
        self
    }

    pub fn keyboard(&self) -> Option<&Keyboard> {
        self.options.as_ref().and_then(|o| o.keyboard.as_ref())
    }
}

/// Outbound side of the chat transport.
pub trait Transport: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Deliver one text message to a user.
    fn send_text(
        &self,
        user_id: UserId,
        text: &str,
        options: Option<&ReplyOptions>,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
