//! Shared data types: questions, feedback phrases, and per-user sessions.

pub mod feedback;
pub mod question;
pub mod session;
