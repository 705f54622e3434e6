//! Quiz Engine: a conversational trivia and riddle game for chat bots.
//!
//! Each user gets a session that moves through a small state machine:
//! a menu, a multiple-choice trivia loop, a free-text riddle loop, and a
//! terminal state. Questions are drawn without repetition until a pool is
//! exhausted, and feedback phrases rotate the same way.

pub mod config;
pub mod core;
pub mod schema;
pub mod startup;
