//! parley-bot - a plugin-driven groupchat bot core
//!
//! Inbound messages flow through the [`Dispatcher`](application::messaging::Dispatcher):
//! observers see everything, addressing decides whether the bot was spoken
//! to, aliases are rewritten, and exactly one plugin handler answers.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod plugins;
