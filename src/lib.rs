//! Prompt Arcade: turns a short game prompt into a self-contained HTML5 game.
//!
//! A prompt is scored against a keyword catalog of game categories, one
//! variant of each template value is picked with a seedable RNG, and the
//! result is substituted into the category's HTML skeleton.

pub mod core;
pub mod schema;
