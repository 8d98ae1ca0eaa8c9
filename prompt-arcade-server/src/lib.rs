//! # prompt-arcade-server
//!
//! HTTP front end for `prompt-arcade`: classify prompts, generate games,
//! keep the most recent ones in memory and serve them as playable pages.
//! Intros can optionally be rewritten by an OpenAI-compatible LLM.

pub mod api;
pub mod app;
pub mod config;
pub mod llm;
pub mod store;
