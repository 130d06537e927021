//! Shared library surface for briefing server components and tests.

pub mod api;
pub mod briefing;
pub mod config;
pub mod geocode;
pub mod llm;
pub mod owm;
pub mod state;
