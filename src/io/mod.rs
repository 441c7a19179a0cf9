//! I/O edges of the recruitment flow.

pub mod catalog;
pub mod config;
pub mod gateway;
pub mod gemini;
pub mod prompt;
