//! Terminal front-end for the wish pity tracker.

pub mod command;
pub mod config;
pub mod prompt;
pub mod render;
pub mod repl;
