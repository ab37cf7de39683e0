//! Worker thread that owns the async runtime and the character client.

pub mod commands;
pub mod runtime;
