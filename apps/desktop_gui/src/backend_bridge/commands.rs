//! Backend commands queued from UI to backend worker.

use client_core::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCommand {
    Perform(Action),
}

impl BackendCommand {
    pub fn action(&self) -> Action {
        match self {
            BackendCommand::Perform(action) => *action,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Perform(action) => action.name(),
        }
    }
}
