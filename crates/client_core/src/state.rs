//! Session state owned by the front end: latest snapshots, action outcomes,
//! in-flight actions and the status line.

use std::{collections::BTreeSet, fmt};

use shared::{
    domain::{Characteristic, Service},
    protocol::{CreateCharacterResponse, RevealCharacteristicResponse, RollOutcome},
};
use tracing::{debug, info, warn};

use crate::{
    config::Features,
    error::ClientError,
    types::{CharacterSummary, EnlistmentOutcome, ReenlistmentOutcome, Snapshot},
    view_state::{derive_view_state, ViewState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TermCheck {
    Survival,
    Commission,
    Promotion,
}

impl TermCheck {
    pub const ALL: [TermCheck; 3] = [TermCheck::Survival, TermCheck::Commission, TermCheck::Promotion];

    pub fn label(self) -> &'static str {
        match self {
            TermCheck::Survival => "Survival",
            TermCheck::Commission => "Commission",
            TermCheck::Promotion => "Promotion",
        }
    }
}

/// Every user-triggerable request, one per page control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    Refresh,
    Create,
    Delete,
    Reveal(Characteristic),
    Enlist(Service),
    Check(TermCheck),
    Reenlist,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Refresh => "refresh",
            Action::Create => "create_character",
            Action::Delete => "delete_character",
            Action::Reveal(_) => "reveal_characteristic",
            Action::Enlist(_) => "attempt_enlistment",
            Action::Check(TermCheck::Survival) => "term_survival",
            Action::Check(TermCheck::Commission) => "term_commission",
            Action::Check(TermCheck::Promotion) => "term_promotion",
            Action::Reenlist => "term_reenlistment",
        }
    }

    /// Two actions conflict when they drive the same control. The service
    /// buttons count as one control: a character enlists once.
    pub fn conflicts_with(&self, other: &Action) -> bool {
        self == other || matches!((self, other), (Action::Enlist(_), Action::Enlist(_)))
    }

    pub fn pending_message(&self) -> String {
        match self {
            Action::Refresh => "Refreshing character...".to_string(),
            Action::Create => "Creating character...".to_string(),
            Action::Delete => "Deleting character...".to_string(),
            Action::Reveal(characteristic) => format!("Revealing {}...", characteristic.label()),
            Action::Enlist(service) => format!("Attempting enlistment in the {service}..."),
            Action::Check(check) => format!("Rolling {} check...", check.label().to_ascii_lowercase()),
            Action::Reenlist => "Rolling re-enlistment...".to_string(),
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            Action::Refresh => "Error refreshing character.",
            Action::Create => "Error creating character.",
            Action::Delete => "Error deleting character.",
            Action::Reveal(_) => "Error revealing characteristic.",
            Action::Enlist(_) => "Error attempting enlistment.",
            Action::Check(TermCheck::Survival) => "Error checking survival.",
            Action::Check(TermCheck::Commission) => "Error checking commission.",
            Action::Check(TermCheck::Promotion) => "Error checking promotion.",
            Action::Reenlist => "Error checking re-enlistment.",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Reveal(characteristic) => write!(f, "{} {characteristic}", self.name()),
            Action::Enlist(service) => write!(f, "{} {service}", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ActionOutcome {
    Refreshed,
    Created(CreateCharacterResponse),
    Deleted { deleted: bool },
    Revealed {
        characteristic: Characteristic,
        response: RevealCharacteristicResponse,
    },
    /// The server refused the reveal with a 400; nothing changes.
    RevealRejected(Characteristic),
    Enlisted(EnlistmentOutcome),
    Rolled { check: TermCheck, outcome: RollOutcome },
    Reenlisted(ReenlistmentOutcome),
}

/// Result of running one action, plus the refresh that followed it.
#[derive(Debug)]
pub struct ActionReport {
    pub action: Action,
    pub result: Result<ActionOutcome, ClientError>,
    pub snapshot: Option<Snapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub severity: Severity,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    features: Features,
    snapshot: Snapshot,
    enlistment: Option<EnlistmentOutcome>,
    reenlistment: Option<ReenlistmentOutcome>,
    /// Term label the re-enlistment outcome was recorded in.
    reenlisted_in: Option<String>,
    status: Option<StatusMessage>,
    pending: BTreeSet<Action>,
    initialized: bool,
}

impl AppState {
    pub fn new(features: Features) -> Self {
        Self {
            features,
            ..Self::default()
        }
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn character(&self) -> Option<&CharacterSummary> {
        self.snapshot.character.as_ref()
    }

    pub fn enlistment(&self) -> Option<&EnlistmentOutcome> {
        self.enlistment.as_ref()
    }

    pub fn reenlistment(&self) -> Option<&ReenlistmentOutcome> {
        self.reenlistment.as_ref()
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn set_status(&mut self, status: StatusMessage) {
        self.status = Some(status);
    }

    pub fn pending(&self) -> &BTreeSet<Action> {
        &self.pending
    }

    /// True once the first refresh has landed.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_blocked(&self, action: &Action) -> bool {
        self.pending.iter().any(|pending| pending.conflicts_with(action))
    }

    /// Marks `action` in flight. Returns false, leaving state untouched, when a
    /// conflicting action is already in flight.
    pub fn begin(&mut self, action: Action) -> bool {
        if self.is_blocked(&action) {
            debug!(action = %action, "ignoring action already in flight");
            return false;
        }
        self.pending.insert(action);
        true
    }

    /// Drops an in-flight mark without a result, e.g. when dispatch failed.
    pub fn cancel(&mut self, action: &Action) {
        self.pending.remove(action);
    }

    pub fn working_message(&self) -> Option<String> {
        self.pending.iter().next().map(Action::pending_message)
    }

    /// Clears every mirror of server state, as after a delete.
    pub fn teardown(&mut self) {
        self.snapshot = Snapshot::default();
        self.enlistment = None;
        self.reenlistment = None;
    }

    pub fn apply(&mut self, report: ActionReport) {
        let ActionReport {
            action,
            result,
            snapshot,
        } = report;
        self.pending.remove(&action);

        match result {
            Err(err) => {
                warn!(action = %action, error = %err, "action failed");
                self.status = Some(StatusMessage::error(action.failure_message()));
                return;
            }
            Ok(outcome) => self.apply_outcome(action, outcome),
        }

        if let Some(snapshot) = snapshot {
            self.initialized = true;
            if snapshot.character.is_none() {
                self.enlistment = None;
                self.reenlistment = None;
            } else if self.reenlistment.is_some()
                && snapshot.term_label() != self.reenlisted_in.as_deref()
            {
                debug!("new term started; dropping re-enlistment outcome");
                self.reenlistment = None;
            }
            self.snapshot = snapshot;
        }
    }

    fn apply_outcome(&mut self, action: Action, outcome: ActionOutcome) {
        info!(action = %action, "action completed");
        match outcome {
            ActionOutcome::Refreshed => {}
            ActionOutcome::Created(created) => {
                self.teardown();
                self.snapshot.character = CharacterSummary::from_created(&created);
                let name = created.name.as_deref().unwrap_or("unnamed traveller");
                self.status = Some(StatusMessage::info(format!("Created character: {name}")));
            }
            ActionOutcome::Deleted { deleted } => {
                self.teardown();
                self.status = Some(StatusMessage::info(if deleted {
                    "Character deleted."
                } else {
                    "No character to delete."
                }));
            }
            ActionOutcome::Revealed { response, .. } => {
                if let Some(character) = self.snapshot.character.as_mut() {
                    character.apply_reveal(&response);
                }
                self.status = None;
            }
            ActionOutcome::RevealRejected(characteristic) => {
                debug!(characteristic = %characteristic, "reveal rejected; leaving state unchanged");
            }
            ActionOutcome::Enlisted(outcome) => {
                if let Some(character) = self.snapshot.character.as_mut() {
                    character.service = outcome.service.clone();
                }
                self.status = Some(StatusMessage::info(outcome.summary()));
                self.enlistment = Some(outcome);
            }
            ActionOutcome::Rolled { check, outcome } => {
                let slot = match check {
                    TermCheck::Survival => &mut self.snapshot.rolls.survival,
                    TermCheck::Commission => &mut self.snapshot.rolls.commission,
                    TermCheck::Promotion => &mut self.snapshot.rolls.promotion,
                };
                *slot = Some(outcome).filter(|outcome| !outcome.is_empty());
                self.status = None;
            }
            ActionOutcome::Reenlisted(outcome) => {
                self.status = Some(StatusMessage::info(outcome.summary()));
                self.reenlisted_in = self.snapshot.term_label().map(str::to_string);
                self.reenlistment = Some(outcome);
            }
        }
    }

    pub fn view(&self) -> ViewState {
        derive_view_state(&self.snapshot, &self.pending)
    }
}
