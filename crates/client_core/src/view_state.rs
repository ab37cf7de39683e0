//! Panel and control visibility derived from the latest server snapshots.

use std::collections::BTreeSet;

use shared::domain::{Characteristic, Service};

use crate::{
    state::{Action, TermCheck},
    types::Snapshot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NoCharacter,
    Attributes,
    ServiceSelection,
    TermInProgress,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Control {
    pub visible: bool,
    pub enabled: bool,
}

impl Control {
    pub const HIDDEN: Control = Control {
        visible: false,
        enabled: false,
    };

    fn shown(enabled: bool) -> Self {
        Self {
            visible: true,
            enabled,
        }
    }

    fn when(visible: bool, enabled: bool) -> Self {
        if visible {
            Self::shown(enabled)
        } else {
            Self::HIDDEN
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub phase: Phase,
    pub create_prompt: bool,
    pub attribute_panel: bool,
    pub service_panel: bool,
    pub term_panel: bool,
    pub create: Control,
    pub delete: Control,
    pub attributes: [(Characteristic, Control); 6],
    pub services: [(Service, Control); 6],
    pub survival: Control,
    pub commission: Control,
    pub promotion: Control,
    pub reenlistment: Control,
}

impl ViewState {
    pub fn attribute(&self, characteristic: Characteristic) -> Control {
        self.attributes[characteristic.upp_index()].1
    }

    pub fn service(&self, service: Service) -> Control {
        self.services
            .iter()
            .find(|(candidate, _)| *candidate == service)
            .map(|(_, control)| *control)
            .unwrap_or(Control::HIDDEN)
    }

    pub fn term_check(&self, check: TermCheck) -> Control {
        match check {
            TermCheck::Survival => self.survival,
            TermCheck::Commission => self.commission,
            TermCheck::Promotion => self.promotion,
        }
    }
}

pub fn phase_of(snapshot: &Snapshot) -> Phase {
    match &snapshot.character {
        None => Phase::NoCharacter,
        Some(character) if character.has_service() => Phase::TermInProgress,
        Some(character) if character.revealed.is_complete() => Phase::ServiceSelection,
        Some(_) => Phase::Attributes,
    }
}

pub fn derive_view_state(snapshot: &Snapshot, pending: &BTreeSet<Action>) -> ViewState {
    let idle = |action: Action| !pending.iter().any(|p| p.conflicts_with(&action));
    let phase = phase_of(snapshot);
    let has_character = snapshot.character.is_some();

    let attribute_panel = phase == Phase::Attributes;
    let service_panel = phase == Phase::ServiceSelection;
    let term_panel = phase == Phase::TermInProgress;

    let attributes = Characteristic::ALL.map(|characteristic| {
        let unrevealed = snapshot
            .character
            .as_ref()
            .is_some_and(|character| !character.revealed.contains(characteristic));
        let control = Control::when(
            attribute_panel && unrevealed,
            idle(Action::Reveal(characteristic)),
        );
        (characteristic, control)
    });

    let services = Service::ALL
        .map(|service| (service, Control::when(service_panel, idle(Action::Enlist(service)))));

    let flags = snapshot.buttons.unwrap_or_default();
    let promotion_closed = flags.promotion_completed
        || (flags.commission_completed && !flags.commission_succeeded);
    let term_control = |visible: bool, action: Action| Control::when(term_panel && visible, idle(action));

    ViewState {
        phase,
        create_prompt: !has_character,
        attribute_panel,
        service_panel,
        term_panel,
        create: Control::shown(!has_character && idle(Action::Create)),
        delete: Control::shown(has_character && idle(Action::Delete)),
        attributes,
        services,
        survival: term_control(
            !flags.survival_completed,
            Action::Check(TermCheck::Survival),
        ),
        commission: term_control(
            !flags.commission_completed,
            Action::Check(TermCheck::Commission),
        ),
        promotion: term_control(!promotion_closed, Action::Check(TermCheck::Promotion)),
        reenlistment: term_control(true, Action::Reenlist),
    }
}
