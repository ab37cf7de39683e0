//! Draws the rendered [`Page`]; elements the page does not carry are skipped.

use client_core::{render::LogLine, Action, ElementId, Page};
use shared::domain::{Characteristic, Service};

const RECORD_FIELDS: [ElementId; 11] = [
    ElementId::CharacterName,
    ElementId::CharacterService,
    ElementId::CharacterRank,
    ElementId::CharacterUpp,
    ElementId::CharacterAge,
    ElementId::CharacterTerms,
    ElementId::CharacterCash,
    ElementId::CharacterStarship,
    ElementId::CharacterWeapons,
    ElementId::CharacterTas,
    ElementId::EnlistmentOutcome,
];

const TERM_FIELDS: [ElementId; 9] = [
    ElementId::CurrentTerm,
    ElementId::SurvivalOutcome,
    ElementId::CommissioningOutcome,
    ElementId::PromotionOutcome,
    ElementId::TermSkillsEligibility,
    ElementId::CommissionSkillsEligibility,
    ElementId::PromotionSkillsEligibility,
    ElementId::AgeingEffects,
    ElementId::ReenlistmentOutcome,
];

const TERM_BUTTONS: [ElementId; 4] = [
    ElementId::SurvivalButton,
    ElementId::CommissionButton,
    ElementId::PromotionButton,
    ElementId::ReenlistmentButton,
];

fn text_line(ui: &mut egui::Ui, page: &Page, id: ElementId) {
    if let Some(text) = page.text(id).filter(|text| !text.is_empty()) {
        ui.label(text);
    }
}

fn panel_visible(page: &Page, id: ElementId) -> bool {
    page.is_visible(id).unwrap_or(false)
}

/// Draws a button if the page carries it and it is visible.
fn control_button(ui: &mut egui::Ui, page: &Page, id: ElementId) -> Option<Action> {
    let element = page.get(id).filter(|element| element.visible)?;
    let clicked = ui
        .add_enabled(element.enabled, egui::Button::new(id.label()))
        .clicked();
    if clicked {
        id.action()
    } else {
        None
    }
}

pub fn record_panel(ui: &mut egui::Ui, page: &Page) {
    if let Some(title) = page
        .text(ElementId::CharacterTitle)
        .filter(|title| !title.is_empty())
    {
        ui.heading(title);
    }
    for id in RECORD_FIELDS {
        text_line(ui, page, id);
    }

    let characteristics: Vec<&str> = Characteristic::ALL
        .into_iter()
        .filter_map(|c| page.text(ElementId::CharacteristicValue(c)))
        .filter(|text| !text.is_empty())
        .collect();
    if !characteristics.is_empty() {
        ui.separator();
        ui.horizontal_wrapped(|ui| {
            for text in characteristics {
                ui.monospace(text);
            }
        });
    }
}

/// Central panel: whichever of prompt, attributes, services and term is
/// visible, plus create/delete. Returns the clicked action, if any.
pub fn action_panel(ui: &mut egui::Ui, page: &Page) -> Option<Action> {
    let mut clicked = None;

    if panel_visible(page, ElementId::CreatePrompt) {
        text_line(ui, page, ElementId::CreatePrompt);
    }
    ui.horizontal(|ui| {
        for id in [ElementId::CreateButton, ElementId::DeleteButton] {
            clicked = clicked.or(control_button(ui, page, id));
        }
    });

    if panel_visible(page, ElementId::AttributePanel) {
        ui.separator();
        ui.strong(ElementId::AttributePanel.label());
        ui.horizontal_wrapped(|ui| {
            for characteristic in Characteristic::ALL {
                let id = ElementId::AttributeButton(characteristic);
                clicked = clicked.or(control_button(ui, page, id));
            }
        });
    }

    if panel_visible(page, ElementId::ServicePanel) {
        ui.separator();
        ui.strong(ElementId::ServicePanel.label());
        ui.horizontal_wrapped(|ui| {
            for service in Service::ALL {
                clicked = clicked.or(control_button(ui, page, ElementId::ServiceButton(service)));
            }
        });
    }

    if panel_visible(page, ElementId::TermPanel) {
        ui.separator();
        match page.text(ElementId::TermTitle).filter(|t| !t.is_empty()) {
            Some(title) => ui.strong(title),
            None => ui.strong(ElementId::TermPanel.label()),
        };
        for id in TERM_FIELDS {
            text_line(ui, page, id);
        }
        ui.horizontal_wrapped(|ui| {
            for id in TERM_BUTTONS {
                clicked = clicked.or(control_button(ui, page, id));
            }
        });
    }

    clicked
}

pub fn outcome_log(ui: &mut egui::Ui, page: &Page) {
    let Some(lines) = page.log(ElementId::TermOutcomeLog) else {
        return;
    };
    if lines.is_empty() {
        return;
    }
    ui.separator();
    ui.strong("Term Outcomes");
    egui::ScrollArea::vertical()
        .max_height(180.0)
        .show(ui, |ui| {
            for LogLine { text, emphasis } in lines {
                if *emphasis {
                    ui.strong(text);
                } else {
                    ui.monospace(text);
                }
            }
        });
}
