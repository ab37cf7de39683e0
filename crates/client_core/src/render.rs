//! Maps application state onto a page of bound elements.
//!
//! Pages differ in which elements they carry, so every element a renderer
//! touches goes through a [`BindingTable`]; writes to unbound elements are
//! dropped by the [`Surface`].

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    str::FromStr,
};

use shared::{
    domain::{upp_digit, Characteristic, Service},
    protocol::RollOutcome,
};

use crate::{
    config::{ClientSettings, ConfigError, Layout},
    state::{Action, AppState, TermCheck},
    view_state::{Control, ViewState},
};

const CREATE_PROMPT: &str = "No character found. Please create a character.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementId {
    CreatePrompt,
    CharacterTitle,
    CharacterName,
    CharacterService,
    CharacterRank,
    CharacterUpp,
    CharacterAge,
    CharacterTerms,
    CharacterCash,
    CharacterStarship,
    CharacterWeapons,
    CharacterTas,
    CharacteristicValue(Characteristic),
    EnlistmentOutcome,
    CurrentTerm,
    SurvivalOutcome,
    CommissioningOutcome,
    PromotionOutcome,
    TermSkillsEligibility,
    CommissionSkillsEligibility,
    PromotionSkillsEligibility,
    AgeingEffects,
    ReenlistmentOutcome,
    TermOutcomeLog,
    MessageDisplay,
    CreateButton,
    DeleteButton,
    AttributePanel,
    AttributeButton(Characteristic),
    ServicePanel,
    ServiceButton(Service),
    TermPanel,
    TermTitle,
    SurvivalButton,
    CommissionButton,
    PromotionButton,
    ReenlistmentButton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Text,
    Log,
    Panel,
    Button,
}

impl ElementId {
    pub fn all() -> Vec<ElementId> {
        let mut ids = vec![
            ElementId::CreatePrompt,
            ElementId::CharacterTitle,
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
        ];
        ids.extend(Characteristic::ALL.map(ElementId::CharacteristicValue));
        ids.extend([
            ElementId::EnlistmentOutcome,
            ElementId::CurrentTerm,
            ElementId::SurvivalOutcome,
            ElementId::CommissioningOutcome,
            ElementId::PromotionOutcome,
            ElementId::TermSkillsEligibility,
            ElementId::CommissionSkillsEligibility,
            ElementId::PromotionSkillsEligibility,
            ElementId::AgeingEffects,
            ElementId::ReenlistmentOutcome,
            ElementId::TermOutcomeLog,
            ElementId::MessageDisplay,
            ElementId::CreateButton,
            ElementId::DeleteButton,
            ElementId::AttributePanel,
        ]);
        ids.extend(Characteristic::ALL.map(ElementId::AttributeButton));
        ids.push(ElementId::ServicePanel);
        ids.extend(Service::ALL.map(ElementId::ServiceButton));
        ids.extend([
            ElementId::TermPanel,
            ElementId::TermTitle,
            ElementId::SurvivalButton,
            ElementId::CommissionButton,
            ElementId::PromotionButton,
            ElementId::ReenlistmentButton,
        ]);
        ids
    }

    /// Stable page id, e.g. `character-name` or `strength-btn`.
    pub fn id(&self) -> String {
        let fixed = match self {
            ElementId::CreatePrompt => "create-prompt",
            ElementId::CharacterTitle => "character-title",
            ElementId::CharacterName => "character-name",
            ElementId::CharacterService => "character-service",
            ElementId::CharacterRank => "character-rank",
            ElementId::CharacterUpp => "character-upp",
            ElementId::CharacterAge => "character-age",
            ElementId::CharacterTerms => "character-terms",
            ElementId::CharacterCash => "character-cash",
            ElementId::CharacterStarship => "character-starship",
            ElementId::CharacterWeapons => "character-weapons",
            ElementId::CharacterTas => "character-tas",
            ElementId::CharacteristicValue(characteristic) => {
                return format!(
                    "characteristic-{}",
                    characteristic.abbreviation().to_ascii_lowercase()
                )
            }
            ElementId::EnlistmentOutcome => "enlistment-outcome",
            ElementId::CurrentTerm => "current-term",
            ElementId::SurvivalOutcome => "survival-outcome",
            ElementId::CommissioningOutcome => "commissioning-outcome",
            ElementId::PromotionOutcome => "promotion-outcome",
            ElementId::TermSkillsEligibility => "term-skills-eligibility",
            ElementId::CommissionSkillsEligibility => "commission-skills-eligibility",
            ElementId::PromotionSkillsEligibility => "promotion-skills-eligibility",
            ElementId::AgeingEffects => "ageing-effects",
            ElementId::ReenlistmentOutcome => "reenlistment-outcome",
            ElementId::TermOutcomeLog => "term-outcome-log",
            ElementId::MessageDisplay => "message-display",
            ElementId::CreateButton => "create-btn",
            ElementId::DeleteButton => "delete-btn",
            ElementId::AttributePanel => "attribute-buttons",
            ElementId::AttributeButton(characteristic) => {
                return format!("{}-btn", characteristic.as_str())
            }
            ElementId::ServicePanel => "service-buttons",
            ElementId::ServiceButton(service) => return format!("{}-btn", service.key()),
            ElementId::TermPanel => "term-section",
            ElementId::TermTitle => "term-title",
            ElementId::SurvivalButton => "survival-btn",
            ElementId::CommissionButton => "commission-btn",
            ElementId::PromotionButton => "promotion-btn",
            ElementId::ReenlistmentButton => "reenlistment-btn",
        };
        fixed.to_string()
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            ElementId::TermOutcomeLog => ElementKind::Log,
            ElementId::AttributePanel | ElementId::ServicePanel | ElementId::TermPanel => {
                ElementKind::Panel
            }
            ElementId::CreateButton
            | ElementId::DeleteButton
            | ElementId::AttributeButton(_)
            | ElementId::ServiceButton(_)
            | ElementId::SurvivalButton
            | ElementId::CommissionButton
            | ElementId::PromotionButton
            | ElementId::ReenlistmentButton => ElementKind::Button,
            _ => ElementKind::Text,
        }
    }

    /// The action a button triggers; `None` for everything else.
    pub fn action(&self) -> Option<Action> {
        let action = match self {
            ElementId::CreateButton => Action::Create,
            ElementId::DeleteButton => Action::Delete,
            ElementId::AttributeButton(characteristic) => Action::Reveal(*characteristic),
            ElementId::ServiceButton(service) => Action::Enlist(*service),
            ElementId::SurvivalButton => Action::Check(TermCheck::Survival),
            ElementId::CommissionButton => Action::Check(TermCheck::Commission),
            ElementId::PromotionButton => Action::Check(TermCheck::Promotion),
            ElementId::ReenlistmentButton => Action::Reenlist,
            _ => return None,
        };
        Some(action)
    }

    /// Caption for buttons and panels.
    pub fn label(&self) -> String {
        match self {
            ElementId::CreateButton => "Create Character".to_string(),
            ElementId::DeleteButton => "Delete Character".to_string(),
            ElementId::AttributeButton(characteristic) => {
                format!("Reveal {}", characteristic.label())
            }
            ElementId::ServiceButton(service) => service.to_string(),
            ElementId::SurvivalButton => "Survival".to_string(),
            ElementId::CommissionButton => "Commission".to_string(),
            ElementId::PromotionButton => "Promotion".to_string(),
            ElementId::ReenlistmentButton => "Re-enlist".to_string(),
            ElementId::AttributePanel => "Reveal Characteristics".to_string(),
            ElementId::ServicePanel => "Choose a Service".to_string(),
            ElementId::TermPanel => "Term".to_string(),
            other => other.id(),
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

impl FromStr for ElementId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ElementId::all()
            .into_iter()
            .find(|id| id.id() == needle)
            .ok_or_else(|| ConfigError::UnknownElement(s.to_string()))
    }
}

/// The set of elements a page variant actually carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingTable {
    bound: BTreeSet<ElementId>,
}

impl BindingTable {
    pub fn full() -> Self {
        Self {
            bound: ElementId::all().into_iter().collect(),
        }
    }

    /// Controls plus the core record fields and the outcome log.
    pub fn compact() -> Self {
        Self {
            bound: ElementId::all()
                .into_iter()
                .filter(|id| {
                    matches!(id.kind(), ElementKind::Panel | ElementKind::Button | ElementKind::Log)
                        || matches!(
                            id,
                            ElementId::CreatePrompt
                                | ElementId::CharacterName
                                | ElementId::CharacterService
                                | ElementId::CharacterUpp
                                | ElementId::CharacterAge
                                | ElementId::CharacterTerms
                                | ElementId::EnlistmentOutcome
                                | ElementId::MessageDisplay
                        )
                })
                .collect(),
        }
    }

    pub fn for_layout(layout: Layout) -> Self {
        match layout {
            Layout::Full => Self::full(),
            Layout::Compact => Self::compact(),
        }
    }

    pub fn from_ids<S: AsRef<str>>(ids: &[S]) -> Result<Self, ConfigError> {
        let bound = ids
            .iter()
            .map(|id| id.as_ref().parse::<ElementId>())
            .collect::<Result<_, _>>()?;
        Ok(Self { bound })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ConfigError> {
        match &settings.bindings {
            Some(ids) => Self::from_ids(ids),
            None => Ok(Self::for_layout(settings.layout)),
        }
    }

    pub fn is_bound(&self, id: ElementId) -> bool {
        self.bound.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.bound.iter().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub text: String,
    pub emphasis: bool,
}

impl LogLine {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: false,
        }
    }

    fn heading(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: true,
        }
    }
}

/// Write target for the renderer. Implementations ignore elements they do
/// not carry.
pub trait Surface {
    fn set_text(&mut self, id: ElementId, text: &str);
    fn set_visible(&mut self, id: ElementId, visible: bool);
    fn set_enabled(&mut self, id: ElementId, enabled: bool);
    fn set_log(&mut self, id: ElementId, lines: &[LogLine]);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementState {
    pub text: String,
    pub visible: bool,
    pub enabled: bool,
    pub lines: Vec<LogLine>,
}

impl Default for ElementState {
    fn default() -> Self {
        Self {
            text: String::new(),
            visible: true,
            enabled: true,
            lines: Vec::new(),
        }
    }
}

/// In-memory page holding state for bound elements only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    elements: BTreeMap<ElementId, ElementState>,
}

impl Page {
    pub fn new(bindings: &BindingTable) -> Self {
        Self {
            elements: bindings
                .iter()
                .map(|id| (id, ElementState::default()))
                .collect(),
        }
    }

    pub fn get(&self, id: ElementId) -> Option<&ElementState> {
        self.elements.get(&id)
    }

    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.get(id).map(|element| element.text.as_str())
    }

    pub fn is_visible(&self, id: ElementId) -> Option<bool> {
        self.get(id).map(|element| element.visible)
    }

    pub fn is_enabled(&self, id: ElementId) -> Option<bool> {
        self.get(id).map(|element| element.visible && element.enabled)
    }

    pub fn log(&self, id: ElementId) -> Option<&[LogLine]> {
        self.get(id).map(|element| element.lines.as_slice())
    }

    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &ElementState)> {
        self.elements.iter().map(|(id, element)| (*id, element))
    }
}

impl Surface for Page {
    fn set_text(&mut self, id: ElementId, text: &str) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.text.clear();
            element.text.push_str(text);
        }
    }

    fn set_visible(&mut self, id: ElementId, visible: bool) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.visible = visible;
        }
    }

    fn set_enabled(&mut self, id: ElementId, enabled: bool) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.enabled = enabled;
        }
    }

    fn set_log(&mut self, id: ElementId, lines: &[LogLine]) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.lines = lines.to_vec();
        }
    }
}

/// Plain-text dump: non-empty text fields, the log, then visible controls.
impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut controls = Vec::new();
        for (id, element) in self.elements() {
            match id.kind() {
                ElementKind::Text if !element.text.is_empty() => writeln!(f, "{}", element.text)?,
                ElementKind::Log if !element.lines.is_empty() => {
                    for line in &element.lines {
                        writeln!(f, "  {}", line.text)?;
                    }
                }
                ElementKind::Button if element.visible => {
                    if element.enabled {
                        controls.push(format!("[{}]", id.label()));
                    } else {
                        controls.push(format!("({})", id.label()));
                    }
                }
                _ => {}
            }
        }
        if !controls.is_empty() {
            writeln!(f, "Actions: {}", controls.join(" "))?;
        }
        Ok(())
    }
}

pub fn render<S: Surface + ?Sized>(state: &AppState, surface: &mut S) {
    let view = state.view();
    render_controls(&view, surface);
    for (id, text) in text_fields(state) {
        surface.set_text(id, &text);
    }
    surface.set_log(ElementId::TermOutcomeLog, &outcome_log(state));
}

fn render_controls<S: Surface + ?Sized>(view: &ViewState, surface: &mut S) {
    let mut control = |id: ElementId, state: Control| {
        surface.set_visible(id, state.visible);
        surface.set_enabled(id, state.enabled);
    };

    control(ElementId::CreateButton, view.create);
    control(ElementId::DeleteButton, view.delete);
    for (characteristic, state) in view.attributes {
        control(ElementId::AttributeButton(characteristic), state);
    }
    for (service, state) in view.services {
        control(ElementId::ServiceButton(service), state);
    }
    control(ElementId::SurvivalButton, view.survival);
    control(ElementId::CommissionButton, view.commission);
    control(ElementId::PromotionButton, view.promotion);
    control(ElementId::ReenlistmentButton, view.reenlistment);

    surface.set_visible(ElementId::CreatePrompt, view.create_prompt);
    surface.set_visible(ElementId::AttributePanel, view.attribute_panel);
    surface.set_visible(ElementId::ServicePanel, view.service_panel);
    surface.set_visible(ElementId::TermPanel, view.term_panel);
}

fn labeled(label: &str, value: Option<&str>) -> String {
    value
        .map(|value| format!("{label}: {value}"))
        .unwrap_or_default()
}

/// Text for every text element. Absent values render as empty text so a
/// re-render clears stale fields.
pub fn text_fields(state: &AppState) -> Vec<(ElementId, String)> {
    let character = state.character();
    let term = state.snapshot().term.as_ref();

    let mut fields = vec![
        (
            ElementId::CreatePrompt,
            if character.is_none() {
                CREATE_PROMPT.to_string()
            } else {
                String::new()
            },
        ),
        (
            ElementId::CharacterTitle,
            character
                .and_then(|character| character.display_title())
                .unwrap_or_default(),
        ),
        (
            ElementId::CharacterName,
            labeled("Name", character.map(|character| character.name.as_str())),
        ),
        (
            ElementId::CharacterService,
            labeled("Service", character.and_then(|c| c.service.as_deref())),
        ),
        (ElementId::CharacterRank, labeled("Rank", character.and_then(|c| c.rank.as_deref()))),
        (
            ElementId::CharacterUpp,
            character
                .map(|character| character.upp_text())
                .unwrap_or_default(),
        ),
        (ElementId::CharacterAge, labeled("Age", character.and_then(|c| c.age.as_deref()))),
        (
            ElementId::CharacterTerms,
            labeled("Terms Served", character.and_then(|c| c.terms_served.as_deref())),
        ),
        (ElementId::CharacterCash, labeled("Cash", character.and_then(|c| c.cash.as_deref()))),
        (
            ElementId::CharacterStarship,
            labeled("Starship", character.and_then(|c| c.starship.as_deref())),
        ),
        (
            ElementId::CharacterWeapons,
            labeled("Weapons", character.and_then(|c| c.weapons.as_deref())),
        ),
        (
            ElementId::CharacterTas,
            labeled("TAS", character.and_then(|c| c.tas_membership.as_deref())),
        ),
    ];

    fields.extend(Characteristic::ALL.map(|characteristic| {
        let text = character
            .map(|character| {
                let digit = character
                    .characteristic_digit(characteristic)
                    .map(upp_digit)
                    .unwrap_or('-');
                format!("{}: {digit}", characteristic.abbreviation())
            })
            .unwrap_or_default();
        (ElementId::CharacteristicValue(characteristic), text)
    }));

    let reenlistment = term.and_then(|t| t.reenlistment.as_deref())
        .map(str::to_string)
        .or_else(|| state.reenlistment().map(|outcome| outcome.summary()));

    fields.extend([
        (
            ElementId::EnlistmentOutcome,
            state
                .enlistment()
                .map(|outcome| outcome.summary())
                .unwrap_or_default(),
        ),
        (
            ElementId::CurrentTerm,
            labeled("Current Term", term.and_then(|t| t.term_label.as_deref())),
        ),
        (
            ElementId::SurvivalOutcome,
            labeled("Survival", term.and_then(|t| t.survival.as_deref())),
        ),
        (
            ElementId::CommissioningOutcome,
            labeled("Commission", term.and_then(|t| t.commission.as_deref())),
        ),
        (
            ElementId::PromotionOutcome,
            labeled("Promotion", term.and_then(|t| t.promotion.as_deref())),
        ),
        (
            ElementId::TermSkillsEligibility,
            labeled("Term Skills", term.and_then(|t| t.term_skills.as_deref())),
        ),
        (
            ElementId::CommissionSkillsEligibility,
            labeled(
                "Commission Skills",
                term.and_then(|t| t.commission_skills.as_deref()),
            ),
        ),
        (
            ElementId::PromotionSkillsEligibility,
            labeled(
                "Promotion Skills",
                term.and_then(|t| t.promotion_skills.as_deref()),
            ),
        ),
        (
            ElementId::AgeingEffects,
            labeled("Ageing", term.and_then(|t| t.ageing.as_deref())),
        ),
        (
            ElementId::ReenlistmentOutcome,
            labeled("Re-enlistment", reenlistment.as_deref()),
        ),
        (
            ElementId::TermTitle,
            if state.character().is_some_and(|c| c.has_service()) {
                "Term Actions".to_string()
            } else {
                String::new()
            },
        ),
        (
            ElementId::MessageDisplay,
            state
                .working_message()
                .or_else(|| state.status().map(|status| status.text.clone()))
                .unwrap_or_default(),
        ),
    ]);

    fields
}

fn number(value: Option<i64>) -> String {
    value.map(|value| value.to_string()).unwrap_or_else(|| "?".to_string())
}

fn roll_line(label: &str, adjustment: &str, roll: &RollOutcome, verdict: &str) -> LogLine {
    LogLine::plain(format!(
        "{label}: Roll {} + {adjustment} {} = Total {} (Need {}) → {verdict}",
        number(roll.roll),
        number(roll.modifier),
        number(roll.total),
        number(roll.target),
    ))
}

/// Roll-by-roll log built from numeric server fields and fixed labels only.
pub fn outcome_log(state: &AppState) -> Vec<LogLine> {
    let features = state.features();
    if !features.outcome_log || state.character().is_none() {
        return Vec::new();
    }

    let snapshot = state.snapshot();
    let mut lines = Vec::new();

    if let Some(survival) = &snapshot.rolls.survival {
        let verdict = match (&survival.outcome, survival.success) {
            (Some(outcome), _) => outcome.to_uppercase(),
            (None, Some(true)) => "SURVIVED".to_string(),
            (None, Some(false)) => "DIED".to_string(),
            (None, None) => String::new(),
        };
        lines.push(roll_line("Survival", "Bonus", survival, &verdict));
    }
    if let Some(commission) = snapshot.rolls.commission.as_ref().filter(|r| r.is_applicable()) {
        let verdict = if commission.success == Some(true) {
            "COMMISSIONED"
        } else {
            "FAILED"
        };
        lines.push(roll_line("Commission", "Modifier", commission, verdict));
    }
    if let Some(promotion) = snapshot.rolls.promotion.as_ref().filter(|r| r.is_applicable()) {
        let verdict = if promotion.success == Some(true) {
            "PROMOTED"
        } else {
            "FAILED"
        };
        lines.push(roll_line("Promotion", "Modifier", promotion, verdict));
    }

    if features.term_skills {
        if let Some(skills) = snapshot.skills.as_ref().filter(|skills| !skills.is_empty()) {
            lines.push(LogLine::heading("Skills Available:"));
            lines.push(LogLine::plain(format!("Total: {} skills", skills.total())));
            for (source, label) in [
                ("survival", "Survival"),
                ("commission", "Commission"),
                ("promotion", "Promotion"),
            ] {
                if let Some(count) = skills.get(source) {
                    lines.push(LogLine::plain(format!("{label}: {count} skills")));
                }
            }
        }
    }

    lines
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
