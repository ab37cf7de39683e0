//! Client-side mirrors of server-owned character and term state.

use shared::{
    domain::{Characteristic, RevealedSet, Upp, UPP_MASK},
    protocol::{
        CharacterStatusResponse, CreateCharacterResponse, EnlistmentResponse, EnlistmentStatus,
        ReenlistmentResponse, RevealCharacteristicResponse, RollOutcome, SkillBreakdown,
        TermButtonStatus, TermInfoResponse,
    },
};

/// Social standing at which the character is shown with a noble title.
pub const NOBLE_SOCIAL_STANDING: i64 = 11;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacterSummary {
    pub name: String,
    pub service: Option<String>,
    pub rank: Option<String>,
    pub upp: Option<String>,
    pub age: Option<String>,
    pub terms_served: Option<String>,
    pub cash: Option<String>,
    pub starship: Option<String>,
    pub weapons: Option<String>,
    pub tas_membership: Option<String>,
    pub revealed: RevealedSet,
    pub social: Option<i64>,
    pub title: Option<String>,
}

impl CharacterSummary {
    /// `None` when the status carries no name, which is how the server reports
    /// "no character".
    pub fn from_status(status: &CharacterStatusResponse) -> Option<Self> {
        let name = status.name.clone()?;
        Some(Self {
            name,
            service: status.service.clone(),
            rank: status.rank.clone(),
            upp: status.upp.clone(),
            age: status.age.clone(),
            terms_served: status.terms.clone(),
            cash: status.cash.clone(),
            starship: status.starship.clone(),
            weapons: status.weapons.clone(),
            tas_membership: status.tas.clone(),
            revealed: status.revealed.clone(),
            social: status.social,
            title: status.title.clone(),
        })
    }

    /// Provisional mirror built from the create response alone.
    pub fn from_created(created: &CreateCharacterResponse) -> Option<Self> {
        let name = created.name.clone()?;
        Some(Self {
            name,
            age: created.age.map(|age| age.to_string()),
            ..Self::default()
        })
    }

    pub fn has_service(&self) -> bool {
        self.service.is_some()
    }

    pub fn apply_reveal(&mut self, revealed: &RevealCharacteristicResponse) {
        self.revealed = revealed.revealed.clone();
        if revealed.upp.is_some() {
            self.upp = revealed.upp.clone();
        }
    }

    /// The UPP, only once every characteristic has been revealed.
    pub fn visible_upp(&self) -> Option<&str> {
        if self.revealed.is_complete() {
            self.upp.as_deref()
        } else {
            None
        }
    }

    pub fn upp_text(&self) -> String {
        format!("UPP: {}", self.visible_upp().unwrap_or(UPP_MASK))
    }

    pub fn decoded_upp(&self) -> Option<Upp> {
        self.visible_upp().and_then(|upp| Upp::parse(upp).ok())
    }

    /// Digit for one characteristic, if it is revealed and the server's UPP
    /// carries it.
    pub fn characteristic_digit(&self, characteristic: Characteristic) -> Option<u8> {
        if !self.revealed.contains(characteristic) {
            return None;
        }
        let digits = Upp::parse_partial(self.upp.as_deref()?)?;
        digits[characteristic.upp_index()]
    }

    pub fn display_title(&self) -> Option<String> {
        match self.social {
            Some(social) if social >= NOBLE_SOCIAL_STANDING => {
                Some(self.title.clone().unwrap_or_else(|| "Noble".to_string()))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermInfo {
    pub term_label: Option<String>,
    pub survival: Option<String>,
    pub commission: Option<String>,
    pub promotion: Option<String>,
    pub term_skills: Option<String>,
    pub commission_skills: Option<String>,
    pub promotion_skills: Option<String>,
    pub ageing: Option<String>,
    pub reenlistment: Option<String>,
}

impl From<TermInfoResponse> for TermInfo {
    fn from(value: TermInfoResponse) -> Self {
        Self {
            term_label: value.term.or(value.term_ordinal).or(value.term_number),
            survival: value.survival,
            commission: value.commission,
            promotion: value.promotion,
            term_skills: value.term_skills,
            commission_skills: value.commission_skills,
            promotion_skills: value.promotion_skills,
            ageing: value.ageing,
            reenlistment: value.reenlistment,
        }
    }
}

/// Most recent survival/commission/promotion rolls reported by the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollHistory {
    pub survival: Option<RollOutcome>,
    pub commission: Option<RollOutcome>,
    pub promotion: Option<RollOutcome>,
}

impl RollHistory {
    pub fn from_status(status: &CharacterStatusResponse) -> Self {
        let keep = |roll: &Option<RollOutcome>| roll.clone().filter(|roll| !roll.is_empty());
        Self {
            survival: keep(&status.last_survival),
            commission: keep(&status.last_commission),
            promotion: keep(&status.last_promotion),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnlistmentOutcome {
    pub service: Option<String>,
    pub status: EnlistmentStatus,
    pub required_roll: Option<i64>,
    pub enlistment_roll: Option<i64>,
    pub modifier: Option<i64>,
}

impl From<EnlistmentResponse> for EnlistmentOutcome {
    fn from(value: EnlistmentResponse) -> Self {
        Self {
            service: value.service,
            status: value.enlistment_status,
            required_roll: value.required_roll,
            enlistment_roll: value.enlistment_roll,
            modifier: value.modifier,
        }
    }
}

impl EnlistmentOutcome {
    pub fn summary(&self) -> String {
        let service = self.service.as_deref().unwrap_or("unassigned");
        let headline = match &self.status {
            EnlistmentStatus::Enlisted => format!("Enlisted in: {service}"),
            EnlistmentStatus::Drafted => format!("Drafted to: {service}"),
            EnlistmentStatus::Other(status) => format!("Enlistment {status}: {service}"),
        };

        match (self.enlistment_roll, self.required_roll) {
            (Some(roll), Some(required)) => {
                let modifier = self.modifier.unwrap_or(0);
                format!(
                    "{headline} (Roll {roll} + {modifier} = {}, Need {required})",
                    roll.saturating_add(modifier)
                )
            }
            _ => headline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReenlistmentOutcome {
    pub result: Option<String>,
    pub succeeded: bool,
    pub terms_served: Option<i64>,
    pub age: Option<i64>,
}

impl From<ReenlistmentResponse> for ReenlistmentOutcome {
    fn from(value: ReenlistmentResponse) -> Self {
        Self {
            result: value.result,
            succeeded: value.succeeded,
            terms_served: value.terms_served,
            age: value.age,
        }
    }
}

impl ReenlistmentOutcome {
    pub fn summary(&self) -> String {
        let mut text = self.result.clone().unwrap_or_else(|| {
            if self.succeeded {
                "Re-enlisted".to_string()
            } else {
                "Re-enlistment denied".to_string()
            }
        });
        match (self.terms_served, self.age) {
            (Some(terms), Some(age)) => text.push_str(&format!(" (Terms served: {terms}, Age: {age})")),
            (Some(terms), None) => text.push_str(&format!(" (Terms served: {terms})")),
            (None, Some(age)) => text.push_str(&format!(" (Age: {age})")),
            (None, None) => {}
        }
        text
    }
}

/// Everything one refresh learns from the read endpoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub character: Option<CharacterSummary>,
    pub rolls: RollHistory,
    pub term: Option<TermInfo>,
    pub buttons: Option<TermButtonStatus>,
    pub skills: Option<SkillBreakdown>,
}

impl Snapshot {
    pub fn term_label(&self) -> Option<&str> {
        self.term.as_ref().and_then(|term| term.term_label.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn revealed_all() -> RevealedSet {
        Characteristic::ALL.into_iter().collect()
    }

    #[test]
    fn upp_stays_masked_until_all_six_are_revealed() {
        let mut character = CharacterSummary {
            name: "Orion Pax".to_string(),
            upp: Some("789ABC".to_string()),
            revealed: Characteristic::ALL.into_iter().take(5).collect(),
            ..CharacterSummary::default()
        };
        assert_eq!(character.upp_text(), "UPP: ------");
        assert!(character.decoded_upp().is_none());

        character.revealed = revealed_all();
        assert_eq!(character.upp_text(), "UPP: 789ABC");
        assert_eq!(
            character
                .decoded_upp()
                .map(|upp| upp.value(Characteristic::Social)),
            Some(12)
        );
    }

    #[test]
    fn characteristic_digit_requires_reveal() {
        let character = CharacterSummary {
            name: "Nyx Solaris".to_string(),
            upp: Some("7-----".to_string()),
            revealed: [Characteristic::Strength, Characteristic::Dexterity]
                .into_iter()
                .collect(),
            ..CharacterSummary::default()
        };
        assert_eq!(character.characteristic_digit(Characteristic::Strength), Some(7));
        assert_eq!(character.characteristic_digit(Characteristic::Dexterity), None);
        assert_eq!(character.characteristic_digit(Characteristic::Social), None);
    }

    #[test]
    fn noble_title_needs_high_social_standing() {
        let mut character = CharacterSummary {
            name: "Vega Stardust".to_string(),
            social: Some(10),
            title: Some("Knight".to_string()),
            ..CharacterSummary::default()
        };
        assert_eq!(character.display_title(), None);
        character.social = Some(11);
        assert_eq!(character.display_title().as_deref(), Some("Knight"));
        character.title = None;
        assert_eq!(character.display_title().as_deref(), Some("Noble"));
    }

    #[test]
    fn drafted_enlistment_names_the_new_service() {
        let outcome = EnlistmentOutcome {
            service: Some("Navy".to_string()),
            status: EnlistmentStatus::Drafted,
            required_roll: Some(8),
            enlistment_roll: Some(5),
            modifier: Some(1),
        };
        assert_eq!(outcome.summary(), "Drafted to: Navy (Roll 5 + 1 = 6, Need 8)");
    }

    #[test]
    fn oversized_enlistment_roll_saturates() {
        let response: EnlistmentResponse = serde_json::from_str(
            r#"{"service":"Army","enlistment_status":"enlisted","required_roll":5,"enlistment_roll":1e30,"modifier":1}"#,
        )
        .expect("enlistment");
        let outcome = EnlistmentOutcome::from(response);

        assert_eq!(outcome.enlistment_roll, Some(i64::MAX));
        assert_eq!(
            outcome.summary(),
            format!("Enlisted in: Army (Roll {max} + 1 = {max}, Need 5)", max = i64::MAX)
        );
    }

    #[test]
    fn term_label_falls_back_to_ordinal_then_number() {
        let info = TermInfo::from(TermInfoResponse {
            term_ordinal: Some("2nd".to_string()),
            term_number: Some("2".to_string()),
            ..TermInfoResponse::default()
        });
        assert_eq!(info.term_label.as_deref(), Some("2nd"));
    }

    #[test]
    fn reenlistment_summary_reports_progress() {
        let outcome = ReenlistmentOutcome {
            result: None,
            succeeded: true,
            terms_served: Some(2),
            age: Some(26),
        };
        assert_eq!(outcome.summary(), "Re-enlisted (Terms served: 2, Age: 26)");
    }
}
