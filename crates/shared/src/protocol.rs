use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Characteristic, RevealedSet, Service};

/// Field decoders for server values whose JSON type drifts between releases.
pub mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use tracing::warn;

    use crate::domain::{Characteristic, RevealedSet};

    /// Display text for a scalar or list value. `null`, `false`, empty strings
    /// and empty lists count as absent.
    pub fn display_text(value: &Value) -> Option<String> {
        match value {
            Value::Null | Value::Bool(false) | Value::Object(_) => None,
            Value::Bool(true) => Some("true".to_string()),
            Value::Number(number) => Some(number.to_string()),
            Value::String(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().filter_map(display_text).collect();
                (!parts.is_empty()).then(|| parts.join(", "))
            }
        }
    }

    pub fn integer(value: &Value) -> Option<i64> {
        match value {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|f| f as i64)),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(display_text))
    }

    pub fn number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(integer))
    }

    /// Characteristic names the client recognises; anything else is logged and skipped.
    pub fn revealed<'de, D>(deserializer: D) -> Result<RevealedSet, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        let Some(Value::Array(items)) = value else {
            return Ok(RevealedSet::new());
        };
        Ok(items
            .iter()
            .filter_map(|item| {
                let name = item.as_str()?;
                name.parse::<Characteristic>()
                    .map_err(|err| warn!(error = %err, "skipping revealed entry"))
                    .ok()
            })
            .collect())
    }

    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Bool(flag)) => flag,
            Some(Value::Number(number)) => number.as_i64().is_some_and(|n| n != 0),
            Some(Value::String(text)) => matches!(
                text.trim().to_ascii_lowercase().as_str(),
                "true" | "yes" | "1"
            ),
            _ => false,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealCharacteristicRequest {
    pub characteristic: Characteristic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnlistmentRequest {
    pub service: Service,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCharacterResponse {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub age: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteCharacterResponse {
    #[serde(default, deserialize_with = "lenient::flag")]
    pub deleted: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevealCharacteristicResponse {
    #[serde(default, deserialize_with = "lenient::text")]
    pub upp: Option<String>,
    #[serde(default, deserialize_with = "lenient::revealed")]
    pub revealed: RevealedSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EnlistmentStatus {
    Enlisted,
    Drafted,
    Other(String),
}

impl From<String> for EnlistmentStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "enlisted" => EnlistmentStatus::Enlisted,
            "drafted" => EnlistmentStatus::Drafted,
            _ => EnlistmentStatus::Other(value),
        }
    }
}

impl From<EnlistmentStatus> for String {
    fn from(value: EnlistmentStatus) -> Self {
        match value {
            EnlistmentStatus::Enlisted => "enlisted".to_string(),
            EnlistmentStatus::Drafted => "drafted".to_string(),
            EnlistmentStatus::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnlistmentResponse {
    #[serde(default, deserialize_with = "lenient::text")]
    pub service: Option<String>,
    pub enlistment_status: EnlistmentStatus,
    #[serde(default, deserialize_with = "lenient::number")]
    pub required_roll: Option<i64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub enlistment_roll: Option<i64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub modifier: Option<i64>,
}

/// Result of a survival, commission or promotion check.
///
/// Survival reports `bonus`/`required`/`survived`; commission and promotion
/// report `modifier`/`target`/`success`. Both spellings land in the same fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollOutcome {
    #[serde(deserialize_with = "lenient::number")]
    pub roll: Option<i64>,
    #[serde(alias = "bonus", deserialize_with = "lenient::number")]
    pub modifier: Option<i64>,
    #[serde(deserialize_with = "lenient::number")]
    pub total: Option<i64>,
    #[serde(alias = "required", deserialize_with = "lenient::number")]
    pub target: Option<i64>,
    #[serde(deserialize_with = "lenient::text")]
    pub outcome: Option<String>,
    #[serde(alias = "survived")]
    pub success: Option<bool>,
    pub applicable: Option<bool>,
}

impl RollOutcome {
    /// True for the `{}` the server sends before a check has been rolled.
    pub fn is_empty(&self) -> bool {
        self.roll.is_none()
            && self.modifier.is_none()
            && self.total.is_none()
            && self.target.is_none()
            && self.outcome.is_none()
            && self.success.is_none()
            && self.applicable.is_none()
    }

    pub fn is_applicable(&self) -> bool {
        self.applicable != Some(false)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReenlistmentResponse {
    #[serde(default, deserialize_with = "lenient::text")]
    pub result: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub succeeded: bool,
    #[serde(default, deserialize_with = "lenient::number")]
    pub terms_served: Option<i64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub age: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterStatusResponse {
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub service: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub rank: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub upp: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub age: Option<String>,
    #[serde(alias = "terms_served", deserialize_with = "lenient::text")]
    pub terms: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub cash: Option<String>,
    #[serde(deserialize_with = "lenient::revealed")]
    pub revealed: RevealedSet,
    #[serde(deserialize_with = "lenient::number")]
    pub social: Option<i64>,
    #[serde(deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub starship: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub weapons: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub tas: Option<String>,
    pub last_survival: Option<RollOutcome>,
    pub last_commission: Option<RollOutcome>,
    pub last_promotion: Option<RollOutcome>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TermInfoResponse {
    #[serde(deserialize_with = "lenient::text")]
    pub term: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub term_ordinal: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub term_number: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub survival: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub commission: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub promotion: Option<String>,
    #[serde(alias = "termSkills", deserialize_with = "lenient::text")]
    pub term_skills: Option<String>,
    #[serde(alias = "commissionSkills", deserialize_with = "lenient::text")]
    pub commission_skills: Option<String>,
    #[serde(alias = "promotionSkills", deserialize_with = "lenient::text")]
    pub promotion_skills: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub ageing: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub reenlistment: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermButtonStatus {
    #[serde(deserialize_with = "lenient::flag")]
    pub survival_completed: bool,
    #[serde(deserialize_with = "lenient::flag")]
    pub commission_completed: bool,
    #[serde(deserialize_with = "lenient::flag")]
    pub promotion_completed: bool,
    #[serde(deserialize_with = "lenient::flag")]
    pub is_commissioned: bool,
    #[serde(deserialize_with = "lenient::flag")]
    pub commission_succeeded: bool,
}

/// Skill counts per source (`survival`, `commission`, `promotion`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillBreakdown(pub BTreeMap<String, i64>);

impl SkillBreakdown {
    pub fn get(&self, source: &str) -> Option<i64> {
        self.0.get(source).copied()
    }

    pub fn total(&self) -> i64 {
        self.0.values().copied().fold(0i64, i64::saturating_add)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermSkillsResponse {
    #[serde(default)]
    pub skill_breakdown: Option<SkillBreakdown>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Characteristic;

    #[test]
    fn survival_and_commission_shapes_share_roll_outcome() {
        let survival: RollOutcome = serde_json::from_str(
            r#"{"roll":7,"bonus":1,"total":8,"required":5,"outcome":"survived","survived":true}"#,
        )
        .expect("survival");
        assert_eq!(survival.modifier, Some(1));
        assert_eq!(survival.target, Some(5));
        assert_eq!(survival.success, Some(true));

        let commission: RollOutcome = serde_json::from_str(
            r#"{"roll":4,"modifier":0,"total":4,"target":10,"success":false}"#,
        )
        .expect("commission");
        assert_eq!(commission.target, Some(10));
        assert_eq!(commission.success, Some(false));
        assert!(commission.is_applicable());

        let empty: RollOutcome = serde_json::from_str("{}").expect("empty");
        assert!(empty.is_empty());
    }

    #[test]
    fn status_fields_tolerate_numbers_lists_and_blanks() {
        let status: CharacterStatusResponse = serde_json::from_str(
            r#"{
                "name": "Nova Kin",
                "service": "",
                "rank": 0,
                "age": 22,
                "terms": 1,
                "cash": null,
                "weapons": ["Blade", "Revolver"],
                "starship": false,
                "revealed": ["strength", "soc"],
                "social": "11",
                "last_survival": {}
            }"#,
        )
        .expect("status");

        assert_eq!(status.name.as_deref(), Some("Nova Kin"));
        assert_eq!(status.service, None);
        assert_eq!(status.rank.as_deref(), Some("0"));
        assert_eq!(status.age.as_deref(), Some("22"));
        assert_eq!(status.cash, None);
        assert_eq!(status.weapons.as_deref(), Some("Blade, Revolver"));
        assert_eq!(status.starship, None);
        assert_eq!(status.social, Some(11));
        assert!(status.revealed.contains(Characteristic::Social));
        assert!(status.last_survival.expect("survival").is_empty());
    }

    #[test]
    fn enlistment_status_keeps_unknown_labels() {
        let response: EnlistmentResponse = serde_json::from_str(
            r#"{"service":"Navy","enlistment_status":"drafted","required_roll":8,"enlistment_roll":5,"modifier":1}"#,
        )
        .expect("enlistment");
        assert_eq!(response.enlistment_status, EnlistmentStatus::Drafted);

        let response: EnlistmentResponse =
            serde_json::from_str(r#"{"enlistment_status":"Rejected"}"#).expect("enlistment");
        assert_eq!(
            response.enlistment_status,
            EnlistmentStatus::Other("Rejected".to_string())
        );
    }

    #[test]
    fn skill_breakdown_sums_every_source() {
        let response: TermSkillsResponse = serde_json::from_str(
            r#"{"skill_breakdown":{"survival":2,"commission":1,"promotion":0,"first_term":1}}"#,
        )
        .expect("skills");
        let breakdown = response.skill_breakdown.expect("breakdown");
        assert_eq!(breakdown.total(), 4);
        assert_eq!(breakdown.get("commission"), Some(1));
        assert_eq!(breakdown.get("missing"), None);
    }

    #[test]
    fn unrecognised_revealed_entries_are_skipped() {
        let status: CharacterStatusResponse = serde_json::from_str(
            r#"{"name":"Nova Kin","revealed":["strength","Dexterity","psionics",3]}"#,
        )
        .expect("status");
        assert_eq!(status.name.as_deref(), Some("Nova Kin"));
        assert_eq!(status.revealed.len(), 2);
        assert!(status.revealed.contains(Characteristic::Dexterity));

        let response: RevealCharacteristicResponse =
            serde_json::from_str(r#"{"revealed":null}"#).expect("reveal");
        assert!(response.revealed.is_empty());
    }

    #[test]
    fn skill_total_saturates_instead_of_overflowing() {
        let breakdown = SkillBreakdown(
            [("survival".to_string(), i64::MAX), ("commission".to_string(), 1)]
                .into_iter()
                .collect(),
        );
        assert_eq!(breakdown.total(), i64::MAX);
    }

    #[test]
    fn button_status_defaults_missing_flags_to_false() {
        let status: TermButtonStatus =
            serde_json::from_str(r#"{"survival_completed":true}"#).expect("status");
        assert!(status.survival_completed);
        assert!(!status.commission_completed);
        assert!(!status.is_commissioned);
    }
}
