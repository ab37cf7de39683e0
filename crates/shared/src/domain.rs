use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder shown instead of the UPP until every characteristic is revealed.
pub const UPP_MASK: &str = "------";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownName {
    pub kind: &'static str,
    pub value: String,
}

/// The six characteristics, declared in UPP digit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Characteristic {
    #[serde(alias = "str")]
    Strength,
    #[serde(alias = "dex")]
    Dexterity,
    #[serde(alias = "end")]
    Endurance,
    #[serde(alias = "int")]
    Intelligence,
    #[serde(alias = "edu")]
    Education,
    #[serde(alias = "soc")]
    Social,
}

impl Characteristic {
    pub const ALL: [Characteristic; 6] = [
        Characteristic::Strength,
        Characteristic::Dexterity,
        Characteristic::Endurance,
        Characteristic::Intelligence,
        Characteristic::Education,
        Characteristic::Social,
    ];

    /// Wire name, as sent in `{characteristic}` request bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Characteristic::Strength => "strength",
            Characteristic::Dexterity => "dexterity",
            Characteristic::Endurance => "endurance",
            Characteristic::Intelligence => "intelligence",
            Characteristic::Education => "education",
            Characteristic::Social => "social",
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            Characteristic::Strength => "STR",
            Characteristic::Dexterity => "DEX",
            Characteristic::Endurance => "END",
            Characteristic::Intelligence => "INT",
            Characteristic::Education => "EDU",
            Characteristic::Social => "SOC",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Characteristic::Strength => "Strength",
            Characteristic::Dexterity => "Dexterity",
            Characteristic::Endurance => "Endurance",
            Characteristic::Intelligence => "Intelligence",
            Characteristic::Education => "Education",
            Characteristic::Social => "Social Standing",
        }
    }

    /// Position of this characteristic's digit within a UPP string.
    pub fn upp_index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Characteristic {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Characteristic::ALL
            .into_iter()
            .find(|c| c.as_str() == needle || c.abbreviation().eq_ignore_ascii_case(&needle))
            .ok_or_else(|| UnknownName {
                kind: "characteristic",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Service {
    #[serde(alias = "navy")]
    Navy,
    #[serde(alias = "marines")]
    Marines,
    #[serde(alias = "army")]
    Army,
    #[serde(alias = "scouts")]
    Scouts,
    #[serde(alias = "merchants")]
    Merchants,
    #[serde(alias = "others")]
    Others,
}

impl Service {
    pub const ALL: [Service; 6] = [
        Service::Navy,
        Service::Marines,
        Service::Army,
        Service::Scouts,
        Service::Merchants,
        Service::Others,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Service::Navy => "Navy",
            Service::Marines => "Marines",
            Service::Army => "Army",
            Service::Scouts => "Scouts",
            Service::Merchants => "Merchants",
            Service::Others => "Others",
        }
    }

    /// Lowercase key used for page element ids (`navy-btn`).
    pub fn key(self) -> &'static str {
        match self {
            Service::Navy => "navy",
            Service::Marines => "marines",
            Service::Army => "army",
            Service::Scouts => "scouts",
            Service::Merchants => "merchants",
            Service::Others => "others",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Service::ALL
            .into_iter()
            .find(|service| service.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownName {
                kind: "service",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UppError {
    #[error("UPP must have 6 digits, got {0}")]
    WrongLength(usize),
    #[error("invalid UPP digit '{digit}' at position {position}")]
    InvalidDigit { position: usize, digit: char },
}

/// Decoded Universal Personality Profile: one hex digit per characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upp([u8; 6]);

impl Upp {
    pub fn parse(raw: &str) -> Result<Self, UppError> {
        let raw = raw.trim();
        let count = raw.chars().count();
        if count != 6 {
            return Err(UppError::WrongLength(count));
        }

        let mut values = [0u8; 6];
        for (position, digit) in raw.chars().enumerate() {
            let value = digit
                .to_digit(16)
                .ok_or(UppError::InvalidDigit { position, digit })?;
            values[position] = value as u8;
        }
        Ok(Self(values))
    }

    /// Per-position digits of a possibly masked UPP (`7-9A--`). Positions that
    /// are not hex digits decode to `None`; a string of the wrong length
    /// decodes to nothing at all.
    pub fn parse_partial(raw: &str) -> Option<[Option<u8>; 6]> {
        let raw = raw.trim();
        if raw.chars().count() != 6 {
            return None;
        }
        let mut values = [None; 6];
        for (slot, digit) in values.iter_mut().zip(raw.chars()) {
            *slot = digit.to_digit(16).map(|value| value as u8);
        }
        Some(values)
    }

    pub fn value(&self, characteristic: Characteristic) -> u8 {
        self.0[characteristic.upp_index()]
    }

    pub fn digit(&self, characteristic: Characteristic) -> char {
        upp_digit(self.value(characteristic))
    }
}

/// Single UPP digit for a characteristic value (10 to 15 become A to F).
pub fn upp_digit(value: u8) -> char {
    char::from_digit(u32::from(value), 16)
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('?')
}

impl FromStr for Upp {
    type Err = UppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Upp::parse(s)
    }
}

impl fmt::Display for Upp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for value in self.0 {
            write!(f, "{}", upp_digit(value))?;
        }
        Ok(())
    }
}

/// Set of characteristics the server reports as revealed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevealedSet(BTreeSet<Characteristic>);

impl RevealedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.0.len() == Characteristic::ALL.len()
    }

    pub fn contains(&self, characteristic: Characteristic) -> bool {
        self.0.contains(&characteristic)
    }

    pub fn insert(&mut self, characteristic: Characteristic) -> bool {
        self.0.insert(characteristic)
    }

    pub fn iter(&self) -> impl Iterator<Item = Characteristic> + '_ {
        self.0.iter().copied()
    }

    /// Characteristics still hidden, in UPP order.
    pub fn missing(&self) -> impl Iterator<Item = Characteristic> + '_ {
        Characteristic::ALL
            .into_iter()
            .filter(|c| !self.0.contains(c))
    }
}

impl FromIterator<Characteristic> for RevealedSet {
    fn from_iter<I: IntoIterator<Item = Characteristic>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upp_digits_follow_characteristic_order() {
        let upp = Upp::parse("A8C9B7").expect("upp");
        assert_eq!(upp.value(Characteristic::Strength), 10);
        assert_eq!(upp.value(Characteristic::Dexterity), 8);
        assert_eq!(upp.value(Characteristic::Endurance), 12);
        assert_eq!(upp.value(Characteristic::Intelligence), 9);
        assert_eq!(upp.value(Characteristic::Education), 11);
        assert_eq!(upp.value(Characteristic::Social), 7);
        assert_eq!(upp.to_string(), "A8C9B7");
    }

    #[test]
    fn upp_accepts_lowercase_and_rejects_bad_input() {
        assert_eq!(Upp::parse("789abc").expect("upp").to_string(), "789ABC");
        assert_eq!(Upp::parse("------"), Err(UppError::InvalidDigit { position: 0, digit: '-' }));
        assert_eq!(Upp::parse("7777"), Err(UppError::WrongLength(4)));
    }

    #[test]
    fn partial_upp_keeps_known_positions() {
        let digits = Upp::parse_partial("7-9A--").expect("six positions");
        assert_eq!(digits, [Some(7), None, Some(9), Some(10), None, None]);
        assert!(Upp::parse_partial("7-9").is_none());
    }

    #[test]
    fn characteristic_accepts_long_and_short_names() {
        assert_eq!("strength".parse::<Characteristic>(), Ok(Characteristic::Strength));
        assert_eq!("SOC".parse::<Characteristic>(), Ok(Characteristic::Social));
        assert!("luck".parse::<Characteristic>().is_err());

        let parsed: Vec<Characteristic> =
            serde_json::from_str(r#"["edu", "dexterity"]"#).expect("decode");
        assert_eq!(parsed, vec![Characteristic::Education, Characteristic::Dexterity]);
        assert_eq!(
            serde_json::to_string(&Characteristic::Intelligence).expect("encode"),
            "\"intelligence\""
        );
    }

    #[test]
    fn service_round_trips_display_names() {
        assert_eq!("marines".parse::<Service>(), Ok(Service::Marines));
        assert_eq!(
            serde_json::to_string(&Service::Merchants).expect("encode"),
            "\"Merchants\""
        );
        let parsed: Service = serde_json::from_str("\"navy\"").expect("decode");
        assert_eq!(parsed, Service::Navy);
    }

    #[test]
    fn revealed_set_tracks_missing_in_upp_order() {
        let revealed: RevealedSet = [Characteristic::Social, Characteristic::Strength, Characteristic::Social]
            .into_iter()
            .collect();
        assert_eq!(revealed.len(), 2);
        assert!(!revealed.is_complete());
        let missing: Vec<_> = revealed.missing().collect();
        assert_eq!(
            missing,
            vec![
                Characteristic::Dexterity,
                Characteristic::Endurance,
                Characteristic::Intelligence,
                Characteristic::Education,
            ]
        );
    }
}
