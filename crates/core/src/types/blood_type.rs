//! ABO/Rh blood group.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a string is not one of the eight blood groups.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown blood type {0:?} (expected one of A+, A-, B+, B-, AB+, AB-, O+, O-)")]
pub struct BloodTypeError(pub String);

/// Blood group as entered by donors and requesters.
///
/// Serialized in the conventional notation (`"AB+"`, `"O-"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    /// All blood groups in display order.
    pub const ALL: [Self; 8] = [
        Self::APositive,
        Self::ANegative,
        Self::BPositive,
        Self::BNegative,
        Self::AbPositive,
        Self::AbNegative,
        Self::OPositive,
        Self::ONegative,
    ];

    /// Conventional notation, also used as the database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
            Self::OPositive => "O+",
            Self::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BloodType {
    type Err = BloodTypeError;

    /// Accepts the conventional notation case-insensitively, ignoring spaces
    /// (`"ab +"` parses as `AB+`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == compact)
            .ok_or_else(|| BloodTypeError(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all() {
        for t in BloodType::ALL {
            assert_eq!(t.as_str().parse::<BloodType>().unwrap(), t);
        }
    }

    #[test]
    fn test_parse_lenient_notation() {
        assert_eq!("ab +".parse::<BloodType>().unwrap(), BloodType::AbPositive);
        assert_eq!(" o-".parse::<BloodType>().unwrap(), BloodType::ONegative);
    }

    #[test]
    fn test_parse_unknown() {
        assert!("C+".parse::<BloodType>().is_err());
        assert!("".parse::<BloodType>().is_err());
    }

    #[test]
    fn test_serde_notation() {
        assert_eq!(serde_json::to_string(&BloodType::AbNegative).unwrap(), "\"AB-\"");
        let parsed: BloodType = serde_json::from_str("\"O+\"").unwrap();
        assert_eq!(parsed, BloodType::OPositive);
    }
}
