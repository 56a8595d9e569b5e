//! One-time passcode value.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Passcode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PasscodeError {
    /// The input is not exactly six ASCII digits.
    #[error("passcode must be exactly {len} digits")]
    Malformed {
        /// Required number of digits.
        len: usize,
    },
}

/// A six digit, zero-padded numeric passcode such as `"004217"`.
///
/// Generation lives in the server (it needs a random source); this type only
/// guarantees the shape.
///
/// ```
/// use blood_connect_core::Passcode;
///
/// assert_eq!(Passcode::from_number(42).as_str(), "000042");
/// assert!(Passcode::parse(" 123456 ").is_ok());
/// assert!(Passcode::parse("12345").is_err());
/// ```
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Passcode(String);

impl Passcode {
    /// Number of digits in a passcode.
    pub const LENGTH: usize = 6;

    /// Exclusive upper bound of the numeric passcode space.
    pub const SPACE: u32 = 1_000_000;

    /// Build a passcode from a number, wrapping into the six digit space.
    #[must_use]
    pub fn from_number(n: u32) -> Self {
        Self(format!("{:0width$}", n % Self::SPACE, width = Self::LENGTH))
    }

    /// Parse a passcode typed by a user.
    ///
    /// # Errors
    ///
    /// Returns [`PasscodeError::Malformed`] unless the trimmed input is
    /// exactly six ASCII digits.
    pub fn parse(s: &str) -> Result<Self, PasscodeError> {
        let s = s.trim();
        if s.len() == Self::LENGTH && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_owned()))
        } else {
            Err(PasscodeError::Malformed { len: Self::LENGTH })
        }
    }

    /// Returns the passcode digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Passcodes are credentials: keep them out of Debug output.
impl fmt::Debug for Passcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passcode(******)")
    }
}

impl TryFrom<String> for Passcode {
    type Error = PasscodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Passcode> for String {
    fn from(code: Passcode) -> Self {
        code.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_number_zero_pads() {
        assert_eq!(Passcode::from_number(0).as_str(), "000000");
        assert_eq!(Passcode::from_number(999_999).as_str(), "999999");
    }

    #[test]
    fn test_from_number_wraps() {
        assert_eq!(Passcode::from_number(1_000_001).as_str(), "000001");
    }

    #[test]
    fn test_parse() {
        assert_eq!(Passcode::parse("012345").unwrap().as_str(), "012345");
        assert!(Passcode::parse("1234567").is_err());
        assert!(Passcode::parse("12a456").is_err());
        assert!(Passcode::parse("").is_err());
    }

    #[test]
    fn test_debug_redacts() {
        let code = Passcode::parse("123456").unwrap();
        assert!(!format!("{code:?}").contains("123456"));
    }
}
