//! Postal code type.
//!
//! Postal codes key the blood bank lookup cache and drive donor matching, so
//! they are normalized the same way everywhere: trimmed and upper-cased.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PostalCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PostalCodeError {
    /// The input string is empty.
    #[error("postal code cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("postal code must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character other than letters, digits, space or dash.
    #[error("postal code contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A normalized postal (PIN / ZIP) code.
///
/// ```
/// use blood_connect_core::PostalCode;
///
/// assert_eq!(PostalCode::parse(" 75034 ").unwrap().as_str(), "75034");
/// assert_eq!(PostalCode::parse("sw1a 1aa").unwrap().as_str(), "SW1A 1AA");
/// assert!(PostalCode::parse("").is_err());
/// assert!(PostalCode::parse("750;34").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct PostalCode(String);

impl PostalCode {
    /// Maximum length of a postal code.
    pub const MAX_LENGTH: usize = 16;

    /// Parse and normalize a `PostalCode`.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, longer than 16
    /// characters, or contains anything besides ASCII letters, digits, spaces
    /// and dashes.
    pub fn parse(s: &str) -> Result<Self, PostalCodeError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(PostalCodeError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(PostalCodeError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == ' ' || *c == '-'))
        {
            return Err(PostalCodeError::InvalidCharacter(bad));
        }

        Ok(Self(s.to_ascii_uppercase()))
    }

    /// Returns the postal code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PostalCode {
    type Err = PostalCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PostalCode {
    type Error = PostalCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PostalCode> for String {
    fn from(code: PostalCode) -> Self {
        code.0
    }
}

impl AsRef<str> for PostalCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_us_zip() {
        assert_eq!(PostalCode::parse("75034").unwrap().as_str(), "75034");
        assert_eq!(PostalCode::parse("75034-1234").unwrap().as_str(), "75034-1234");
    }

    #[test]
    fn test_parse_trims_and_uppercases() {
        assert_eq!(PostalCode::parse("  ec1a 1bb ").unwrap().as_str(), "EC1A 1BB");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(PostalCode::parse(" "), Err(PostalCodeError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        assert!(matches!(
            PostalCode::parse(&"1".repeat(17)),
            Err(PostalCodeError::TooLong { max: 16 })
        ));
    }

    #[test]
    fn test_parse_rejects_prompt_injection_characters() {
        assert_eq!(
            PostalCode::parse("75034\"}"),
            Err(PostalCodeError::InvalidCharacter('"'))
        );
    }
}
