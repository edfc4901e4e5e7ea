//! Mobile money phone number normalization and validation.

use crate::error::PortalError;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// `+243` country code or a trunk `0`, then exactly nine ASCII digits
#[allow(clippy::expect_used)] // Pattern is a compile-time constant
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+243|0)[0-9]{9}$").expect("phone pattern is valid")
});

/// A normalized, validated Congolese mobile money number
///
/// Only constructed through [`PhoneNumber::parse`], so holding one proves the
/// number passed validation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Strip all whitespace from `raw` and validate the result
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Validation`] when the input is empty or does not
    /// match the accepted format.
    pub fn parse(raw: &str) -> Result<Self, PortalError> {
        let normalized = normalize(raw);

        if normalized.is_empty() {
            return Err(PortalError::Validation(
                "Please enter your phone number".to_string(),
            ));
        }

        if !PHONE_PATTERN.is_match(&normalized) {
            return Err(PortalError::Validation(
                "Invalid phone number (expected +243XXXXXXXXX or 0XXXXXXXXX)".to_string(),
            ));
        }

        Ok(Self(normalized))
    }

    /// The normalized number as sent to the ticket service
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remove every whitespace character, including interior ones
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_accepts_local_and_international_forms() {
        assert_eq!(PhoneNumber::parse("0900000000").unwrap().as_str(), "0900000000");
        assert_eq!(
            PhoneNumber::parse("+243812345678").unwrap().as_str(),
            "+243812345678"
        );
    }

    #[test]
    fn test_strips_interior_whitespace() {
        let phone = PhoneNumber::parse(" +243 81 234 5678\t").unwrap();
        assert_eq!(phone.as_str(), "+243812345678");
    }

    #[test]
    fn test_rejects_empty_input() {
        let err = PhoneNumber::parse("   ").unwrap_err();
        assert!(matches!(err, PortalError::Validation(ref m) if m.contains("enter")));
    }

    #[test]
    fn test_rejects_malformed_numbers() {
        for raw in ["123456", "09000000000", "090000000", "+24390000000", "243900000000", "0900-00000"] {
            assert!(
                matches!(PhoneNumber::parse(raw), Err(PortalError::Validation(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_non_ascii_digits() {
        // Arabic-Indic digits are Unicode `\d` but not accepted here
        assert!(PhoneNumber::parse("0٩٠٠٠٠٠٠٠٠").is_err());
    }

    proptest! {
        #[test]
        fn prop_valid_numbers_pass_with_any_spacing(
            international in any::<bool>(),
            digits in "[0-9]{9}",
            spaces in proptest::collection::vec(0usize..3, 10),
        ) {
            let prefix = if international { "+243" } else { "0" };
            let expected = format!("{prefix}{digits}");

            let mut raw = String::from(prefix);
            for (digit, count) in digits.chars().zip(&spaces) {
                raw.push_str(&" ".repeat(*count));
                raw.push(digit);
            }

            let phone = PhoneNumber::parse(&raw).unwrap();
            prop_assert_eq!(phone.as_str(), expected.as_str());
        }

        #[test]
        fn prop_parse_agrees_with_pattern(raw in "[+0-9 ]{0,16}") {
            let normalized = normalize(&raw);
            let expected = PHONE_PATTERN.is_match(&normalized);
            prop_assert_eq!(PhoneNumber::parse(&raw).is_ok(), expected);
        }

        #[test]
        fn prop_wrong_length_is_rejected(digits in "[0-9]{0,8}|[0-9]{10,12}") {
            let local = format!("0{digits}");
            let international = format!("+243{digits}");
            prop_assert!(PhoneNumber::parse(&local).is_err());
            prop_assert!(PhoneNumber::parse(&international).is_err());
        }
    }
}
