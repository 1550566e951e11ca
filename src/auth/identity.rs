//! Normalisation of the identifiers users log in with.

use std::sync::LazyLock;

use regex::Regex;

static CUIL_INPUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\-\. ]+$").expect("valid CUIL regex"));

static DNI: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{7,8}$").expect("valid DNI regex"));

const CUIL_DIGITS: usize = 11;

/// Returns the 11 CUIL digits, or `None` when the input isn't a CUIL.
///
/// Dashes, dots and spaces are accepted as separators.
pub fn normalize_cuil(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if !CUIL_INPUT.is_match(raw) {
        return None;
    }

    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    (digits.len() == CUIL_DIGITS).then_some(digits)
}

pub fn normalize_dni(raw: &str) -> Option<String> {
    let raw = raw.trim();
    DNI.is_match(raw).then(|| raw.to_string())
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cuil_with_separators() {
        assert_eq!(normalize_cuil("20-12345678-9").as_deref(), Some("20123456789"));
        assert_eq!(normalize_cuil(" 20.123.456.789 ").as_deref(), Some("20123456789"));
        assert_eq!(normalize_cuil("20123456789").as_deref(), Some("20123456789"));
    }

    #[test]
    fn cuil_rejects_wrong_length_and_letters() {
        assert!(normalize_cuil("2012345678").is_none());
        assert!(normalize_cuil("201234567890").is_none());
        assert!(normalize_cuil("20-1234567A-9").is_none());
        assert!(normalize_cuil("").is_none());
    }

    #[test]
    fn dni_is_seven_or_eight_digits() {
        assert_eq!(normalize_dni("30123456").as_deref(), Some("30123456"));
        assert_eq!(normalize_dni("1234567").as_deref(), Some("1234567"));
        assert!(normalize_dni("123456").is_none());
        assert!(normalize_dni("30.123.456").is_none());
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Trainee@Test.COM "), "trainee@test.com");
    }
}
