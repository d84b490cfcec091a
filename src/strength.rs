//! Password strength scoring.

use serde::Serialize;
use std::fmt;

/// Ordinal strength levels, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Strength {
    Weak,
    Fair,
    Good,
    Strong,
    Excellent,
}

impl Strength {
    pub fn label(&self) -> &'static str {
        match self {
            Strength::Weak => "Weak",
            Strength::Fair => "Fair",
            Strength::Good => "Good",
            Strength::Strong => "Strong",
            Strength::Excellent => "Excellent",
        }
    }

    fn from_points(points: u8) -> Self {
        match points {
            0..=1 => Strength::Weak,
            2 => Strength::Fair,
            3..=4 => Strength::Good,
            5 => Strength::Strong,
            _ => Strength::Excellent,
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Breakdown behind a strength score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StrengthReport {
    pub strength: Strength,
    /// 0..=6
    pub points: u8,
    pub length: usize,
    pub has_lowercase: bool,
    pub has_uppercase: bool,
    pub has_digit: bool,
    pub has_symbol: bool,
}

/// Score a password. Never fails.
pub fn score(password: &str) -> Strength {
    analyze(password).strength
}

/// Score a password and report which rules contributed.
///
/// One point per character class present (lowercase, uppercase, digit,
/// symbol), one for length >= 8 and one more for length >= 12. Length
/// counts characters, not bytes.
pub fn analyze(password: &str) -> StrengthReport {
    let length = password.chars().count();
    let has_lowercase = password.chars().any(char::is_lowercase);
    let has_uppercase = password.chars().any(char::is_uppercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace());

    let points = [
        has_lowercase,
        has_uppercase,
        has_digit,
        has_symbol,
        length >= 8,
        length >= 12,
    ]
    .iter()
    .filter(|hit| **hit)
    .count() as u8;

    StrengthReport {
        strength: Strength::from_points(points),
        points,
        length,
        has_lowercase,
        has_uppercase,
        has_digit,
        has_symbol,
    }
}
