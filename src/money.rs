//! Money is stored as an integer count of minor units (cents, pence) to
//! avoid floating-point drift in totals.
//!
//! Conversion from user input happens once, at the boundary, by truncating
//! the major-unit amount toward zero: "1.999" is 199 minor units, not 200.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The number of minor units in one major unit.
const MINOR_PER_MAJOR: i64 = 100;

/// An amount of money in minor units, e.g. 425 for 4.25.
///
/// Negative amounts are allowed and represent refunds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(i64);

impl MinorUnits {
    /// Zero minor units.
    pub const ZERO: Self = Self(0);

    /// The largest amount, in magnitude, that a price may have: one hundred
    /// billion major units.
    ///
    /// Over 900,000 prices of this size sum without overflowing an `i64`.
    pub const MAX: Self = Self(10_000_000_000_000);

    /// Create an amount from a raw count of minor units.
    pub const fn new(minor_units: i64) -> Self {
        Self(minor_units)
    }

    /// The raw count of minor units.
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Add two amounts, returning `None` on overflow.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Convert a major-unit amount that was stored as a float.
    ///
    /// The float is first turned into its shortest decimal representation so
    /// that a stored `9.99` truncates to 999 rather than 998.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidInput] if `amount` is not finite or is larger than
    /// [MinorUnits::MAX] once converted.
    pub fn from_legacy_major(amount: f64) -> Result<Self, Error> {
        if !amount.is_finite() {
            return Err(Error::InvalidInput(format!(
                "{amount} is not a valid price"
            )));
        }

        // `Display` for f64 never uses exponent notation.
        amount.to_string().parse()
    }
}

impl FromStr for MinorUnits {
    type Err = Error;

    /// Parse a major-unit decimal string such as "12.5", "-3.999" or "1.5e3".
    ///
    /// Digits past the second decimal place are discarded (truncation toward
    /// zero). Amounts larger than [MinorUnits::MAX] in magnitude are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidInput(format!("\"{s}\" is not a valid price"));
        let too_large = || Error::InvalidInput(format!("\"{s}\" is too large to be a price"));

        let text = s.trim();
        let (is_negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (mantissa, exponent) = match unsigned.split_once(|c: char| c == 'e' || c == 'E') {
            Some((mantissa, exponent)) => (mantissa, parse_exponent(exponent).ok_or_else(invalid)?),
            None => (unsigned, 0),
        };

        let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        if !is_all_digits(whole) || !is_all_digits(fraction) {
            return Err(invalid());
        }

        let digits = whole
            .bytes()
            .chain(fraction.bytes())
            .map(|digit| digit - b'0')
            .collect::<Vec<_>>();
        let leading_zeros = digits.iter().take_while(|&&digit| digit == 0).count();
        let significant = &digits[leading_zeros..];

        // How many significant digits sit at or above the minor-unit place.
        let minor_digits = whole.len() as i64 - leading_zeros as i64 + exponent + 2;

        let magnitude = if significant.is_empty() || minor_digits <= 0 {
            0
        } else if minor_digits > MAX_DIGITS {
            return Err(too_large());
        } else {
            significant
                .iter()
                .copied()
                .chain(std::iter::repeat(0))
                .take(minor_digits as usize)
                .try_fold(0_i64, |acc, digit| {
                    acc.checked_mul(10)?.checked_add(i64::from(digit))
                })
                .ok_or_else(too_large)?
        };

        if magnitude > Self::MAX.0 {
            return Err(too_large());
        }

        Ok(Self(if is_negative { -magnitude } else { magnitude }))
    }
}

/// The number of decimal digits in `i64::MAX`.
const MAX_DIGITS: i64 = 19;

/// Exponents beyond this put any non-zero amount out of range.
const EXPONENT_LIMIT: i64 = 1_000;

fn is_all_digits(text: &str) -> bool {
    text.bytes().all(|byte| byte.is_ascii_digit())
}

/// Parse the part after the 'e' in "1.5e3", clamped to [EXPONENT_LIMIT].
fn parse_exponent(text: &str) -> Option<i64> {
    let (is_negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    if digits.is_empty() || !is_all_digits(digits) {
        return None;
    }

    // Only overflow can fail here since every byte is a digit.
    let exponent = digits.parse::<i64>().unwrap_or(i64::MAX).min(EXPONENT_LIMIT);

    Some(if is_negative { -exponent } else { exponent })
}

impl Display for MinorUnits {
    /// Format in major units with exactly two decimal places, e.g. "4.25".
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let per_major = MINOR_PER_MAJOR.unsigned_abs();

        write!(
            f,
            "{sign}{}.{:02}",
            magnitude / per_major,
            magnitude % per_major
        )
    }
}

impl ToSql for MinorUnits {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for MinorUnits {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Self)
    }
}
