//! Amount type for Vietnamese dong values.
//!
//! This module provides the `Vnd` type which wraps `Decimal` and handles parsing values written
//! the way Vietnamese users type them: `50.000.000`, `50,000,000`, `50000000 ₫`. A '.' or ',' is
//! only ever a thousands separator, so `12.5` is rejected rather than read as `125`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;

/// Currency suffixes that are accepted, and ignored, when parsing.
const SUFFIXES: [&str; 4] = ["₫", "đ", "VND", "vnd"];

/// Represents an amount of Vietnamese dong.
///
/// The value is held exactly. Rounding to whole dong happens only when the amount is displayed or
/// written into a declaration.
///
/// # Examples
///
/// Parsing with grouping separators:
/// ```
/// # use tax_helper::model::Vnd;
/// # use std::str::FromStr;
/// let amount = Vnd::from_str("50.000.000").unwrap();
/// assert_eq!(amount, Vnd::from(50_000_000));
/// assert_eq!(amount.to_string(), "50.000.000");
/// ```
///
/// Parsing with a currency suffix:
/// ```
/// # use tax_helper::model::Vnd;
/// # use std::str::FromStr;
/// let amount = Vnd::from_str("3,245,000 ₫").unwrap();
/// assert_eq!(amount.currency(), "3.245.000 ₫");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Vnd(Decimal);

impl Vnd {
    pub const ZERO: Vnd = Vnd(Decimal::ZERO);

    /// Creates a new amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the amount is strictly less than zero.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Rounds half away from zero to whole dong.
    pub fn round(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Returns the larger of `self` and zero.
    pub fn non_negative(&self) -> Self {
        if self.is_negative() {
            Self::ZERO
        } else {
            *self
        }
    }

    /// Formats the amount with grouping and the dong sign, e.g. `3.245.000 ₫`.
    pub fn currency(&self) -> String {
        format!("{self} ₫")
    }
}

/// An error that can occur when parsing strings into `Vnd` values.
pub enum VndError {
    /// The digits do not form a number.
    Decimal(rust_decimal::Error),
    /// A '.' or ',' that does not separate groups of three digits.
    Grouping(String),
}

impl Debug for VndError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            VndError::Decimal(e) => Debug::fmt(e, f),
            VndError::Grouping(s) => write!(f, "Grouping({s:?})"),
        }
    }
}

impl Display for VndError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            VndError::Decimal(e) => write!(f, "Số tiền không hợp lệ: {e}"),
            VndError::Grouping(s) => write!(
                f,
                "Số tiền không hợp lệ: '{s}'. Dấu '.' và ',' chỉ dùng để phân cách hàng nghìn"
            ),
        }
    }
}

impl std::error::Error for VndError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            VndError::Decimal(e) => Some(e),
            VndError::Grouping(_) => None,
        }
    }
}

/// True when `groups` is a leading group of one to three digits followed by groups of exactly
/// three digits.
fn is_thousands_grouping(groups: &[&str]) -> bool {
    let Some((first, rest)) = groups.split_first() else {
        return false;
    };
    let digits_only = |g: &&str| g.chars().all(|c| c.is_ascii_digit());
    (1..=3).contains(&first.len())
        && digits_only(first)
        && rest.iter().all(|g| g.len() == 3 && digits_only(g))
}

impl FromStr for Vnd {
    type Err = VndError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut trimmed = s.trim();
        for suffix in SUFFIXES {
            if let Some(stripped) = trimmed.strip_suffix(suffix) {
                trimmed = stripped.trim_end();
                break;
            }
        }

        if trimmed.is_empty() {
            return Ok(Vnd::default());
        }

        let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
        let (sign, unsigned) = match compact.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", compact.as_str()),
        };

        // Both '.' and ',' are thousands separators in user input
        let groups: Vec<&str> = unsigned.split(['.', ',']).collect();
        if groups.len() > 1 && !is_thousands_grouping(&groups) {
            return Err(VndError::Grouping(s.trim().to_string()));
        }

        let digits = format!("{sign}{}", groups.concat());
        let value = Decimal::from_str(&digits).map_err(VndError::Decimal)?;
        Ok(Vnd(value))
    }
}

impl Display for Vnd {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rounded = self.round().value();
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let grouped = format_num::format_num!(",.0", rounded.abs().to_f64().unwrap_or_default());
        write!(f, "{sign}{}", grouped.replace(',', "."))
    }
}

impl From<Decimal> for Vnd {
    fn from(value: Decimal) -> Self {
        Vnd(value)
    }
}

impl From<i64> for Vnd {
    fn from(value: i64) -> Self {
        Vnd(Decimal::from(value))
    }
}

impl From<Vnd> for Decimal {
    fn from(amount: Vnd) -> Self {
        amount.value()
    }
}

impl Add for Vnd {
    type Output = Vnd;

    fn add(self, rhs: Self) -> Self::Output {
        Vnd(self.0 + rhs.0)
    }
}

impl AddAssign for Vnd {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Vnd {
    type Output = Vnd;

    fn sub(self, rhs: Self) -> Self::Output {
        Vnd(self.0 - rhs.0)
    }
}

/// Multiplying by a rate or a quantity.
impl Mul<Decimal> for Vnd {
    type Output = Vnd;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Vnd(self.0 * rhs)
    }
}

impl Sum for Vnd {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Vnd::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Vnd> for Vnd {
    fn sum<I: Iterator<Item = &'a Vnd>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
