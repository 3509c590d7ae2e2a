use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed money amount represented as **integer cents**.
///
/// Record amounts are always non-negative magnitudes; the sign only shows up in
/// balances, where [`TransactionKind::sign`] has been applied.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator). The
/// strict parser rejects more than 2 decimals, the lenient one rounds:
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().cents(), 1000);
/// assert_eq!("10,5".parse::<Money>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<Money>().is_err());
/// assert_eq!(Money::parse_lenient("12.345").cents(), 1235);
/// ```
///
/// [`TransactionKind::sign`]: crate::TransactionKind::sign
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Absolute value.
    #[must_use]
    pub const fn magnitude(self) -> Money {
        Money(self.0.saturating_abs())
    }

    /// Parses a decimal and rounds digits past the cents half-up, so
    /// `"12.345"` is 12.35. Out-of-range or non-numeric text is an error.
    pub fn parse_rounded(input: &str) -> Result<Money, EngineError> {
        Decimal::split(input)?.to_money(Rounding::HalfUp)
    }

    /// Parses user input into a non-negative amount, never failing.
    ///
    /// Extra fractional digits are rounded half-up to the cent (see
    /// [`Money::parse_rounded`]). Text that is not a number, or is out of
    /// range, becomes `0`; a negative value keeps only its magnitude.
    #[must_use]
    pub fn parse_lenient(input: &str) -> Money {
        match Money::parse_rounded(input) {
            Ok(amount) => amount.magnitude(),
            Err(err) => {
                tracing::debug!("amount {input:?} normalized to 0: {err}");
                Money::ZERO
            }
        }
    }

    /// `None` on `i64` overflow.
    #[must_use]
    pub const fn checked_add(self, rhs: Money) -> Option<Money> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    #[must_use]
    pub const fn checked_sub(self, rhs: Money) -> Option<Money> {
        match self.0.checked_sub(rhs.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Renders the amount as a plain decimal (`"1234.50"`), no grouping and no
    /// currency symbol.
    #[must_use]
    pub fn to_plain_string(self) -> String {
        self.to_string()
    }

    /// Splits the magnitude into whole units and cents.
    pub(crate) fn units_and_cents(self) -> (u64, u64) {
        let abs = self.0.unsigned_abs();
        (abs / 100, abs % 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let (units, cents) = self.units_and_cents();
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

// Arithmetic saturates at the `i64` bounds.
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

/// Largest magnitude an amount may have: one trillion units.
const MAX_CENTS: i64 = 100_000_000_000_000;

/// What to do with fractional digits past the cents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rounding {
    Reject,
    HalfUp,
}

/// A syntactically valid decimal, split at its separator.
struct Decimal<'a> {
    negative: bool,
    units: &'a str,
    fraction: &'a str,
}

impl<'a> Decimal<'a> {
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    fn split(input: &'a str) -> Result<Self, EngineError> {
        let invalid = || EngineError::InvalidAmount(format!("{input:?} is not a number"));

        let trimmed = input.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let rest = rest.trim();
        if rest.is_empty() {
            return Err(EngineError::InvalidAmount("empty amount".to_string()));
        }

        let mut parts = rest.split(['.', ',']);
        let units = parts.next().unwrap_or_default();
        let fraction = parts.next().unwrap_or_default();
        let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if parts.next().is_some() || units.is_empty() || !digits(units) || !digits(fraction) {
            return Err(invalid());
        }

        Ok(Self {
            negative,
            units,
            fraction,
        })
    }

    fn to_money(&self, rounding: Rounding) -> Result<Money, EngineError> {
        let too_large = || EngineError::InvalidAmount("amount too large".to_string());

        let mut digits = self.fraction.bytes().map(|b| i64::from(b - b'0'));
        let mut cents = digits.next().unwrap_or(0) * 10 + digits.next().unwrap_or(0);
        if let Some(next) = digits.next() {
            match rounding {
                Rounding::Reject => {
                    return Err(EngineError::InvalidAmount("too many decimals".to_string()));
                }
                Rounding::HalfUp if next >= 5 => cents += 1,
                Rounding::HalfUp => {}
            }
        }

        let units: i64 = self.units.parse().map_err(|_| too_large())?;
        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .filter(|v| *v <= MAX_CENTS)
            .ok_or_else(too_large)?;

        Ok(Money(if self.negative { -total } else { total }))
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses an exact decimal string into cents.
    ///
    /// More than two fractional digits, empty or non-numeric text, and
    /// magnitudes above [`MAX_CENTS`] are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::split(s)?.to_money(Rounding::Reject)
    }
}
