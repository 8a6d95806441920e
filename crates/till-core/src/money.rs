//! # Money Module
//!
//! Provides the `Money` type for rupee amounts, and the rounding utility
//! used to arrive at the payable bill total.
//!
//! ## Why Integer Paise?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise (1 rupee = 100 paise)                      │
//! │    ₹2357.60 is stored as 235760                                         │
//! │    Every sum, product and comparison is exact                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding Policy
//! ```text
//! net price  ₹2357.60 ──► round_down ──► ₹2357.00   (shop policy: truncate)
//! line tax   ₹0.825   ──► calculate_tax ─► ₹0.83    (half-up to the paisa)
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::money::{round_down, Money};
//!
//! let net = Money::from_paise(235_760); // ₹2357.60
//! assert_eq!(round_down(net), Money::from_rupees(2357));
//!
//! let cash: Money = "2400".parse().unwrap();
//! assert_eq!((cash - round_down(net)).rupees(), 43);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::types::TaxRate;

/// Paise per rupee.
pub const PAISE_PER_RUPEE: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (the smallest rupee unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: subtraction can go negative (e.g. cash short of the
///   bill), which callers detect with [`Money::is_negative`]
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serde**: serializes as the raw paise integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let price = Money::from_paise(10_000); // ₹100.00
    /// assert_eq!(price.paise(), 10_000);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * PAISE_PER_RUPEE)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee part, truncated toward zero.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// assert_eq!(Money::from_paise(4_350).rupees(), 43);
    /// assert_eq!(Money::from_paise(-550).rupees(), -5);
    /// ```
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / PAISE_PER_RUPEE
    }

    /// Returns the paise part (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % PAISE_PER_RUPEE).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Checks if the amount has no paise component.
    #[inline]
    pub const fn is_whole_rupees(&self) -> bool {
        self.0 % PAISE_PER_RUPEE == 0
    }

    /// Truncates toward zero to a whole rupee.
    ///
    /// No half-up and no banker's rounding: `2357.99` becomes `2357.00`.
    /// See [`round_down`].
    #[inline]
    pub const fn round_down_to_unit(&self) -> Self {
        Money(self.rupees() * PAISE_PER_RUPEE)
    }

    /// Calculates tax at `rate`, rounded half-up to the paisa.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    /// use till_core::types::TaxRate;
    ///
    /// let purchase = Money::from_rupees(200);
    /// let tax = purchase.calculate_tax(TaxRate::from_bps(1800)); // 18%
    /// assert_eq!(tax, Money::from_rupees(36));
    /// ```
    ///
    /// Saturates at the `i64` range; the pricer uses
    /// [`Money::checked_calculate_tax`].
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        Money(Self::tax_paise(self.0, rate).clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Like [`Money::calculate_tax`], but `None` when the tax does not fit.
    pub fn checked_calculate_tax(&self, rate: TaxRate) -> Option<Money> {
        i64::try_from(Self::tax_paise(self.0, rate)).ok().map(Money)
    }

    // i128 keeps large bills from overflowing the intermediate product
    fn tax_paise(paise: i64, rate: TaxRate) -> i128 {
        (paise as i128 * rate.bps() as i128 + 5000) / 10000
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let unit_price = Money::from_paise(4_999); // ₹49.99
    /// assert_eq!(unit_price.multiply_quantity(3).paise(), 14_997);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// `None` on overflow.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }
}

/// Rounding utility: truncates a non-negative amount to whole rupees.
///
/// ```text
/// ₹2357.60 ──► ₹2357.00
/// ₹2357.00 ──► ₹2357.00   (idempotent)
/// ```
#[inline]
pub fn round_down(amount: Money) -> Money {
    amount.round_down_to_unit()
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses a fixed-point rupee amount such as `"2400"`, `"2400.5"` or
/// `"2400.50"`.
///
/// Signs, exponents and more than two fractional digits are rejected.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };

        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("must be a non-negative decimal number"));
        }
        if frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("must have at most two decimal places"));
        }

        let rupees: i64 = whole
            .parse()
            .map_err(|_| invalid("amount is too large"))?;
        let paise: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid("bad paise"))? * 10,
            _ => frac.parse::<i64>().map_err(|_| invalid("bad paise"))?,
        };

        rupees
            .checked_mul(PAISE_PER_RUPEE)
            .and_then(|p| p.checked_add(paise))
            .map(Money)
            .ok_or_else(|| invalid("amount is too large"))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount with two decimals and no currency symbol (`2357.60`).
///
/// The symbol is a shop setting and is added by the invoice renderer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(235_760);
        assert_eq!(money.paise(), 235_760);
        assert_eq!(money.rupees(), 2357);
        assert_eq!(money.paise_part(), 60);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_paise(235_760).to_string(), "2357.60");
        assert_eq!(Money::from_rupees(43).to_string(), "43.00");
        assert_eq!(Money::from_paise(5).to_string(), "0.05");
        assert_eq!(Money::from_paise(-550).to_string(), "-5.50");
    }

    #[test]
    fn test_round_down_truncates() {
        assert_eq!(round_down(Money::from_paise(235_760)), Money::from_rupees(2357));
        assert_eq!(round_down(Money::from_paise(235_799)), Money::from_rupees(2357));
        assert_eq!(round_down(Money::from_paise(99)), Money::zero());
        assert_eq!(round_down(Money::from_rupees(10)), Money::from_rupees(10));
    }

    #[test]
    fn test_round_down_is_idempotent_and_never_increases() {
        for paise in (0..5_000).chain([999_999, 1_000_001, 123_456_789]) {
            let x = Money::from_paise(paise);
            let once = round_down(x);
            assert_eq!(round_down(once), once, "not idempotent for {}", x);
            assert!(once <= x, "{} rounded up to {}", x, once);
            assert!(once.is_whole_rupees());
            assert!((x - once).paise() < PAISE_PER_RUPEE);
        }
    }

    #[test]
    fn test_parse_amounts() {
        assert_eq!("2400".parse::<Money>().unwrap(), Money::from_rupees(2400));
        assert_eq!("2400.5".parse::<Money>().unwrap().paise(), 240_050);
        assert_eq!("2400.50".parse::<Money>().unwrap().paise(), 240_050);
        assert_eq!(" 0.07 ".parse::<Money>().unwrap().paise(), 7);
    }

    #[test]
    fn test_parse_rejects_bad_amounts() {
        for bad in ["", "   ", "-1", "+1", "1.234", "1e3", "abc", ".50", "1,000"] {
            assert!(bad.parse::<Money>().is_err(), "{:?} should not parse", bad);
        }
        assert!("99999999999999999999".parse::<Money>().is_err());

        // A trailing point with no fraction is read as whole rupees
        assert_eq!("12.".parse::<Money>().unwrap(), Money::from_rupees(12));
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_rupees(10);
        let b = Money::from_rupees(5);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!((a * 3).paise(), 3000);
        assert!((b - a).is_negative());

        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total, Money::from_rupees(20));
    }

    #[test]
    fn test_checked_arithmetic() {
        let price = Money::from_paise(1_000_000_000_000);

        assert_eq!(
            price.checked_multiply_quantity(3),
            Some(Money::from_paise(3_000_000_000_000))
        );
        assert_eq!(price.checked_multiply_quantity(10_000_000), None);
        assert_eq!(Money::from_paise(i64::MAX).checked_add(Money::from_paise(1)), None);
        assert_eq!(
            Money::from_rupees(200).checked_calculate_tax(TaxRate::from_bps(1800)),
            Some(Money::from_rupees(36))
        );
        let huge = Money::from_paise(i64::MAX);
        assert_eq!(huge.checked_calculate_tax(TaxRate::from_bps(20_000)), None);
    }

    #[test]
    fn test_tax_calculation_exact() {
        // ₹200.00 at 18% = ₹36.00
        let tax = Money::from_rupees(200).calculate_tax(TaxRate::from_bps(1800));
        assert_eq!(tax.paise(), 3600);
    }

    #[test]
    fn test_tax_calculation_rounds_half_up() {
        // ₹10.00 at 8.25% = ₹0.825 → ₹0.83
        let tax = Money::from_rupees(10).calculate_tax(TaxRate::from_bps(825));
        assert_eq!(tax.paise(), 83);

        // ₹0.33 at 5% = 1.65 paise → 2 paise
        let tax = Money::from_paise(33).calculate_tax(TaxRate::from_bps(500));
        assert_eq!(tax.paise(), 2);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());
        assert!(zero.is_whole_rupees());
        assert!(!Money::from_paise(101).is_whole_rupees());
    }
}
