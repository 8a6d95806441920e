//! # Change Breakdown Engine
//!
//! Picks the notes and coins that return a balance to the customer from the
//! finite denomination inventory of the till.
//!
//! ## Algorithm (greedy, largest first)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  balance = 650        till = {500:2, 100:3, 50:1}                       │
//! │                                                                         │
//! │  500 │ 650 / 500 = 1, have 2 → use 1   remaining 150                    │
//! │  100 │ 150 / 100 = 1, have 3 → use 1   remaining  50                    │
//! │   50 │  50 /  50 = 1, have 1 → use 1   remaining   0  → stop            │
//! │                                                                         │
//! │  breakdown [(500,1), (100,1), (50,1)]   remainder 0                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Canonical Denominations Only
//! Greedy is minimal for canonical systems such as Indian notes and coins
//! (2000, 500, 200, 100, 50, 20, 10, 5, 2, 1). For arbitrary sets like
//! {4, 3, 1} it is still correct but may not use the fewest pieces, and it
//! can report a remainder that another combination would have covered.
//! The engine is not a general coin-change solver.
//!
//! ## Snapshots
//! [`TillSnapshot`] is a validated, descending copy of the till counts. The
//! engine never mutates it; [`TillSnapshot::after`] yields the counts to
//! persist, which the caller writes only inside the atomic commit.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{ChangeDenomination, Denomination};
use crate::validation::{
    validate_denomination_count, validate_denomination_value, ValidationResult,
};

// =============================================================================
// Till Snapshot
// =============================================================================

/// Denomination counts used by one change computation.
///
/// ## Invariants
/// - values are positive and unique
/// - counts are non-negative
/// - entries are sorted by value, descending
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TillSnapshot {
    denominations: Vec<Denomination>,
}

impl TillSnapshot {
    /// Validates and sorts `denominations` (any input order).
    ///
    /// ## Example
    /// ```rust
    /// use till_core::change::TillSnapshot;
    /// use till_core::types::Denomination;
    ///
    /// let till = TillSnapshot::new(vec![
    ///     Denomination::new(50, 1),
    ///     Denomination::new(500, 2),
    /// ])
    /// .unwrap();
    /// assert_eq!(till.denominations()[0].value, 500);
    /// ```
    pub fn new(mut denominations: Vec<Denomination>) -> ValidationResult<Self> {
        for d in &denominations {
            validate_denomination_value(d.value)?;
            validate_denomination_count(d.count_available)?;
        }

        denominations.sort_by(|a, b| b.value.cmp(&a.value));

        if let Some(pair) = denominations.windows(2).find(|w| w[0].value == w[1].value) {
            return Err(ValidationError::Duplicate {
                field: "denomination".to_string(),
                value: pair[0].value.to_string(),
            });
        }

        Ok(TillSnapshot { denominations })
    }

    /// Builds a snapshot from counts an operator submitted for one
    /// transaction.
    ///
    /// ## Rules
    /// - Every submitted value must be one of `registered`; anything else is
    ///   rejected as [`ValidationError::NotAllowed`]
    /// - Registered values the operator did not mention count as 0
    /// - A value submitted twice is [`ValidationError::Duplicate`]
    pub fn from_submitted(
        registered: &[i64],
        submitted: &[Denomination],
    ) -> ValidationResult<Self> {
        let mut counts: HashMap<i64, i64> = registered.iter().map(|v| (*v, 0)).collect();
        let mut seen: Vec<i64> = Vec::with_capacity(submitted.len());

        for d in submitted {
            if seen.contains(&d.value) {
                return Err(ValidationError::Duplicate {
                    field: "denomination".to_string(),
                    value: d.value.to_string(),
                });
            }
            seen.push(d.value);

            match counts.get_mut(&d.value) {
                Some(count) => *count = d.count_available,
                None => {
                    let mut allowed: Vec<i64> = registered.to_vec();
                    allowed.sort_unstable_by(|a, b| b.cmp(a));
                    return Err(ValidationError::NotAllowed {
                        field: "denomination".to_string(),
                        allowed: allowed.iter().map(i64::to_string).collect(),
                    });
                }
            }
        }

        TillSnapshot::new(
            counts
                .into_iter()
                .map(|(value, count)| Denomination::new(value, count))
                .collect(),
        )
    }

    /// Denominations in descending value order.
    pub fn denominations(&self) -> &[Denomination] {
        &self.denominations
    }

    /// Count held for `value`, if that denomination is in the till.
    pub fn count_of(&self, value: i64) -> Option<i64> {
        self.denominations
            .iter()
            .find(|d| d.value == value)
            .map(|d| d.count_available)
    }

    /// Total rupees held in the till.
    pub fn total_value(&self) -> i64 {
        self.denominations
            .iter()
            .map(|d| d.value * d.count_available)
            .sum()
    }

    /// Returns the counts remaining after `breakdown` is handed out.
    ///
    /// `breakdown` must have been computed from this snapshot; counts are
    /// saturated at zero otherwise.
    pub fn after(&self, breakdown: &ChangeBreakdown) -> TillSnapshot {
        let denominations = self
            .denominations
            .iter()
            .map(|d| {
                let used = breakdown.count_of(d.value);
                Denomination::new(d.value, (d.count_available - used).max(0))
            })
            .collect();

        TillSnapshot { denominations }
    }
}

// =============================================================================
// Change Breakdown
// =============================================================================

/// One denomination used for change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLine {
    pub value: i64,
    pub count: i64,
}

impl From<ChangeLine> for ChangeDenomination {
    fn from(line: ChangeLine) -> Self {
        ChangeDenomination {
            value: line.value,
            count: line.count,
        }
    }
}

/// Result of [`compute_change`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBreakdown {
    /// Denominations used, descending by value. Only counts > 0 appear.
    pub lines: Vec<ChangeLine>,
    /// Whole rupees the till could not cover (0 for exact change).
    pub remainder: i64,
}

impl ChangeBreakdown {
    /// Rupees covered by the breakdown.
    pub fn paid_out(&self) -> i64 {
        self.lines.iter().map(|l| l.value * l.count).sum()
    }

    /// Checks if the till was able to return the full balance.
    #[inline]
    pub fn is_exact(&self) -> bool {
        self.remainder == 0
    }

    fn count_of(&self, value: i64) -> i64 {
        self.lines
            .iter()
            .find(|l| l.value == value)
            .map_or(0, |l| l.count)
    }
}

/// Computes the greedy change for `balance` whole rupees.
///
/// Never fails: a till that cannot cover the balance yields a non-zero
/// `remainder`. A non-positive balance yields an empty breakdown with
/// remainder 0.
pub fn compute_change(balance: i64, till: &TillSnapshot) -> ChangeBreakdown {
    let mut remaining = balance.max(0);
    let mut lines = Vec::new();

    for d in till.denominations() {
        if remaining <= 0 {
            break;
        }

        let used = (remaining / d.value).min(d.count_available);
        if used > 0 {
            lines.push(ChangeLine {
                value: d.value,
                count: used,
            });
            remaining -= used * d.value;
        }
    }

    ChangeBreakdown {
        lines,
        remainder: remaining,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn till(pairs: &[(i64, i64)]) -> TillSnapshot {
        TillSnapshot::new(
            pairs
                .iter()
                .map(|(v, c)| Denomination::new(*v, *c))
                .collect(),
        )
        .unwrap()
    }

    fn lines(pairs: &[(i64, i64)]) -> Vec<ChangeLine> {
        pairs
            .iter()
            .map(|(value, count)| ChangeLine {
                value: *value,
                count: *count,
            })
            .collect()
    }

    #[test]
    fn test_exact_change_uses_one_of_each() {
        let result = compute_change(650, &till(&[(500, 2), (100, 3), (50, 1)]));
        assert_eq!(result.lines, lines(&[(500, 1), (100, 1), (50, 1)]));
        assert_eq!(result.remainder, 0);
        assert!(result.is_exact());
    }

    #[test]
    fn test_shortfall_is_reported_not_failed() {
        let result = compute_change(130, &till(&[(100, 1), (50, 0)]));
        assert_eq!(result.lines, lines(&[(100, 1)]));
        assert_eq!(result.remainder, 30);
        assert!(!result.is_exact());
    }

    #[test]
    fn test_zero_balance_uses_nothing() {
        let result = compute_change(0, &till(&[(500, 2), (1, 10)]));
        assert!(result.lines.is_empty());
        assert_eq!(result.remainder, 0);
    }

    #[test]
    fn test_empty_till_returns_everything_as_remainder() {
        let result = compute_change(43, &till(&[]));
        assert!(result.lines.is_empty());
        assert_eq!(result.remainder, 43);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let a = till(&[(50, 1), (500, 2), (100, 3)]);
        let b = till(&[(500, 2), (100, 3), (50, 1)]);
        assert_eq!(a, b);
        assert_eq!(compute_change(650, &a), compute_change(650, &b));
    }

    #[test]
    fn test_canonical_system_is_minimal() {
        // Indian notes/coins: greedy gives the fewest pieces
        let indian = till(&[
            (2000, 5),
            (500, 5),
            (200, 5),
            (100, 5),
            (50, 5),
            (20, 5),
            (10, 5),
            (5, 5),
            (2, 5),
            (1, 5),
        ]);
        let result = compute_change(2888, &indian);
        assert_eq!(
            result.lines,
            lines(&[
                (2000, 1),
                (500, 1),
                (200, 1),
                (100, 1),
                (50, 1),
                (20, 1),
                (10, 1),
                (5, 1),
                (2, 1),
                (1, 1)
            ])
        );
    }

    #[test]
    fn test_non_canonical_system_is_greedy_not_optimal() {
        // {4, 3, 1} for 6: optimal is 3+3, greedy takes 4+1+1
        let result = compute_change(6, &till(&[(4, 5), (3, 5), (1, 5)]));
        assert_eq!(result.lines, lines(&[(4, 1), (1, 2)]));

        // and can leave a remainder another combination would cover
        let result = compute_change(6, &till(&[(4, 1), (3, 2)]));
        assert_eq!(result.lines, lines(&[(4, 1)]));
        assert_eq!(result.remainder, 2);
    }

    #[test]
    fn test_conservation_and_bounds_over_grid() {
        let tills = [
            till(&[(500, 2), (100, 3), (50, 1)]),
            till(&[(100, 1), (50, 0)]),
            till(&[(2000, 1), (500, 3), (200, 0), (100, 4), (10, 7), (5, 1), (1, 3)]),
            till(&[(7, 3), (3, 9)]),
            till(&[(1, 1000)]),
            till(&[]),
        ];

        for snapshot in &tills {
            for balance in 0..=3000 {
                let result = compute_change(balance, snapshot);

                assert_eq!(
                    result.paid_out() + result.remainder,
                    balance,
                    "conservation failed for {} over {:?}",
                    balance,
                    snapshot
                );
                assert!(result.remainder >= 0);
                for line in &result.lines {
                    assert!(line.count > 0);
                    let available = snapshot.count_of(line.value).unwrap();
                    assert!(line.count <= available);
                }
                assert!(result.lines.windows(2).all(|w| w[0].value > w[1].value));

                // Deterministic
                assert_eq!(result, compute_change(balance, snapshot));

                // Post-consumption counts never go negative
                let after = snapshot.after(&result);
                assert!(after.denominations().iter().all(|d| d.count_available >= 0));
                assert_eq!(snapshot.total_value() - after.total_value(), result.paid_out());
            }
        }
    }

    #[test]
    fn test_after_subtracts_used_counts() {
        let snapshot = till(&[(500, 2), (100, 3), (50, 1)]);
        let result = compute_change(650, &snapshot);
        let after = snapshot.after(&result);

        assert_eq!(after.count_of(500), Some(1));
        assert_eq!(after.count_of(100), Some(2));
        assert_eq!(after.count_of(50), Some(0));
    }

    #[test]
    fn test_snapshot_rejects_invalid_input() {
        let dup = TillSnapshot::new(vec![Denomination::new(100, 1), Denomination::new(100, 2)]);
        assert!(matches!(dup, Err(ValidationError::Duplicate { .. })));

        let zero = TillSnapshot::new(vec![Denomination::new(0, 1)]);
        assert!(matches!(zero, Err(ValidationError::MustBePositive { .. })));

        let negative = TillSnapshot::new(vec![Denomination::new(10, -1)]);
        assert!(matches!(negative, Err(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn test_from_submitted_fills_missing_with_zero() {
        let registered = [500, 100, 50];
        let snapshot =
            TillSnapshot::from_submitted(&registered, &[Denomination::new(100, 4)]).unwrap();

        assert_eq!(
            snapshot.denominations(),
            &[
                Denomination::new(500, 0),
                Denomination::new(100, 4),
                Denomination::new(50, 0)
            ]
        );
    }

    #[test]
    fn test_from_submitted_rejects_unknown_and_duplicate_values() {
        let registered = [500, 100];

        let unknown = TillSnapshot::from_submitted(&registered, &[Denomination::new(20, 1)]);
        match unknown {
            Err(ValidationError::NotAllowed { allowed, .. }) => {
                assert_eq!(allowed, vec!["500".to_string(), "100".to_string()]);
            }
            other => panic!("expected NotAllowed, got {:?}", other),
        }

        let dup = TillSnapshot::from_submitted(
            &registered,
            &[Denomination::new(100, 1), Denomination::new(100, 1)],
        );
        assert!(matches!(dup, Err(ValidationError::Duplicate { .. })));
    }
}
