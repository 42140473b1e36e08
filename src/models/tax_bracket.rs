//! Tax bracket and bracket table models.
//!
//! A [`BracketTable`] is an ordered set of [`TaxBracket`]s that together cover
//! every non-negative income exactly once. [`BracketTable::new`] validates a
//! table; tables read from a dataset are validated by `TaxYearConfig::new`
//! before any lookup sees them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A single tax-rate tier.
///
/// The range is `[lower_bound, upper_bound)`: the lower bound is inclusive and
/// the upper bound exclusive. An `upper_bound` of `None` means the bracket is
/// unbounded above.
///
/// # Example
///
/// ```
/// use withholding_engine::models::TaxBracket;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let bracket = TaxBracket {
///     lower_bound: Decimal::from_str("44545").unwrap(),
///     upper_bound: Some(Decimal::from_str("89080").unwrap()),
///     rate: Decimal::from_str("0.20").unwrap(),
///     constant: Decimal::from_str("2227").unwrap(),
/// };
///
/// assert!(bracket.contains(Decimal::from_str("44545").unwrap()));
/// assert!(!bracket.contains(Decimal::from_str("89080").unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Inclusive lower edge of the income range.
    pub lower_bound: Decimal,
    /// Exclusive upper edge of the income range, or `None` for the top bracket.
    #[serde(default)]
    pub upper_bound: Option<Decimal>,
    /// Marginal rate applied to the whole annual income.
    pub rate: Decimal,
    /// Constant subtracted to correct for lower tiers being taxed at `rate`.
    pub constant: Decimal,
}

impl TaxBracket {
    /// Returns `true` if `income` falls within `[lower_bound, upper_bound)`.
    pub fn contains(&self, income: Decimal) -> bool {
        income >= self.lower_bound && self.upper_bound.is_none_or(|upper| income < upper)
    }
}

/// An ordered, contiguous set of brackets covering `[0, +inf)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BracketTable {
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    /// Builds a table after checking that the brackets are sorted, contiguous,
    /// start at zero and end with a single unbounded bracket.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] describing the first violation.
    pub fn new(brackets: Vec<TaxBracket>) -> EngineResult<Self> {
        let table = Self { brackets };
        table.validate()?;
        Ok(table)
    }

    /// Checks that the brackets are sorted, contiguous, start at zero and end
    /// with a single unbounded bracket.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] describing the first violation.
    pub fn validate(&self) -> EngineResult<()> {
        let brackets = &self.brackets;
        let invalid = |message: String| Err(EngineError::InvalidConfig { message });

        let Some(first) = brackets.first() else {
            return invalid("bracket table is empty".to_string());
        };
        if !first.lower_bound.is_zero() {
            return invalid(format!(
                "first bracket starts at {} instead of 0",
                first.lower_bound
            ));
        }

        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.rate.is_sign_negative() {
                return invalid(format!("bracket {} has a negative rate", index));
            }
            let is_last = index + 1 == brackets.len();
            match (bracket.upper_bound, is_last) {
                (None, true) => {}
                (None, false) => {
                    return invalid(format!(
                        "bracket {} is unbounded but is not the last bracket",
                        index
                    ));
                }
                (Some(upper), true) => {
                    return invalid(format!(
                        "last bracket ends at {}; the table must extend to infinity",
                        upper
                    ));
                }
                (Some(upper), false) => {
                    if upper <= bracket.lower_bound {
                        return invalid(format!(
                            "bracket {} has upper bound {} not above lower bound {}",
                            index, upper, bracket.lower_bound
                        ));
                    }
                    let next = &brackets[index + 1];
                    if next.lower_bound != upper {
                        return invalid(format!(
                            "gap or overlap between bracket {} (ends {}) and bracket {} (starts {})",
                            index,
                            upper,
                            index + 1,
                            next.lower_bound
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    /// Returns the brackets in ascending order.
    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }
}
