//! Tax bracket lookup.

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{BracketTable, TaxBracket};

/// Finds the bracket whose `[lower_bound, upper_bound)` range contains `income`.
///
/// Every call starts from the table; nothing from a previous lookup is reused.
///
/// # Errors
///
/// Returns [`EngineError::BracketOutOfRange`] if no bracket contains the
/// income. With a validated table this only happens for negative income.
///
/// # Examples
///
/// ```
/// use withholding_engine::calculation::lookup_bracket;
/// use withholding_engine::models::{BracketTable, TaxBracket};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
/// let table = BracketTable::new(vec![
///     TaxBracket { lower_bound: dec("0"), upper_bound: Some(dec("44545")), rate: dec("0.15"), constant: dec("0") },
///     TaxBracket { lower_bound: dec("44545"), upper_bound: None, rate: dec("0.20"), constant: dec("2227") },
/// ]).unwrap();
///
/// let bracket = lookup_bracket(&table, dec("44545")).unwrap();
/// assert_eq!(bracket.rate, dec("0.20"));
/// ```
pub fn lookup_bracket(table: &BracketTable, income: Decimal) -> EngineResult<&TaxBracket> {
    let bracket = table
        .brackets()
        .iter()
        .find(|bracket| bracket.contains(income))
        .ok_or(EngineError::BracketOutOfRange { income })?;

    debug!(
        income = %income,
        rate = %bracket.rate,
        constant = %bracket.constant,
        "Selected tax bracket"
    );

    Ok(bracket)
}
