//! Turning what the user typed into numbers.
//!
//! A sign-prefixed entry (`+5`, `- 3`) is always a relative change. A bare
//! number (`30`) is a target value, and the change is whatever gets the
//! current value there.

use crate::errors::TempLifeInputError;
use once_cell::sync::Lazy;
use regex::Regex;

static RELATIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([+-])\s*([0-9]+)$").expect("RELATIVE regex pattern is valid"));
static TEMP_AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\s*([0-9]+)$").expect("TEMP_AMOUNT regex pattern is valid"));
static LEADING_INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?[0-9]+").expect("LEADING_INTEGER regex pattern is valid"));

/// Delta to apply to `current_value` for the typed `input`.
///
/// ```
/// use life_tracker::parse::parse_delta;
///
/// assert_eq!(parse_delta(20, "+5"), 5);
/// assert_eq!(parse_delta(20, "-5"), -5);
/// assert_eq!(parse_delta(20, "30"), 10);
/// assert_eq!(parse_delta(20, "abc"), 0);
/// ```
pub fn parse_delta(current_value: i64, input: &str) -> i64 {
    let input = input.trim();

    if let Some(caps) = RELATIVE.captures(input) {
        let Ok(magnitude) = caps[2].parse::<i64>() else {
            return 0;
        };
        return if &caps[1] == "-" { -magnitude } else { magnitude };
    }

    match leading_integer(input) {
        Some(target) => target.saturating_sub(current_value),
        None => 0,
    }
}

/// Amount of temporary life to grant. Only digits with an optional sign in
/// front are accepted; the sign is tolerated but not applied.
pub fn parse_temp_life(input: &str) -> Result<i64, TempLifeInputError> {
    let input = input.trim();
    let caps = TEMP_AMOUNT
        .captures(input)
        .ok_or_else(|| TempLifeInputError::Malformed(input.to_string()))?;
    caps[1]
        .parse::<i64>()
        .map_err(|_| TempLifeInputError::OutOfRange(caps[1].to_string()))
}

/// Max life typed into the "new bar" form. Anything unusable means 1.
pub fn parse_max_life(input: &str) -> i64 {
    leading_integer(input.trim())
        .filter(|value| *value != 0)
        .unwrap_or(1)
        .max(1)
}

/// Integer at the start of `input`, ignoring whatever follows it.
fn leading_integer(input: &str) -> Option<i64> {
    LEADING_INTEGER
        .find(input)
        .and_then(|found| found.as_str().parse().ok())
}

/// A submitted life edit, resolved against the bar's current life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeEdit {
    Unchanged,
    Change(i64),
    GrantTemp(i64),
}

impl LifeEdit {
    pub fn from_input(
        current_life: i64,
        input: &str,
        temporary: bool,
    ) -> Result<Self, TempLifeInputError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Self::Unchanged);
        }

        if temporary {
            let amount = parse_temp_life(input)?;
            return Ok(if amount > 0 {
                Self::GrantTemp(amount)
            } else {
                Self::Unchanged
            });
        }

        Ok(match parse_delta(current_life, input) {
            0 => Self::Unchanged,
            delta => Self::Change(delta),
        })
    }
}
