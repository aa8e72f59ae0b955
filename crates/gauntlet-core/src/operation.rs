//! Typed arithmetic operations.
//!
//! Cells store their effect as raw [`Token`](crate::Token) text. This module
//! provides the typed [`Operation`] that a token denotes, with two parsers:
//!
//! - [`Operation::from_str`] implements the strict authoring grammar used by
//!   editors ([`is_valid_operation`]).
//! - [`Operation::parse_lenient`] accepts whatever the game accepts at play
//!   time, reading numbers as numeric prefixes and never failing loudly.
//!
//! Every application clamps its result to [`MIN_VALUE`]`..=`[`MAX_VALUE`].

use std::{
    fmt::{self, Display},
    str::FromStr,
};

/// Largest value an operation can produce.
pub const MAX_VALUE: i64 = 99_999;

/// Smallest value an operation can produce.
pub const MIN_VALUE: i64 = -MAX_VALUE;

/// An arithmetic operation applied when a cell is entered.
///
/// # Examples
///
/// ```
/// use gauntlet_core::Operation;
///
/// let op: Operation = "-0.5x".parse()?;
/// assert_eq!(op, Operation::Multiply(-0.5));
/// assert_eq!(op.apply(7), -4);
/// assert_eq!(op.to_string(), "-0.5x");
/// # Ok::<(), gauntlet_core::ParseOperationError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    /// `+N`
    Add(i64),
    /// `-N`
    Subtract(i64),
    /// `Fx`, floored toward negative infinity.
    Multiply(f64),
    /// `%N`, remainder with the sign of the dividend.
    Modulo(i64),
    /// `sqrt`, floored; non-positive values are left unchanged.
    Sqrt,
    /// `^2`
    Square,
    /// `=...`, leaves the value unchanged.
    Identity,
}

impl Operation {
    /// Applies the operation to `value`.
    ///
    /// Results are clamped to [`MIN_VALUE`]`..=`[`MAX_VALUE`]. A product that is
    /// not finite, or a remainder by zero, leaves `value` unchanged.
    #[must_use]
    #[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn apply(self, value: i64) -> i64 {
        let result = match self {
            Self::Add(n) => value.saturating_add(n),
            Self::Subtract(n) => value.saturating_sub(n),
            Self::Multiply(factor) => {
                let product = (value as f64 * factor).floor();
                if !product.is_finite() {
                    return value;
                }
                product.clamp(MIN_VALUE as f64, MAX_VALUE as f64) as i64
            }
            Self::Modulo(divisor) => value.checked_rem(divisor).unwrap_or(value),
            Self::Sqrt if value > 0 => value.isqrt(),
            Self::Sqrt | Self::Identity => value,
            Self::Square => value.saturating_mul(value),
        };
        result.clamp(MIN_VALUE, MAX_VALUE)
    }

    /// Interprets a token the way play-time evaluation does.
    ///
    /// The token shape is checked in precedence order: leading `+`, leading `-`
    /// without a trailing `x`, trailing `x`, leading `%`, `sqrt` (any case) or
    /// `√`, `^2`, leading `=`. Numbers are read as the longest numeric prefix of
    /// the remaining text. Returns `None` when the shape is unknown or no number
    /// can be read.
    ///
    /// # Examples
    ///
    /// ```
    /// use gauntlet_core::Operation;
    ///
    /// assert_eq!(Operation::parse_lenient("+12abc"), Some(Operation::Add(12)));
    /// assert_eq!(Operation::parse_lenient(".5x"), Some(Operation::Multiply(0.5)));
    /// assert_eq!(Operation::parse_lenient("SQRT"), Some(Operation::Sqrt));
    /// assert_eq!(Operation::parse_lenient("?"), None);
    /// assert_eq!(Operation::parse_lenient("+"), None);
    /// ```
    #[must_use]
    pub fn parse_lenient(token: &str) -> Option<Self> {
        if let Some(rest) = token.strip_prefix('+') {
            return int_prefix(rest).map(Self::Add);
        }
        if let Some(rest) = token.strip_prefix('-')
            && !token.ends_with('x')
        {
            return int_prefix(rest).map(Self::Subtract);
        }
        if let Some(body) = token.strip_suffix('x') {
            return float_prefix(body).map(Self::Multiply);
        }
        if let Some(rest) = token.strip_prefix('%') {
            return int_prefix(rest).map(Self::Modulo);
        }
        if token.eq_ignore_ascii_case("sqrt") || token == "√" {
            return Some(Self::Sqrt);
        }
        if token == "^2" {
            return Some(Self::Square);
        }
        if token.starts_with('=') {
            return Some(Self::Identity);
        }
        None
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add(n) => write!(f, "+{n}"),
            Self::Subtract(n) => write!(f, "-{n}"),
            Self::Multiply(factor) => write!(f, "{factor}x"),
            Self::Modulo(n) => write!(f, "%{n}"),
            Self::Sqrt => f.write_str("sqrt"),
            Self::Square => f.write_str("^2"),
            Self::Identity => f.write_str("="),
        }
    }
}

/// Errors returned by the strict operation grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseOperationError {
    /// The token is empty or whitespace.
    #[display("operation is empty")]
    Empty,
    /// The numeric part is missing or malformed.
    #[display("operation has an invalid number")]
    InvalidNumber,
    /// `%0` would divide by zero.
    #[display("modulo divisor must not be zero")]
    ZeroDivisor,
    /// The token matches no known operation shape.
    #[display("unrecognized operation")]
    Unrecognized,
}

impl FromStr for Operation {
    type Err = ParseOperationError;

    /// Parses the strict authoring grammar.
    ///
    /// Input is trimmed and compared case-insensitively. Accepted shapes are
    /// `+N`, `-N`, `%N` (N non-zero), `[-][digits][.digits]x`, `sqrt` and `^2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_lowercase();
        match token.as_str() {
            "" => return Err(ParseOperationError::Empty),
            "sqrt" => return Ok(Self::Sqrt),
            "^2" => return Ok(Self::Square),
            _ => {}
        }

        if let Some(rest) = token.strip_prefix('+') {
            return parse_digits(rest).map(Self::Add);
        }
        if let Some(rest) = token.strip_prefix('%') {
            return match parse_digits(rest)? {
                0 => Err(ParseOperationError::ZeroDivisor),
                divisor => Ok(Self::Modulo(divisor)),
            };
        }
        if let Some(body) = token.strip_suffix('x') {
            return parse_factor(body).map(Self::Multiply);
        }
        if let Some(rest) = token.strip_prefix('-') {
            return parse_digits(rest).map(Self::Subtract);
        }
        Err(ParseOperationError::Unrecognized)
    }
}

/// Returns `true` if `token` is accepted by the strict authoring grammar.
///
/// # Examples
///
/// ```
/// use gauntlet_core::is_valid_operation;
///
/// assert!(is_valid_operation("+5"));
/// assert!(is_valid_operation(" -.5X "));
/// assert!(!is_valid_operation("%0"));
/// assert!(!is_valid_operation("x"));
/// assert!(!is_valid_operation("=3"));
/// ```
#[must_use]
pub fn is_valid_operation(token: &str) -> bool {
    token.parse::<Operation>().is_ok()
}

/// Parses a non-empty run of ASCII digits, saturating beyond the `i64` range.
fn parse_digits(s: &str) -> Result<i64, ParseOperationError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseOperationError::InvalidNumber);
    }
    Ok(saturating_magnitude(s))
}

fn parse_factor(body: &str) -> Result<f64, ParseOperationError> {
    let (negative, unsigned) = match body.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, body),
    };
    let (int, frac) = match unsigned.split_once('.') {
        Some((int, frac)) => {
            if frac.is_empty() {
                return Err(ParseOperationError::InvalidNumber);
            }
            (int, frac)
        }
        None => (unsigned, ""),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int.is_empty() && frac.is_empty()) || !all_digits(int) || !all_digits(frac) {
        return Err(ParseOperationError::InvalidNumber);
    }
    let factor = normalized_decimal(negative, int, frac, "")
        .parse::<f64>()
        .map_err(|_| ParseOperationError::InvalidNumber)?;
    Ok(factor)
}

/// Reads an optionally signed integer prefix after leading whitespace.
///
/// Digits beyond the `i64` range saturate.
fn int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = split_sign(s);
    let digits = leading_digits(rest);
    if digits.is_empty() {
        return None;
    }
    let magnitude = saturating_magnitude(digits);
    Some(if negative { -magnitude } else { magnitude })
}

fn saturating_magnitude(digits: &str) -> i64 {
    digits.bytes().fold(0_i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    })
}

/// Reads an optionally signed decimal prefix after leading whitespace.
///
/// Accepts `digits[.digits][e[sign]digits]`, `.digits[...]` and `Infinity`.
fn float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let (negative, rest) = split_sign(s);
    if rest.starts_with("Infinity") {
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int = leading_digits(rest);
    let after_int = &rest[int.len()..];
    let dot = after_int.starts_with('.');
    let frac = if dot { leading_digits(&after_int[1..]) } else { "" };
    if int.is_empty() && frac.is_empty() {
        return None;
    }

    // A bare trailing dot (`1.`) is still consumed before the exponent.
    let consumed = int.len() + if dot { frac.len() + 1 } else { 0 };
    let mut exponent = "";
    if let Some(exp) = rest[consumed..]
        .strip_prefix('e')
        .or_else(|| rest[consumed..].strip_prefix('E'))
    {
        let (_, unsigned) = split_sign(exp);
        let exp_digits = leading_digits(unsigned);
        if !exp_digits.is_empty() {
            exponent = &exp[..exp.len() - unsigned.len() + exp_digits.len()];
        }
    }

    normalized_decimal(negative, int, frac, exponent)
        .parse()
        .ok()
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else {
        (false, s.strip_prefix('+').unwrap_or(s))
    }
}

fn leading_digits(s: &str) -> &str {
    let end = s.bytes().position(|b| !b.is_ascii_digit()).unwrap_or(s.len());
    &s[..end]
}

fn normalized_decimal(negative: bool, int: &str, frac: &str, exponent: &str) -> String {
    let sign = if negative { "-" } else { "" };
    let int = if int.is_empty() { "0" } else { int };
    let frac = if frac.is_empty() { "0" } else { frac };
    let exponent = if exponent.is_empty() {
        String::new()
    } else {
        format!("e{exponent}")
    };
    format!("{sign}{int}.{frac}{exponent}")
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_strict_grammar_accepts_documented_shapes() {
        assert_eq!("+1".parse::<Operation>(), Ok(Operation::Add(1)));
        assert_eq!("-123".parse::<Operation>(), Ok(Operation::Subtract(123)));
        assert_eq!("%7".parse::<Operation>(), Ok(Operation::Modulo(7)));
        assert_eq!("2x".parse::<Operation>(), Ok(Operation::Multiply(2.0)));
        assert_eq!("0.5x".parse::<Operation>(), Ok(Operation::Multiply(0.5)));
        assert_eq!(".5x".parse::<Operation>(), Ok(Operation::Multiply(0.5)));
        assert_eq!("-3x".parse::<Operation>(), Ok(Operation::Multiply(-3.0)));
        assert_eq!("-.5x".parse::<Operation>(), Ok(Operation::Multiply(-0.5)));
        assert_eq!("SQRT".parse::<Operation>(), Ok(Operation::Sqrt));
        assert_eq!(" ^2 ".parse::<Operation>(), Ok(Operation::Square));
    }

    #[test]
    fn test_strict_grammar_rejects_malformed_tokens() {
        assert_eq!("".parse::<Operation>(), Err(ParseOperationError::Empty));
        assert_eq!("   ".parse::<Operation>(), Err(ParseOperationError::Empty));
        assert_eq!("%0".parse::<Operation>(), Err(ParseOperationError::ZeroDivisor));
        assert_eq!("x".parse::<Operation>(), Err(ParseOperationError::InvalidNumber));
        assert_eq!("-x".parse::<Operation>(), Err(ParseOperationError::InvalidNumber));
        assert_eq!("5.x".parse::<Operation>(), Err(ParseOperationError::InvalidNumber));
        assert_eq!("+".parse::<Operation>(), Err(ParseOperationError::InvalidNumber));
        assert_eq!("+1.5".parse::<Operation>(), Err(ParseOperationError::InvalidNumber));
        assert_eq!("=3".parse::<Operation>(), Err(ParseOperationError::Unrecognized));
        assert_eq!("?".parse::<Operation>(), Err(ParseOperationError::Unrecognized));
        assert_eq!("12".parse::<Operation>(), Err(ParseOperationError::Unrecognized));
    }

    #[test]
    fn test_lenient_parse_precedence() {
        assert_eq!(Operation::parse_lenient("+5x"), Some(Operation::Add(5)));
        assert_eq!(Operation::parse_lenient("-5"), Some(Operation::Subtract(5)));
        assert_eq!(
            Operation::parse_lenient("-5x"),
            Some(Operation::Multiply(-5.0))
        );
        assert_eq!(Operation::parse_lenient("+ 7"), Some(Operation::Add(7)));
        assert_eq!(Operation::parse_lenient("+-7"), Some(Operation::Add(-7)));
        assert_eq!(Operation::parse_lenient("%3"), Some(Operation::Modulo(3)));
        assert_eq!(Operation::parse_lenient("%0"), Some(Operation::Modulo(0)));
        assert_eq!(Operation::parse_lenient("√"), Some(Operation::Sqrt));
        assert_eq!(Operation::parse_lenient("=fixed"), Some(Operation::Identity));
        assert_eq!(
            Operation::parse_lenient("1e2x"),
            Some(Operation::Multiply(100.0))
        );
        assert_eq!(Operation::parse_lenient("12"), None);
        assert_eq!(Operation::parse_lenient("x"), None);
        assert_eq!(Operation::parse_lenient("%"), None);
        assert_eq!(Operation::parse_lenient("2X"), None);
    }

    #[test]
    fn test_apply_basic_semantics() {
        assert_eq!(Operation::Add(5).apply(10), 15);
        assert_eq!(Operation::Subtract(15).apply(10), -5);
        assert_eq!(Operation::Multiply(0.5).apply(7), 3);
        assert_eq!(Operation::Multiply(-0.5).apply(7), -4);
        assert_eq!(Operation::Multiply(3.0).apply(-4), -12);
        assert_eq!(Operation::Modulo(4).apply(10), 2);
        assert_eq!(Operation::Modulo(4).apply(-10), -2);
        assert_eq!(Operation::Modulo(0).apply(10), 10);
        assert_eq!(Operation::Sqrt.apply(17), 4);
        assert_eq!(Operation::Sqrt.apply(0), 0);
        assert_eq!(Operation::Sqrt.apply(-9), -9);
        assert_eq!(Operation::Square.apply(-12), 144);
        assert_eq!(Operation::Identity.apply(42), 42);
    }

    #[test]
    fn test_apply_clamps_and_recovers() {
        assert_eq!(Operation::Square.apply(1000), MAX_VALUE);
        assert_eq!(Operation::Multiply(-10.0).apply(50_000), MIN_VALUE);
        assert_eq!(Operation::Add(i64::MAX).apply(1), MAX_VALUE);
        assert_eq!(Operation::Multiply(f64::INFINITY).apply(3), 3);
        assert_eq!(Operation::Multiply(f64::INFINITY).apply(0), 0);
        assert_eq!(Operation::Multiply(f64::NAN).apply(3), 3);
    }

    #[test]
    fn test_display_round_trips_through_strict_parser() {
        let ops = [
            Operation::Add(12),
            Operation::Subtract(3),
            Operation::Multiply(0.3),
            Operation::Multiply(-4.0),
            Operation::Modulo(19),
            Operation::Sqrt,
            Operation::Square,
        ];
        for op in ops {
            assert_eq!(op.to_string().parse::<Operation>(), Ok(op), "{op}");
        }
        assert_eq!(Operation::Multiply(2.0).to_string(), "2x");
        assert_eq!(Operation::Multiply(-0.7).to_string(), "-0.7x");
    }

    #[test]
    fn test_exponent_after_bare_dot() {
        assert_eq!(
            Operation::parse_lenient("1.e5x"),
            Some(Operation::Multiply(100_000.0))
        );
        assert_eq!(Operation::parse_lenient("1.x"), Some(Operation::Multiply(1.0)));
        assert_eq!(Operation::parse_lenient(".e5x"), None);
        assert_eq!(
            Operation::parse_lenient("1.e5x").map(|op| op.apply(1)),
            Some(MAX_VALUE)
        );
    }

    #[test]
    fn test_strict_grammar_saturates_long_digit_runs() {
        let huge = "99999999999999999999";
        assert_eq!(format!("+{huge}").parse::<Operation>(), Ok(Operation::Add(i64::MAX)));
        assert_eq!(
            format!("-{huge}").parse::<Operation>(),
            Ok(Operation::Subtract(i64::MAX))
        );
        assert_eq!(
            format!("%{huge}").parse::<Operation>(),
            Ok(Operation::Modulo(i64::MAX))
        );
        assert!(is_valid_operation(&format!("+{huge}")));
        assert_eq!(Operation::Subtract(i64::MAX).apply(0), MIN_VALUE);
    }

    fn in_range() -> impl Strategy<Value = i64> {
        MIN_VALUE..=MAX_VALUE
    }

    fn valid_operation() -> impl Strategy<Value = Operation> {
        prop_oneof![
            (0_i64..=1000).prop_map(Operation::Add),
            (0_i64..=1000).prop_map(Operation::Subtract),
            (-100_i64..=100).prop_map(|tenths| Operation::Multiply(tenths as f64 / 10.0)),
            (1_i64..=100).prop_map(Operation::Modulo),
            Just(Operation::Sqrt),
            Just(Operation::Square),
            Just(Operation::Identity),
        ]
    }

    proptest! {
        #[test]
        fn apply_stays_in_range(value in in_range(), op in valid_operation()) {
            let result = op.apply(value);
            prop_assert!((MIN_VALUE..=MAX_VALUE).contains(&result));
        }

        #[test]
        fn add_and_subtract_match_clamped_arithmetic(value in in_range(), n in 0_i64..=200_000) {
            prop_assert_eq!(Operation::Add(n).apply(value), (value + n).clamp(MIN_VALUE, MAX_VALUE));
            prop_assert_eq!(Operation::Subtract(n).apply(value), (value - n).clamp(MIN_VALUE, MAX_VALUE));
        }

        #[test]
        fn sqrt_floors_positive_values(value in in_range()) {
            let result = Operation::Sqrt.apply(value);
            if value > 0 {
                prop_assert!(result * result <= value);
                prop_assert!((result + 1) * (result + 1) > value);
            } else {
                prop_assert_eq!(result, value);
            }
        }

        #[test]
        fn modulo_matches_remainder(value in in_range(), divisor in 1_i64..=1000) {
            prop_assert_eq!(Operation::Modulo(divisor).apply(value), value % divisor);
        }

        #[test]
        fn identity_is_idempotent(value in in_range()) {
            let once = Operation::Identity.apply(value);
            prop_assert_eq!(once, value);
            prop_assert_eq!(Operation::Identity.apply(once), value);
        }

        #[test]
        fn lenient_parse_never_panics(token in "\\PC{0,8}", value in in_range()) {
            if let Some(op) = Operation::parse_lenient(&token) {
                let _ = op.apply(value);
            }
        }
    }
}
