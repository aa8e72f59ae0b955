//! Raw operation tokens attached to grid cells.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::Operation;

/// The text of a cell's operation, such as `+5`, `0.5x` or `sqrt`.
///
/// Tokens are stored verbatim so hand-edited or legacy cells survive a
/// round-trip. Evaluation goes through [`Token::apply`], which never fails.
///
/// # Examples
///
/// ```
/// use gauntlet_core::Token;
///
/// let token = Token::from("%4");
/// assert_eq!(token.apply(10), 2);
/// assert!(token.is_valid());
///
/// assert_eq!(Token::unset().apply(10), 10);
/// assert_eq!(Token::literal(12).literal_value(), Some(12));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Token used for cells that have not been authored yet.
    pub const UNSET: &'static str = "?";

    /// Token used for the goal cell of generated grids.
    pub const NEUTRAL: &'static str = "+0";

    /// Creates an unset (`?`) token.
    #[must_use]
    pub fn unset() -> Self {
        Self(Self::UNSET.to_owned())
    }

    /// Creates the neutral `+0` token.
    #[must_use]
    pub fn neutral() -> Self {
        Self(Self::NEUTRAL.to_owned())
    }

    /// Creates a bare numeric literal, as written on start cells.
    #[must_use]
    pub fn literal(value: i64) -> Self {
        Self(value.to_string())
    }

    /// Returns the token text.
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the operation this token denotes at play time, if any.
    #[must_use]
    pub fn operation(&self) -> Option<Operation> {
        Operation::parse_lenient(&self.0)
    }

    /// Applies this token to `value`.
    ///
    /// See [`apply_op`].
    #[must_use]
    pub fn apply(&self, value: i64) -> i64 {
        apply_op(value, &self.0)
    }

    /// Returns `true` if the token satisfies the strict authoring grammar.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        crate::is_valid_operation(&self.0)
    }

    /// Reads the token as an integer literal (leading whitespace and sign
    /// allowed, trailing text ignored).
    #[must_use]
    pub fn literal_value(&self) -> Option<i64> {
        let s = self.0.trim_start();
        let (negative, rest) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let end = rest
            .bytes()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(rest.len());
        let magnitude = rest[..end].parse::<i64>().ok()?;
        Some(if negative { -magnitude } else { magnitude })
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<Operation> for Token {
    fn from(op: Operation) -> Self {
        Self(op.to_string())
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Applies an operation token to `value`.
///
/// This is total: a token that cannot be interpreted (unknown shape, missing
/// number, remainder by zero, non-finite product) returns `value` unchanged.
/// Successful applications are clamped to
/// [`MIN_VALUE`](crate::MIN_VALUE)`..=`[`MAX_VALUE`](crate::MAX_VALUE).
///
/// # Examples
///
/// ```
/// use gauntlet_core::apply_op;
///
/// assert_eq!(apply_op(10, "-4"), 6);
/// assert_eq!(apply_op(10, "-0.5x"), -5);
/// assert_eq!(apply_op(10, "^2"), 100);
/// assert_eq!(apply_op(10, "=10"), 10);
/// assert_eq!(apply_op(10, "%0"), 10);
/// assert_eq!(apply_op(400, "^2"), 99_999);
/// ```
#[must_use]
pub fn apply_op(value: i64, token: &str) -> i64 {
    match Operation::parse_lenient(token) {
        Some(op) => op.apply(value),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparseable_tokens_are_no_ops() {
        for token in ["?", "", "abc", "+", "-", "%", "x", "12", "2X"] {
            assert_eq!(apply_op(-17, token), -17, "{token:?}");
        }
    }

    #[test]
    fn test_literal_value() {
        assert_eq!(Token::from("17").literal_value(), Some(17));
        assert_eq!(Token::from(" -3").literal_value(), Some(-3));
        assert_eq!(Token::from("42abc").literal_value(), Some(42));
        assert_eq!(Token::from("?").literal_value(), None);
        assert_eq!(Token::from("").literal_value(), None);
    }

    #[test]
    fn test_token_from_operation_uses_canonical_text() {
        assert_eq!(Token::from(Operation::Multiply(0.5)).as_str(), "0.5x");
        assert_eq!(Token::from(Operation::Subtract(9)).as_str(), "-9");
        assert_eq!(Token::from(Operation::Subtract(9)).apply(10), 1);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&Token::neutral()).unwrap();
        assert_eq!(json, r#""+0""#);
    }
}
