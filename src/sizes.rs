//! Size Parser - Declared Size Tokens To Width/Height
//!
//! Accepted notations:
//! - `"WxH"` anywhere in a string
//! - any other string, read as a leading integer (`"48"`, `" 48px"`)
//! - a `[w, h]` pair whose elements are numbers or numeric strings
//! - a bare number
//!
//! The parser never fails. A component that does not read as a number comes
//! back as `None` and the normalizer decides what to do with it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static DIMENSIONS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+)x([0-9]+)").expect("static pattern"));

static LEADING_INT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?[0-9]+)").expect("static pattern"));

/// A resolved rendition size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

impl Dimension {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn square(side: u32) -> Self {
        Self::new(side, side)
    }

    /// `"{w}x{h}"`, as written into the manifest `sizes` field.
    pub fn label(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// One element of a `[w, h]` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeScalar {
    Number(f64),
    Text(String),
}

/// One declared size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeToken {
    Pair(SizeScalar, SizeScalar),
    Number(f64),
    Text(String),
}

/// The `size` / `sizes` field: a single token or a list of them.
///
/// A top-level array is always a list of tokens, so `[48, 96]` is two sizes.
/// A pair has to be nested: `[[512, 384]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeField {
    Many(Vec<SizeToken>),
    One(SizeToken),
}

impl SizeField {
    pub fn into_tokens(self) -> Vec<SizeToken> {
        match self {
            Self::Many(tokens) => tokens,
            Self::One(token) => vec![token],
        }
    }

    /// Whether the field holds a usable value at all. Mirrors how the host
    /// config treats `0` and `""` as absent.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Many(_) => true,
            Self::One(SizeToken::Number(n)) => *n != 0.0 && !n.is_nan(),
            Self::One(SizeToken::Text(s)) => !s.is_empty(),
            Self::One(SizeToken::Pair(..)) => true,
        }
    }
}

impl From<&str> for SizeToken {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<u32> for SizeToken {
    fn from(value: u32) -> Self {
        Self::Number(value as f64)
    }
}

/// Parser output before the square policy and range checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedSize {
    pub width: Option<i64>,
    pub height: Option<i64>,
}

impl ParsedSize {
    fn both(value: Option<i64>) -> Self {
        Self {
            width: value,
            height: value,
        }
    }
}

pub fn parse_size(token: &SizeToken) -> ParsedSize {
    match token {
        SizeToken::Text(text) => match DIMENSIONS_PATTERN.captures(text) {
            Some(caps) => ParsedSize {
                width: caps[1].parse().ok(),
                height: caps[2].parse().ok(),
            },
            None => ParsedSize::both(parse_int(text)),
        },
        SizeToken::Pair(width, height) => ParsedSize {
            width: scalar_value(width),
            height: scalar_value(height),
        },
        SizeToken::Number(n) => ParsedSize::both(number_value(*n)),
    }
}

/// Leading-integer read: optional whitespace and sign, then digits.
/// Anything after the digits is ignored.
pub fn parse_int(text: &str) -> Option<i64> {
    LEADING_INT_PATTERN
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

fn scalar_value(scalar: &SizeScalar) -> Option<i64> {
    match scalar {
        SizeScalar::Number(n) => number_value(*n),
        SizeScalar::Text(text) => parse_int(text),
    }
}

fn number_value(n: f64) -> Option<i64> {
    if !n.is_finite() || n.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(n.trunc() as i64)
}
