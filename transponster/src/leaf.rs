// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scalar leaf types: the registry rows that give attribute and text values
//! their grammar and their validity constraints.
//!
//! A [`Leaf`] is pure data: a name for diagnostics plus a [`LeafKind`]
//! carrying range bounds, an anchored pattern, a length cap, or an enum
//! table. The engine interprets the row; no leaf type carries code of its
//! own, so a dialect's whole scalar vocabulary reads as a table.

use regex::Regex;

use crate::enums::EnumTable;

/// A dynamically-typed scalar value extracted from (or destined for) a
/// single attribute or text node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    Bool(bool),
    Unsigned(u64),
    Signed(i64),
    Text(String),

    /// A discriminant from the leaf's [`EnumTable`].
    Enum(usize),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_unsigned(&self) -> Option<u64> {
        match self {
            Value::Unsigned(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_signed(&self) -> Option<i64> {
        match self {
            Value::Signed(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<usize> {
        match self {
            Value::Enum(d) => Some(*d),
            _ => None,
        }
    }
}

/// Why a leaf rejected its input text.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LeafError {
    /// The text doesn't match the kind's grammar at all.
    Lexical,

    /// The text parsed but failed the row's range/pattern/table check.
    Semantic,
}

/// One row of a dialect's scalar registry.
#[derive(Debug)]
pub struct Leaf {
    name: &'static str,
    kind: LeafKind,
}

#[derive(Debug)]
pub enum LeafKind {
    Bool,
    Unsigned { min: u64, max: u64 },
    Signed { min: i64, max: i64 },
    Token {
        pattern: Option<Regex>,
        max_len: Option<usize>,
    },
    Enumerated(EnumTable),
}

impl Leaf {
    pub fn boolean(name: &'static str) -> Self {
        Self {
            name,
            kind: LeafKind::Bool,
        }
    }

    pub fn unsigned(name: &'static str, min: u64, max: u64) -> Self {
        Self {
            name,
            kind: LeafKind::Unsigned { min, max },
        }
    }

    pub fn signed(name: &'static str, min: i64, max: i64) -> Self {
        Self {
            name,
            kind: LeafKind::Signed { min, max },
        }
    }

    /// An unconstrained string.
    pub fn token(name: &'static str) -> Self {
        Self {
            name,
            kind: LeafKind::Token {
                pattern: None,
                max_len: None,
            },
        }
    }

    /// A string constrained by `pattern`, which must match the whole value.
    ///
    /// Panics on an invalid pattern; rows are static declarations, so this is
    /// a programming error caught by any test that builds the registry.
    pub fn pattern(name: &'static str, pattern: &str) -> Self {
        let anchored = format!(r"\A(?:{})\z", pattern);
        Self {
            name,
            kind: LeafKind::Token {
                pattern: Some(Regex::new(&anchored).expect("invalid leaf pattern")),
                max_len: None,
            },
        }
    }

    /// A string capped at `max_len` characters.
    pub fn max_len(name: &'static str, max_len: usize) -> Self {
        Self {
            name,
            kind: LeafKind::Token {
                pattern: None,
                max_len: Some(max_len),
            },
        }
    }

    pub fn enumerated(name: &'static str, table: EnumTable) -> Self {
        Self {
            name,
            kind: LeafKind::Enumerated(table),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> &LeafKind {
        &self.kind
    }

    /// Parses raw document text into a [`Value`] without range checking.
    ///
    /// All kinds but `Token` collapse whitespace first, so indented element
    /// text like `"\n  512\n"` reads as `"512"`. `Token` values pass through
    /// verbatim.
    pub fn parse(&self, text: &str) -> Result<Value, LeafError> {
        match &self.kind {
            LeafKind::Bool => match collapse(text).as_str() {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                _ => Err(LeafError::Lexical),
            },
            LeafKind::Unsigned { .. } => {
                let text = collapse(text);
                parse_unsigned(&text).map(Value::Unsigned)
            }
            LeafKind::Signed { .. } => {
                let text = collapse(text);
                parse_signed(&text).map(Value::Signed)
            }
            LeafKind::Token { .. } => Ok(Value::Text(text.to_owned())),
            LeafKind::Enumerated(table) => table
                .parse(&collapse(text))
                .map(Value::Enum)
                .ok_or(LeafError::Semantic),
        }
    }

    /// Checks a value against this row's constraints. A value of the wrong
    /// variant is invalid, not a panic.
    pub fn validate(&self, value: &Value) -> bool {
        match (&self.kind, value) {
            (LeafKind::Bool, Value::Bool(_)) => true,
            (LeafKind::Unsigned { min, max }, Value::Unsigned(v)) => min <= v && v <= max,
            (LeafKind::Signed { min, max }, Value::Signed(v)) => min <= v && v <= max,
            (LeafKind::Token { pattern, max_len }, Value::Text(t)) => {
                if let Some(p) = pattern {
                    if !p.is_match(t) {
                        return false;
                    }
                }
                if let Some(n) = max_len {
                    if t.chars().count() > *n {
                        return false;
                    }
                }
                true
            }
            (LeafKind::Enumerated(table), Value::Enum(d)) => table.contains(*d),
            _ => false,
        }
    }

    /// Parses and validates in one step, as the consume engine does.
    pub fn read(&self, text: &str) -> Result<Value, LeafError> {
        let value = self.parse(text)?;
        if self.validate(&value) {
            Ok(value)
        } else {
            Err(LeafError::Semantic)
        }
    }

    /// Renders a value as canonical document text.
    ///
    /// Returns `None` when the value fails [`Leaf::validate`]; the produce
    /// engine turns that into an invalid-state error before emitting
    /// anything.
    pub fn generate(&self, value: &Value) -> Option<String> {
        if !self.validate(value) {
            return None;
        }
        match (&self.kind, value) {
            (LeafKind::Bool, Value::Bool(b)) => {
                Some(if *b { "true" } else { "false" }.to_owned())
            }
            (LeafKind::Unsigned { .. }, Value::Unsigned(v)) => Some(v.to_string()),
            (LeafKind::Signed { .. }, Value::Signed(v)) => Some(v.to_string()),
            (LeafKind::Token { .. }, Value::Text(t)) => Some(t.clone()),
            (LeafKind::Enumerated(table), Value::Enum(d)) => {
                table.generate(*d).map(str::to_owned)
            }
            _ => None,
        }
    }
}

/// XML Schema-style whitespace collapse: runs of space, tab, CR, and LF
/// become a single space, with leading and trailing runs removed.
fn collapse(text: &str) -> String {
    text.split([' ', '\t', '\r', '\n'])
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_unsigned(text: &str) -> Result<u64, LeafError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LeafError::Lexical);
    }
    text.parse().map_err(|_| LeafError::Semantic)
}

fn parse_signed(text: &str) -> Result<i64, LeafError> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LeafError::Lexical);
    }
    text.parse().map_err(|_| LeafError::Semantic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn range_bounds() {
        let port = Leaf::signed("port", 1, 65_535);
        assert_eq!(port.read("80"), Ok(Value::Signed(80)));
        assert_eq!(port.read("65535"), Ok(Value::Signed(65_535)));
        assert_eq!(port.read("0"), Err(LeafError::Semantic));
        assert_eq!(port.read("65536"), Err(LeafError::Semantic));
        assert_eq!(port.read("8 0"), Err(LeafError::Lexical));
        assert_eq!(port.read("0x50"), Err(LeafError::Lexical));
    }

    #[test]
    fn signed_allows_negative() {
        let port_number = Leaf::signed("port number", -1, 65_535);
        assert_eq!(port_number.read("-1"), Ok(Value::Signed(-1)));
        assert_eq!(port_number.read("-2"), Err(LeafError::Semantic));
        assert_eq!(port_number.read("--1"), Err(LeafError::Lexical));
    }

    #[test]
    fn whitespace_collapse() {
        let mem = Leaf::unsigned("memory", 0, u64::MAX);
        assert_eq!(mem.read("\n    524288\n  "), Ok(Value::Unsigned(524_288)));
        assert_eq!(mem.read("52 4288"), Err(LeafError::Lexical));
    }

    #[test]
    fn pattern_row() {
        let mac = Leaf::pattern("MAC address", "[a-fA-F0-9]{2}(:[a-fA-F0-9]{2}){5}");
        assert_matches!(mac.read("52:54:00:9d:01:aa"), Ok(Value::Text(_)));
        assert_eq!(mac.read("52:54:00:9d:01"), Err(LeafError::Semantic));
        assert_eq!(mac.read("52:54:00:9d:01:zz"), Err(LeafError::Semantic));
        // Anchored: a valid MAC inside junk is not a match.
        assert_eq!(mac.read("x52:54:00:9d:01:aa"), Err(LeafError::Semantic));
    }

    #[test]
    fn max_len_counts_chars() {
        let profile = Leaf::max_len("port profile", 4);
        assert_matches!(profile.read("abcd"), Ok(_));
        assert_eq!(profile.read("abcde"), Err(LeafError::Semantic));
    }

    #[test]
    fn enumerated_row() {
        let table = EnumTable::new(&[(0, "hvm"), (1, "linux"), (2, "exe")]);
        let os_type = Leaf::enumerated("os type", table);
        assert_eq!(os_type.read("linux"), Ok(Value::Enum(1)));
        assert_eq!(os_type.read("windows"), Err(LeafError::Semantic));
        assert_eq!(os_type.generate(&Value::Enum(2)), Some("exe".to_owned()));
        assert_eq!(os_type.generate(&Value::Enum(9)), None);
    }

    #[test]
    fn generate_rejects_out_of_range() {
        let vcpu = Leaf::unsigned("vcpu count", 1, 4096);
        assert_eq!(vcpu.generate(&Value::Unsigned(2)), Some("2".to_owned()));
        assert_eq!(vcpu.generate(&Value::Unsigned(0)), None);
        assert_eq!(vcpu.generate(&Value::Text("2".to_owned())), None);
    }

    #[test]
    fn bool_canonical_form() {
        let b = Leaf::boolean("flag");
        assert_eq!(b.read("1"), Ok(Value::Bool(true)));
        assert_eq!(b.read("false"), Ok(Value::Bool(false)));
        assert_eq!(b.read("yes"), Err(LeafError::Lexical));
        assert_eq!(b.generate(&Value::Bool(true)), Some("true".to_owned()));
    }
}
