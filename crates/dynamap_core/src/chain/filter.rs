//! Filter expressions for scan and query chains.
//!
//! # Responsibility
//! - Carry an expression string plus bound placeholder values.
//! - Merge conditions with logical AND, disambiguating placeholders.
//! - Parse the equality-conjunction grammar used for client-side
//!   evaluation and key-condition resolution.
//!
//! # Invariants
//! - Merging never replaces prior conditions; it always narrows.
//! - Supported grammar: `field = :placeholder` segments joined by `AND`
//!   (case-insensitive).

use crate::model::value::{Item, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EQUALITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_.]*)\s*=\s*:([A-Za-z_][A-Za-z0-9_]*)\s*$")
        .expect("valid equality regex")
});
static AND_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+and\s+").expect("valid conjunction regex"));

/// Error raised when an expression does not follow the supported grammar.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParseError {
    expression: String,
    reason: String,
}

impl FilterParseError {
    fn new(expression: &str, reason: impl Into<String>) -> Self {
        Self {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }
}

impl Display for FilterParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported filter expression `{}`: {}",
            self.expression, self.reason
        )
    }
}

impl Error for FilterParseError {}

/// Accumulated filter: expression string plus bound values.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpression {
    expression: String,
    values: BTreeMap<String, Value>,
}

impl FilterExpression {
    /// Builds a single equality condition, `field = :placeholder`.
    pub fn equality(field: &str, value: impl Into<Value>) -> Self {
        let placeholder = field.replace('.', "_");
        let mut values = BTreeMap::new();
        values.insert(placeholder.clone(), value.into());
        Self {
            expression: format!("{field} = :{placeholder}"),
            values,
        }
    }

    /// Builds from a caller-supplied expression string with bound values.
    pub fn with_values<K, V, I>(expression: impl Into<String>, values: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            expression: expression.into(),
            values: values
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Merges `other` into `self` with logical AND.
    ///
    /// Placeholders of `other` colliding with existing ones are renamed
    /// with a numeric suffix, rewriting the merged expression to match.
    pub fn and(mut self, other: Self) -> Self {
        let mut other_expression = other.expression;
        for (name, value) in other.values {
            let bound_name = if self.values.contains_key(&name) {
                let fresh = fresh_placeholder(&self.values, &name);
                other_expression = rename_placeholder(&other_expression, &name, &fresh);
                fresh
            } else {
                name
            };
            self.values.insert(bound_name, value);
        }
        self.expression = format!("{} AND {}", self.expression, other_expression);
        self
    }

    /// Resolves the expression into `(field, value)` equality pairs.
    pub fn equalities(&self) -> Result<Vec<(String, Value)>, FilterParseError> {
        let mut pairs = Vec::new();
        for segment in AND_SPLIT_RE.split(&self.expression) {
            let captures = EQUALITY_RE.captures(segment).ok_or_else(|| {
                FilterParseError::new(&self.expression, "expected `field = :placeholder`")
            })?;
            let field = captures[1].to_string();
            let placeholder = &captures[2];
            let value = self.values.get(placeholder).ok_or_else(|| {
                FilterParseError::new(
                    &self.expression,
                    format!("no value bound for placeholder `:{placeholder}`"),
                )
            })?;
            pairs.push((field, value.clone()));
        }
        Ok(pairs)
    }

    /// Evaluates the expression against a flat item.
    pub fn matches(&self, item: &Item) -> Result<bool, FilterParseError> {
        for (field, expected) in self.equalities()? {
            if item.get(&field) != Some(&expected) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn fresh_placeholder(values: &BTreeMap<String, Value>, name: &str) -> String {
    let mut suffix = 2;
    loop {
        let candidate = format!("{name}_{suffix}");
        if !values.contains_key(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

fn rename_placeholder(expression: &str, from: &str, to: &str) -> String {
    let pattern = Regex::new(&format!(":{}\\b", regex::escape(from)))
        .expect("valid placeholder rename regex");
    pattern.replace_all(expression, format!(":{to}")).into_owned()
}
