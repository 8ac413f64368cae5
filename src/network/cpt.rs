use std::fmt;

use log::trace;

use crate::common::errors::{NetworkError, Result};
use crate::table::KeyedTable;

/// Table key used for variables without parents.
pub const ROOT_KEY: &str = "NULL";

/// Tolerance when checking that declared probabilities leave room for the
/// synthesized last entry.
pub const PROBABILITY_EPSILON: f64 = 1e-9;

/// The parents' values, in parent-declaration order, selecting one CPT row.
///
/// Rows are stored in a string-keyed table, so the key is encoded with a
/// length prefix per value: `("a", "bc")` becomes `1:a2:bc` and can never
/// collide with `("ab", "c")`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ParentKey(Vec<String>);

impl ParentKey {
    /// Key of a variable with no parents.
    pub fn root() -> Self {
        ParentKey(Vec::new())
    }

    pub fn new<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        ParentKey(values.into_iter().map(Into::into).collect())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, value: impl Into<String>) {
        self.0.push(value.into());
    }

    /// Unambiguous string form used as the table key.
    pub fn encode(&self) -> String {
        if self.is_root() {
            return ROOT_KEY.to_string();
        }
        self.0
            .iter()
            .map(|value| format!("{}:{}", value.len(), value))
            .collect()
    }
}

impl fmt::Display for ParentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "{}", ROOT_KEY)
        } else {
            write!(f, "{}", self.0.join(" "))
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Row {
    key: ParentKey,
    probabilities: Vec<f64>,
}

/// Conditional probabilities of one variable: for each parent assignment,
/// one probability per domain value, in domain order.
#[derive(Debug, Clone, Default)]
pub struct ConditionalProbabilityTable {
    rows: KeyedTable<Row>,
}

impl ConditionalProbabilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `probability` to the row stored under `key`.
    pub fn add(&mut self, key: &ParentKey, probability: f64) {
        let row = self.rows.find_or_insert(&key.encode());
        if row.probabilities.is_empty() {
            row.key = key.clone();
        }
        row.probabilities.push(probability);
    }

    /// Parses one textual row such as `true false 0.2 0.5`.
    ///
    /// Tokens containing a decimal point are probabilities, every token before
    /// them is a parent value. The final probability is not written in the
    /// row; it is appended as `1 - sum(declared)` so the row sums to one.
    pub fn build_from_row(&mut self, line: &str) -> Result<ParentKey> {
        let mut key = ParentKey::root();
        let mut declared = Vec::new();

        for token in line.split_whitespace() {
            if is_probability_token(token) {
                let probability: f64 = token.parse().map_err(|_| {
                    NetworkError::malformed_network(format!("'{}' is not a probability", token))
                })?;
                if !(0.0..=1.0).contains(&probability) {
                    return Err(NetworkError::malformed_network(format!(
                        "probability {} is outside [0, 1]",
                        token
                    )));
                }
                declared.push(probability);
            } else if declared.is_empty() {
                key.push(token);
            } else {
                return Err(NetworkError::malformed_network(format!(
                    "parent value '{}' follows a probability",
                    token
                )));
            }
        }

        if declared.is_empty() {
            return Err(NetworkError::malformed_network(format!(
                "row '{}' declares no probabilities",
                line.trim()
            )));
        }
        if self.rows.contains_key(&key.encode()) {
            return Err(NetworkError::malformed_network(format!(
                "duplicate row for parent values [{}]",
                key
            )));
        }

        let total: f64 = declared.iter().sum();
        if total > 1.0 + PROBABILITY_EPSILON {
            return Err(NetworkError::malformed_network(format!(
                "probabilities for [{}] sum to {} which exceeds 1",
                key, total
            )));
        }

        for probability in &declared {
            self.add(&key, *probability);
        }
        self.add(&key, (1.0 - total).max(0.0));
        trace!("cpt row [{}] -> {:?}", key, self.row(&key));
        Ok(key)
    }

    /// `P(value at domain_index | parents = key)`, or `None` when the row or
    /// the index does not exist.
    pub fn probability(&self, key: &ParentKey, domain_index: usize) -> Option<f64> {
        self.row(key)?.get(domain_index).copied()
    }

    pub fn row(&self, key: &ParentKey) -> Option<&[f64]> {
        self.rows
            .lookup(&key.encode())
            .map(|row| row.probabilities.as_slice())
    }

    /// All rows, in table order.
    pub fn rows(&self) -> impl Iterator<Item = (&ParentKey, &[f64])> {
        self.rows
            .values()
            .map(|row| (&row.key, row.probabilities.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A token is a probability when it contains a decimal point.
pub fn is_probability_token(token: &str) -> bool {
    token.contains('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_row_synthesizes_last_probability() {
        let mut cpt = ConditionalProbabilityTable::new();
        let key = cpt.build_from_row("0.3").unwrap();
        assert!(key.is_root());
        assert_eq!(key.encode(), ROOT_KEY);
        assert_eq!(cpt.probability(&key, 0), Some(0.3));
        assert!((cpt.probability(&key, 1).unwrap() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_parent_tokens_form_key() {
        let mut cpt = ConditionalProbabilityTable::new();
        cpt.build_from_row("true false 0.2 0.5").unwrap();
        let key = ParentKey::new(["true", "false"]);
        let row = cpt.row(&key).unwrap();
        assert_eq!(row.len(), 3);
        assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(cpt.row(&ParentKey::new(["false", "true"])).is_none());
    }

    #[test]
    fn test_keys_do_not_collide_on_concatenation() {
        let mut cpt = ConditionalProbabilityTable::new();
        cpt.build_from_row("a bc 0.1").unwrap();
        cpt.build_from_row("ab c 0.9").unwrap();
        assert_eq!(cpt.len(), 2);
        assert_eq!(cpt.probability(&ParentKey::new(["a", "bc"]), 0), Some(0.1));
        assert_eq!(cpt.probability(&ParentKey::new(["ab", "c"]), 0), Some(0.9));
    }

    #[test]
    fn test_missing_row_is_none() {
        let cpt = ConditionalProbabilityTable::new();
        assert_eq!(cpt.probability(&ParentKey::root(), 0), None);
    }

    #[test]
    fn test_rejects_overfull_row() {
        let mut cpt = ConditionalProbabilityTable::new();
        let err = cpt.build_from_row("x 0.7 0.6").unwrap_err();
        assert!(matches!(err, NetworkError::MalformedNetwork { .. }));
        assert!(cpt.is_empty());
    }

    #[test]
    fn test_rejects_duplicate_and_misplaced_tokens() {
        let mut cpt = ConditionalProbabilityTable::new();
        cpt.build_from_row("x 0.5").unwrap();
        assert!(cpt.build_from_row("x 0.4").is_err());
        assert!(cpt.build_from_row("0.4 y").is_err());
        assert!(cpt.build_from_row("y 1.x").is_err());
        assert!(cpt.build_from_row("y").is_err());
    }

    #[test]
    fn test_exact_one_leaves_zero() {
        let mut cpt = ConditionalProbabilityTable::new();
        let key = cpt.build_from_row("0.5 0.5").unwrap();
        assert_eq!(cpt.row(&key), Some(&[0.5, 0.5, 0.0][..]));
    }
}
