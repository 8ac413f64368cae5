use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::errors::NetworkError;

/// One piece of evidence: `variable = value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub variable: String,
    pub value: String,
}

impl Observation {
    pub fn new(variable: impl Into<String>, value: impl Into<String>) -> Self {
        Observation {
            variable: variable.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.variable, self.value)
    }
}

/// "Distribution of `variable` given `evidence`".
///
/// Parsed from lines of the form `Q | A = a , B = b`; the `|` part is
/// optional and spacing around `|`, `=` and `,` does not matter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub variable: String,
    pub evidence: Vec<Observation>,
}

impl Query {
    pub fn new(variable: impl Into<String>) -> Self {
        Query {
            variable: variable.into(),
            evidence: Vec::new(),
        }
    }

    pub fn given(mut self, variable: impl Into<String>, value: impl Into<String>) -> Self {
        self.evidence.push(Observation::new(variable, value));
        self
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.variable)?;
        for (i, observation) in self.evidence.iter().enumerate() {
            let separator = if i == 0 { " | " } else { ", " };
            write!(f, "{}{}", separator, observation)?;
        }
        Ok(())
    }
}

impl FromStr for Query {
    type Err = NetworkError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (head, tail) = match line.split_once('|') {
            Some((head, tail)) => (head, Some(tail)),
            None => (line, None),
        };

        let mut query = Query::new(single_token(head, "query variable")?);
        if let Some(tail) = tail {
            for clause in tail.split(',').map(str::trim).filter(|c| !c.is_empty()) {
                let (variable, value) = clause.split_once('=').ok_or_else(|| {
                    NetworkError::InvalidQuery(format!("expected 'variable = value', got '{}'", clause))
                })?;
                query.evidence.push(Observation::new(
                    single_token(variable, "evidence variable")?,
                    single_token(value, "evidence value")?,
                ));
            }
            if query.evidence.is_empty() {
                return Err(NetworkError::InvalidQuery(
                    "'|' must be followed by evidence".to_string(),
                ));
            }
        }
        Ok(query)
    }
}

fn single_token<'a>(text: &'a str, what: &str) -> Result<&'a str, NetworkError> {
    let mut tokens = text.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(token), None) => Ok(token),
        (None, _) => Err(NetworkError::InvalidQuery(format!("missing {}", what))),
        (Some(_), Some(_)) => Err(NetworkError::InvalidQuery(format!(
            "{} '{}' must be a single word",
            what,
            text.trim()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_variable() {
        let query: Query = "  Burglary ".parse().unwrap();
        assert_eq!(query, Query::new("Burglary"));
    }

    #[test]
    fn test_parse_evidence_with_loose_spacing() {
        let query: Query = "Burglary | JohnCalls = true , MaryCalls=true,".parse().unwrap();
        assert_eq!(
            query,
            Query::new("Burglary")
                .given("JohnCalls", "true")
                .given("MaryCalls", "true")
        );
        assert_eq!(query.to_string(), "Burglary | JohnCalls = true, MaryCalls = true");
    }

    #[test]
    fn test_parse_errors() {
        for line in ["", "A B", "A |", "A | B", "A | B = ", "A | = x", "A | B = x y"] {
            assert!(
                matches!(line.parse::<Query>(), Err(NetworkError::InvalidQuery(_))),
                "line {:?} should be rejected",
                line
            );
        }
    }
}
