use std::fmt;

use serde::Serialize;

/// Decimal places used when no precision is requested.
pub const DEFAULT_PRECISION: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub value: String,
    pub probability: f64,
}

/// Posterior over the query variable's domain, in domain order.
///
/// Displays as `P(v1) = p1, P(v2) = p2, ...`; a precision in the format
/// string (`{:.2}`) sets the number of decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub variable: String,
    #[serde(rename = "distribution")]
    pub outcomes: Vec<Outcome>,
}

impl Distribution {
    pub fn new<I, V>(variable: impl Into<String>, outcomes: I) -> Self
    where
        I: IntoIterator<Item = (V, f64)>,
        V: Into<String>,
    {
        Distribution {
            variable: variable.into(),
            outcomes: outcomes
                .into_iter()
                .map(|(value, probability)| Outcome {
                    value: value.into(),
                    probability,
                })
                .collect(),
        }
    }

    /// All mass on `domain[observed]`.
    pub fn point_mass(variable: impl Into<String>, domain: &[String], observed: usize) -> Self {
        Distribution::new(
            variable,
            domain
                .iter()
                .enumerate()
                .map(|(i, value)| (value.as_str(), if i == observed { 1.0 } else { 0.0 })),
        )
    }

    pub fn probability(&self, value: &str) -> Option<f64> {
        self.outcomes
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.probability)
    }

    pub fn probabilities(&self) -> Vec<f64> {
        self.outcomes.iter().map(|o| o.probability).collect()
    }

    pub fn total(&self) -> f64 {
        self.outcomes.iter().map(|o| o.probability).sum()
    }

    /// Value with the highest probability (first one on ties).
    pub fn most_likely(&self) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .reduce(|best, o| if o.probability > best.probability { o } else { best })
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(DEFAULT_PRECISION);
        for (i, outcome) in self.outcomes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "P({}) = {:.*}", outcome.value, precision, outcome.probability)?;
        }
        Ok(())
    }
}
