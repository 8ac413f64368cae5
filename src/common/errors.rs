//! Error types for network loading and query evaluation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a network definition or answering a query.
///
/// Loading problems are reported eagerly so that a network which loads
/// successfully can always be evaluated without hitting missing data.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The definition file could not be opened or read.
    #[error("could not open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The definition is structurally wrong (bad row, missing CPT, etc.).
    #[error("malformed network{}: {message}", line_suffix(*line))]
    MalformedNetwork {
        line: Option<usize>,
        message: String,
    },

    /// A variable name that the network does not declare.
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    /// A value outside the variable's declared domain.
    #[error("'{value}' is not a value of variable '{variable}'")]
    UnknownValue { variable: String, value: String },

    /// A CPT row was needed but never declared.
    #[error("variable '{variable}' has no probability row for parent values [{key}]")]
    MissingRow { variable: String, key: String },

    /// The parent/child edges contain a cycle through these variables.
    #[error("network contains a cycle through: {}", .0.join(", "))]
    CyclicNetwork(Vec<String>),

    /// The query line could not be understood.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The evidence has probability zero under the network.
    #[error("evidence for query '{0}' has probability zero")]
    ImpossibleEvidence(String),
}

fn line_suffix(line: Option<usize>) -> String {
    match line {
        Some(n) => format!(" (line {})", n),
        None => String::new(),
    }
}

impl NetworkError {
    pub(crate) fn malformed(line: usize, message: impl Into<String>) -> Self {
        NetworkError::MalformedNetwork {
            line: Some(line),
            message: message.into(),
        }
    }

    pub(crate) fn malformed_network(message: impl Into<String>) -> Self {
        NetworkError::MalformedNetwork {
            line: None,
            message: message.into(),
        }
    }

    /// Attaches a line number to a malformed-network error that lacks one.
    pub(crate) fn at_line(self, line: usize) -> Self {
        match self {
            NetworkError::MalformedNetwork {
                line: None,
                message,
            } => NetworkError::MalformedNetwork {
                line: Some(line),
                message,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, NetworkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_includes_line() {
        let err = NetworkError::malformed(12, "row has 3 probabilities, expected 1");
        assert_eq!(
            err.to_string(),
            "malformed network (line 12): row has 3 probabilities, expected 1"
        );

        let err = NetworkError::malformed_network("no CPT section");
        assert_eq!(err.to_string(), "malformed network: no CPT section");
    }

    #[test]
    fn test_cycle_lists_variables() {
        let err = NetworkError::CyclicNetwork(vec!["A".to_string(), "B".to_string()]);
        assert_eq!(err.to_string(), "network contains a cycle through: A, B");
    }
}
