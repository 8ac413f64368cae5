//! Reader for the three-section network definition format.
//!
//! ```text
//! A true false            <- variables and their domains
//! B true false
//! # edges
//! B A                     <- child followed by its parents
//! # tables
//! A                       <- header naming the variable
//! 0.3                     <- root row: all probabilities but the last
//! B
//! true 0.8                <- parent values, then probabilities
//! false 0.1
//! ```
//!
//! Every line starting with `#` moves on to the next section.

use std::fs;
use std::path::Path;

use log::{debug, info, warn};

use crate::common::errors::{NetworkError, Result};

use super::cpt::is_probability_token;
use super::network::{BayesianNetwork, NetworkBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Variables,
    Edges,
    Tables,
    Trailing,
}

impl Section {
    fn next(self) -> Self {
        match self {
            Section::Variables => Section::Edges,
            Section::Edges => Section::Tables,
            Section::Tables | Section::Trailing => Section::Trailing,
        }
    }
}

pub fn load_file(path: &Path) -> Result<BayesianNetwork> {
    info!("loading network from {}", path.display());
    let text = fs::read_to_string(path).map_err(|source| NetworkError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_definition(&text)
}

pub fn parse_definition(text: &str) -> Result<BayesianNetwork> {
    let mut builder = NetworkBuilder::new();
    let mut section = Section::Variables;
    let mut current: Option<String> = None;
    let mut warned_trailing = false;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.starts_with('#') {
            section = section.next();
            debug!("line {}: entering {:?} section", line_no, section);
            continue;
        }
        if line.is_empty() {
            continue;
        }

        match section {
            Section::Variables => {
                let mut tokens = line.split_whitespace();
                if let Some(name) = tokens.next() {
                    builder
                        .add_variable(name, tokens)
                        .map_err(|e| e.at_line(line_no))?;
                }
            }
            Section::Edges => {
                let mut tokens = line.split_whitespace();
                if let Some(child) = tokens.next() {
                    for parent in tokens {
                        builder
                            .add_edge(child, parent)
                            .map_err(|e| e.at_line(line_no))?;
                    }
                }
            }
            Section::Tables => {
                if is_header(line) {
                    if !builder.contains(line) {
                        return Err(NetworkError::malformed(
                            line_no,
                            format!("probability header names unknown variable '{}'", line),
                        ));
                    }
                    current = Some(line.to_string());
                } else {
                    let variable = current.as_deref().ok_or_else(|| {
                        NetworkError::malformed(line_no, "probability row before any variable header")
                    })?;
                    builder
                        .add_cpt_row(variable, line)
                        .map_err(|e| e.at_line(line_no))?;
                }
            }
            Section::Trailing => {
                if !warned_trailing {
                    warn!("ignoring lines after the probability section (from line {})", line_no);
                    warned_trailing = true;
                }
            }
        }
    }

    builder.build()
}

/// Header lines name a variable; rows always carry at least one probability.
fn is_header(line: &str) -> bool {
    !line.split_whitespace().any(is_probability_token)
}
