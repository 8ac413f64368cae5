use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use log::{info, warn};

use crate::common::errors::{NetworkError, Result};
use crate::table::KeyedTable;

use super::cpt::ParentKey;
use super::loader;
use super::variable::Variable;

/// A discrete Bayesian network: variables keyed by name plus the order in
/// which they were declared.
///
/// The network is read-only once built. Enumeration walks the variables in
/// `evaluation_order`, which is the declaration order whenever that order
/// already lists every parent before its children.
#[derive(Debug, Clone)]
pub struct BayesianNetwork {
    variables: KeyedTable<Variable>,
    declaration_order: Vec<String>,
    evaluation_order: Vec<String>,
}

impl BayesianNetwork {
    pub fn builder() -> NetworkBuilder {
        NetworkBuilder::new()
    }

    /// Loads a network from a definition file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        loader::load_file(path.as_ref())
    }

    /// Parses a network from definition text.
    pub fn from_definition(text: &str) -> Result<Self> {
        loader::parse_definition(text)
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.lookup(name)
    }

    /// Like `get`, but an unknown name is an error.
    pub fn variable(&self, name: &str) -> Result<&Variable> {
        self.get(name)
            .ok_or_else(|| NetworkError::UnknownVariable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.declaration_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declaration_order.is_empty()
    }

    pub fn declaration_order(&self) -> &[String] {
        &self.declaration_order
    }

    /// Parents-first order used by inference.
    pub fn evaluation_order(&self) -> &[String] {
        &self.evaluation_order
    }

    /// Variables in evaluation order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.evaluation_order
            .iter()
            .filter_map(|name| self.variables.lookup(name))
    }

    pub fn edge_count(&self) -> usize {
        self.variables().map(|v| v.parents().len()).sum()
    }

    pub fn row_count(&self) -> usize {
        self.variables().map(|v| v.cpt().len()).sum()
    }
}

impl FromStr for BayesianNetwork {
    type Err = NetworkError;

    fn from_str(text: &str) -> Result<Self> {
        Self::from_definition(text)
    }
}

/// Assembles a network piece by piece and validates it in `build`.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    variables: KeyedTable<Variable>,
    declaration_order: Vec<String>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_variable<I, V>(&mut self, name: &str, domain: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        if self.variables.contains_key(name) {
            return Err(NetworkError::malformed_network(format!(
                "variable '{}' is declared twice",
                name
            )));
        }
        let variable = Variable::new(name, domain);
        if variable.domain_size() < 2 {
            return Err(NetworkError::malformed_network(format!(
                "variable '{}' needs at least two values",
                name
            )));
        }
        let duplicate = {
            let mut seen = HashSet::new();
            variable
                .domain()
                .iter()
                .find(|v| !seen.insert(v.as_str()))
                .cloned()
        };
        if let Some(duplicate) = duplicate {
            return Err(NetworkError::malformed_network(format!(
                "variable '{}' lists value '{}' twice",
                name, duplicate
            )));
        }

        self.variables.insert(name, variable);
        self.declaration_order.push(name.to_string());
        Ok(self)
    }

    /// Registers `parent -> child` on both ends.
    pub fn add_edge(&mut self, child: &str, parent: &str) -> Result<&mut Self> {
        if child == parent {
            return Err(NetworkError::CyclicNetwork(vec![child.to_string()]));
        }
        if !self.variables.contains_key(parent) {
            return Err(NetworkError::UnknownVariable(parent.to_string()));
        }
        let child_var = self
            .variables
            .lookup_mut(child)
            .ok_or_else(|| NetworkError::UnknownVariable(child.to_string()))?;
        if child_var.parents().iter().any(|p| p == parent) {
            return Err(NetworkError::malformed_network(format!(
                "'{}' is listed twice as a parent of '{}'",
                parent, child
            )));
        }
        child_var.add_parent(parent);
        if let Some(parent_var) = self.variables.lookup_mut(parent) {
            parent_var.add_child(child);
        }
        Ok(self)
    }

    /// Adds one textual CPT row (see `ConditionalProbabilityTable::build_from_row`).
    pub fn add_cpt_row(&mut self, variable: &str, row: &str) -> Result<ParentKey> {
        self.variables
            .lookup_mut(variable)
            .ok_or_else(|| NetworkError::UnknownVariable(variable.to_string()))?
            .cpt_mut()
            .build_from_row(row)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Checks every CPT against the structure and fixes the evaluation order.
    pub fn build(self) -> Result<BayesianNetwork> {
        for name in &self.declaration_order {
            let variable = self.variables.lookup(name).ok_or_else(|| {
                NetworkError::UnknownVariable(name.to_string())
            })?;
            self.check_cpt(variable)?;
        }

        let evaluation_order = self.topological_order()?;
        if evaluation_order != self.declaration_order {
            warn!(
                "declaration order lists a child before its parent; evaluating as {:?}",
                evaluation_order
            );
        }

        let network = BayesianNetwork {
            variables: self.variables,
            declaration_order: self.declaration_order,
            evaluation_order,
        };
        info!(
            "loaded network: {} variables, {} edges, {} probability rows",
            network.len(),
            network.edge_count(),
            network.row_count()
        );
        Ok(network)
    }

    fn parent_domains<'a>(&'a self, variable: &'a Variable) -> Result<Vec<&'a Variable>> {
        variable
            .parents()
            .iter()
            .map(|p| {
                self.variables
                    .lookup(p)
                    .ok_or_else(|| NetworkError::UnknownVariable(p.to_string()))
            })
            .collect()
    }

    fn check_cpt(&self, variable: &Variable) -> Result<()> {
        let name = variable.name();
        let parents = self.parent_domains(variable)?;

        for (key, row) in variable.cpt().rows() {
            if key.len() != parents.len() {
                return Err(NetworkError::malformed_network(format!(
                    "row [{}] of '{}' names {} parent values, expected {}",
                    key,
                    name,
                    key.len(),
                    parents.len()
                )));
            }
            for (value, parent) in key.values().iter().zip(&parents) {
                if parent.index_of(value).is_none() {
                    return Err(NetworkError::UnknownValue {
                        variable: parent.name().to_string(),
                        value: value.clone(),
                    });
                }
            }
            if row.len() != variable.domain_size() {
                return Err(NetworkError::malformed_network(format!(
                    "row [{}] of '{}' has {} probabilities, expected {}",
                    key,
                    name,
                    row.len() - 1,
                    variable.domain_size() - 1
                )));
            }
        }

        let expected: usize = parents.iter().map(|p| p.domain_size()).product();
        if variable.cpt().len() < expected {
            let missing = first_missing_key(variable, &parents);
            return Err(NetworkError::MissingRow {
                variable: name.to_string(),
                key: missing.to_string(),
            });
        }
        Ok(())
    }

    /// Declaration order with children pushed after their parents. Equal to
    /// the declaration order when that is already topological.
    fn topological_order(&self) -> Result<Vec<String>> {
        let mut placed: HashSet<&str> = HashSet::new();
        let mut remaining: Vec<&str> = self.declaration_order.iter().map(String::as_str).collect();
        let mut order = Vec::with_capacity(remaining.len());

        while !remaining.is_empty() {
            let ready = remaining.iter().position(|name| {
                self.variables
                    .lookup(name)
                    .map(|v| v.parents().iter().all(|p| placed.contains(p.as_str())))
                    .unwrap_or(false)
            });
            match ready {
                Some(index) => {
                    let name = remaining.remove(index);
                    placed.insert(name);
                    order.push(name.to_string());
                }
                None => {
                    return Err(NetworkError::CyclicNetwork(
                        remaining.iter().map(|s| s.to_string()).collect(),
                    ));
                }
            }
        }
        Ok(order)
    }
}

/// First parent-value combination, in domain order, with no CPT row.
fn first_missing_key(variable: &Variable, parents: &[&Variable]) -> ParentKey {
    let mut digits = vec![0usize; parents.len()];
    loop {
        let key = ParentKey::new(
            digits
                .iter()
                .zip(parents)
                .map(|(&d, parent)| parent.domain()[d].clone()),
        );
        if variable.cpt().row(&key).is_none() {
            return key;
        }
        // advance the odometer, rightmost parent fastest
        let mut position = digits.len();
        loop {
            if position == 0 {
                return key;
            }
            position -= 1;
            digits[position] += 1;
            if digits[position] < parents[position].domain_size() {
                break;
            }
            digits[position] = 0;
        }
    }
}
