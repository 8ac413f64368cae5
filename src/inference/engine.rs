use std::collections::HashMap;

use log::{debug, trace};

use crate::common::errors::{NetworkError, Result};
use crate::network::{BayesianNetwork, ParentKey, Variable};

use super::assignment::Assignment;
use super::distribution::Distribution;
use super::query::{Observation, Query};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumerationOptions {
    /// Skip unobserved variables without children instead of summing over
    /// them. Their rows sum to one and nothing later conditions on them, so
    /// the result is unchanged.
    pub prune_unobserved_leaves: bool,
}

impl Default for EnumerationOptions {
    fn default() -> Self {
        EnumerationOptions {
            prune_unobserved_leaves: true,
        }
    }
}

/// Exact inference by enumeration over a loaded network.
///
/// The engine only borrows the network; every query works on its own
/// `Assignment`, so answering a query never changes what the next one sees.
#[derive(Debug, Clone)]
pub struct InferenceEngine<'a> {
    /// Variables in evaluation order.
    nodes: Vec<&'a Variable>,
    /// Evaluation positions of each node's parents, in parent order.
    parents: Vec<Vec<usize>>,
    positions: HashMap<&'a str, usize>,
    options: EnumerationOptions,
}

impl<'a> InferenceEngine<'a> {
    pub fn new(network: &'a BayesianNetwork) -> Self {
        Self::with_options(network, EnumerationOptions::default())
    }

    pub fn with_options(network: &'a BayesianNetwork, options: EnumerationOptions) -> Self {
        let nodes: Vec<&Variable> = network.variables().collect();
        let positions: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, &v)| (v.name(), i))
            .collect();
        let parents = nodes
            .iter()
            .map(|v| {
                v.parents()
                    .iter()
                    .filter_map(|p| positions.get(p.as_str()).copied())
                    .collect()
            })
            .collect();

        InferenceEngine {
            nodes,
            parents,
            positions,
            options,
        }
    }

    /// Answers `query` with `enumeration_ask`.
    pub fn query(&self, query: &Query) -> Result<Distribution> {
        self.enumeration_ask(&query.variable, &query.evidence)
    }

    /// Posterior distribution of `variable` given `evidence`.
    ///
    /// Each value except the last gets the unnormalized joint
    /// `P(variable = value, evidence)`. After dividing by `P(evidence)` the
    /// last value takes whatever mass is left, since the posterior sums to one.
    pub fn enumeration_ask(&self, variable: &str, evidence: &[Observation]) -> Result<Distribution> {
        let position = self.position(variable)?;
        let query_var = self.nodes[position];
        let mut assignment = self.bind_evidence(evidence)?;
        debug!(
            "enumeration_ask {} given {} observation(s)",
            variable,
            assignment.depth()
        );

        if let Some(observed) = assignment.get(position) {
            if self.enumerate_all(0, &mut assignment)? <= 0.0 {
                return Err(NetworkError::ImpossibleEvidence(variable.to_string()));
            }
            debug!("{} is itself observed; returning a point mass", variable);
            return Ok(Distribution::point_mass(variable, query_var.domain(), observed));
        }

        let size = query_var.domain_size();
        let mut unnormalized = Vec::with_capacity(size);
        for value in 0..size - 1 {
            let mut scope = assignment.bind(position, value);
            unnormalized.push(self.enumerate_all(0, &mut scope)?);
        }
        unnormalized.push(0.0);

        self.normalize(query_var, unnormalized, &mut assignment)
    }

    /// `P(evidence)`: the sum of the joint over every unobserved variable.
    pub fn evidence_probability(&self, evidence: &[Observation]) -> Result<f64> {
        let mut assignment = self.bind_evidence(evidence)?;
        self.enumerate_all(0, &mut assignment)
    }

    /// Sum of the joint probability over variables `position..` that are not
    /// bound in `assignment`, with bound ones contributing their CPT entry.
    pub fn enumerate_all(&self, position: usize, assignment: &mut Assignment) -> Result<f64> {
        if position == self.nodes.len() {
            return Ok(1.0);
        }

        if let Some(value) = assignment.get(position) {
            let p = self.local_probability(position, value, assignment)?;
            if p == 0.0 {
                return Ok(0.0);
            }
            return Ok(p * self.enumerate_all(position + 1, assignment)?);
        }

        let variable = self.nodes[position];
        if self.options.prune_unobserved_leaves && variable.is_leaf() {
            trace!("skipping unobserved leaf {}", variable.name());
            return self.enumerate_all(position + 1, assignment);
        }

        let mut sum = 0.0;
        for value in 0..variable.domain_size() {
            let mut scope = assignment.bind(position, value);
            let p = self.local_probability(position, value, &scope)?;
            if p > 0.0 {
                sum += p * self.enumerate_all(position + 1, &mut scope)?;
            }
        }
        Ok(sum)
    }

    /// Divides by `P(evidence)` and fills the last slot with the remaining mass.
    fn normalize(
        &self,
        query_var: &Variable,
        mut unnormalized: Vec<f64>,
        evidence: &mut Assignment,
    ) -> Result<Distribution> {
        let constant = self.enumerate_all(0, evidence)?;
        debug!("normalization constant for {}: {}", query_var.name(), constant);
        if constant <= 0.0 {
            return Err(NetworkError::ImpossibleEvidence(query_var.name().to_string()));
        }

        let last = unnormalized.len() - 1;
        let mut assigned = 0.0;
        for p in &mut unnormalized[..last] {
            *p /= constant;
            assigned += *p;
        }
        unnormalized[last] = (1.0 - assigned).clamp(0.0, 1.0);

        Ok(Distribution::new(
            query_var.name(),
            query_var
                .domain()
                .iter()
                .map(String::as_str)
                .zip(unnormalized),
        ))
    }

    /// `P(node = value | parents)` with the parents' values taken from
    /// `assignment`.
    fn local_probability(&self, position: usize, value: usize, assignment: &Assignment) -> Result<f64> {
        let variable = self.nodes[position];
        let mut key = ParentKey::root();
        for (&parent_position, parent_name) in self.parents[position].iter().zip(variable.parents()) {
            let parent = self.nodes[parent_position];
            let parent_value = assignment
                .get(parent_position)
                .and_then(|v| parent.value(v))
                .ok_or_else(|| {
                    NetworkError::malformed_network(format!(
                        "'{}' is evaluated before its parent '{}'",
                        variable.name(),
                        parent_name
                    ))
                })?;
            key.push(parent_value);
        }

        variable
            .probability(&key, value)
            .ok_or_else(|| NetworkError::MissingRow {
                variable: variable.name().to_string(),
                key: key.to_string(),
            })
    }

    fn bind_evidence(&self, evidence: &[Observation]) -> Result<Assignment> {
        let mut assignment = Assignment::new(self.nodes.len());
        for observation in evidence {
            let position = self.position(&observation.variable)?;
            let variable = self.nodes[position];
            let value = variable.index_of(&observation.value).ok_or_else(|| {
                NetworkError::UnknownValue {
                    variable: observation.variable.clone(),
                    value: observation.value.clone(),
                }
            })?;
            match assignment.get(position) {
                None => assignment.observe(position, value),
                Some(existing) if existing == value => {}
                Some(existing) => {
                    return Err(NetworkError::InvalidQuery(format!(
                        "'{}' is observed as both '{}' and '{}'",
                        observation.variable,
                        variable.domain()[existing],
                        observation.value
                    )));
                }
            }
        }
        Ok(assignment)
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.positions
            .get(name)
            .copied()
            .ok_or_else(|| NetworkError::UnknownVariable(name.to_string()))
    }
}
