use super::cpt::{ConditionalProbabilityTable, ParentKey};

/// One node of the network.
#[derive(Debug, Clone, Default)]
pub struct Variable {
    name: String,
    domain: Vec<String>,
    parents: Vec<String>,
    children: Vec<String>,
    cpt: ConditionalProbabilityTable,
}

impl Variable {
    pub fn new<I, V>(name: impl Into<String>, domain: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Variable {
            name: name.into(),
            domain: domain.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Domain values in declaration order.
    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn domain_size(&self) -> usize {
        self.domain.len()
    }

    /// Position of `value` in the domain.
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.domain.iter().position(|v| v == value)
    }

    pub fn value(&self, index: usize) -> Option<&str> {
        self.domain.get(index).map(String::as_str)
    }

    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    pub fn children(&self) -> &[String] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn cpt(&self) -> &ConditionalProbabilityTable {
        &self.cpt
    }

    pub(crate) fn cpt_mut(&mut self) -> &mut ConditionalProbabilityTable {
        &mut self.cpt
    }

    pub(crate) fn add_parent(&mut self, parent: impl Into<String>) {
        self.parents.push(parent.into());
    }

    pub(crate) fn add_child(&mut self, child: impl Into<String>) {
        self.children.push(child.into());
    }

    /// `P(self = domain[value_index] | parents = key)`.
    pub fn probability(&self, key: &ParentKey, value_index: usize) -> Option<f64> {
        self.cpt.probability(key, value_index)
    }
}
