use std::ops::{Deref, DerefMut};

/// A partial assignment of domain indices to the network's variables,
/// indexed by evaluation position.
///
/// Bindings form a stack. Evidence is pushed with `observe` and stays for the
/// whole query; enumeration pushes with `bind`, which hands back a guard that
/// pops the binding when it goes out of scope, including on early return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    values: Vec<Option<usize>>,
    stack: Vec<usize>,
}

impl Assignment {
    /// An empty assignment over `size` variables.
    pub fn new(size: usize) -> Self {
        Assignment {
            values: vec![None; size],
            stack: Vec::with_capacity(size),
        }
    }

    pub fn get(&self, position: usize) -> Option<usize> {
        self.values.get(position).copied().flatten()
    }

    pub fn is_bound(&self, position: usize) -> bool {
        self.get(position).is_some()
    }

    /// Number of bound variables.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Binds `position` until the assignment is cleared.
    pub fn observe(&mut self, position: usize, value: usize) {
        self.push(position, value);
    }

    /// Binds `position` for as long as the returned guard lives.
    pub fn bind(&mut self, position: usize, value: usize) -> Binding<'_> {
        self.push(position, value);
        Binding { assignment: self }
    }

    /// `(position, value)` pairs in the order they were bound.
    pub fn bindings(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.stack
            .iter()
            .filter_map(|&position| self.get(position).map(|value| (position, value)))
    }

    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(|v| *v = None);
        self.stack.clear();
    }

    fn push(&mut self, position: usize, value: usize) {
        debug_assert!(!self.is_bound(position), "position {} bound twice", position);
        self.values[position] = Some(value);
        self.stack.push(position);
    }

    fn pop(&mut self) {
        if let Some(position) = self.stack.pop() {
            self.values[position] = None;
        }
    }
}

/// Scope of one `Assignment::bind`.
#[derive(Debug)]
pub struct Binding<'a> {
    assignment: &'a mut Assignment,
}

impl Deref for Binding<'_> {
    type Target = Assignment;

    fn deref(&self) -> &Assignment {
        self.assignment
    }
}

impl DerefMut for Binding<'_> {
    fn deref_mut(&mut self) -> &mut Assignment {
        self.assignment
    }
}

impl Drop for Binding<'_> {
    fn drop(&mut self) {
        self.assignment.pop();
    }
}
