pub mod keyed_table;

pub use keyed_table::{DeterministicState, KeyedTable, INITIAL_CAPACITY, MAX_LOAD_FACTOR};
