use std::collections::hash_map::DefaultHasher;
use std::hash::{BuildHasher, BuildHasherDefault};

use log::trace;

/// Capacity used by `KeyedTable::new`.
pub const INITIAL_CAPACITY: usize = 100;

/// Grow once `len / capacity` goes above this.
pub const MAX_LOAD_FACTOR: f64 = 0.7;

/// Deterministic hasher so slot placement is reproducible across runs.
pub type DeterministicState = BuildHasherDefault<DefaultHasher>;

#[derive(Debug, Clone)]
struct Entry<T> {
    key: String,
    value: T,
}

/// Where a probe for a key ended.
enum Probe {
    /// Slot already holding the key.
    Found(usize),
    /// First empty slot on the sequence.
    Vacant(usize),
    /// Every reachable slot is taken by other keys.
    Exhausted,
}

/// An open-addressed, auto-resizing table keyed by strings.
///
/// Collisions are resolved with triangular probing: starting from
/// `base = hash(key) % capacity` the probe visits `base + 0`, `base + 1`,
/// `base + 3`, `base + 6`, ... (the running sum `0 + 1 + ... + i`), all taken
/// modulo the capacity. Before every insertion the table grows to
/// `2 * capacity + 2` slots once the load factor exceeds 0.7.
///
/// Triangular offsets modulo a capacity that is not a power of two do not
/// reach every slot. The offsets repeat with period `2 * capacity`, so a probe
/// stops after that many steps; an insertion that finds nothing free grows the
/// table and tries again.
#[derive(Debug, Clone)]
pub struct KeyedTable<T, S = DeterministicState> {
    slots: Vec<Option<Entry<T>>>,
    len: usize,
    hasher: S,
}

impl<T> KeyedTable<T> {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DeterministicState::default())
    }
}

impl<T> Default for KeyedTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S: BuildHasher> KeyedTable<T, S> {
    /// Creates a table with `capacity` slots (at least one) hashing with `hasher`.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        KeyedTable {
            slots: empty_slots(capacity.max(1)),
            len: 0,
            hasher,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the value stored under `key`, inserting `T::default()` first
    /// when the key is absent.
    pub fn find_or_insert(&mut self, key: &str) -> &mut T
    where
        T: Default,
    {
        let index = match self.reserve(key) {
            Probe::Found(index) => index,
            Probe::Vacant(index) => self.fill(index, key, T::default()),
            Probe::Exhausted => unreachable!("reserve always yields a slot"),
        };
        self.value_at_mut(index)
    }

    /// Stores `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: &str, value: T) -> Option<T> {
        match self.reserve(key) {
            Probe::Found(index) => Some(std::mem::replace(self.value_at_mut(index), value)),
            Probe::Vacant(index) => {
                self.fill(index, key, value);
                None
            }
            Probe::Exhausted => unreachable!("reserve always yields a slot"),
        }
    }

    /// Looks `key` up without inserting. Absence is `None`, never a blank slot.
    pub fn lookup(&self, key: &str) -> Option<&T> {
        self.slot_of(key)
            .and_then(|index| self.slots[index].as_ref())
            .map(|entry| &entry.value)
    }

    pub fn lookup_mut(&mut self, key: &str) -> Option<&mut T> {
        let index = self.slot_of(key)?;
        self.slots[index].as_mut().map(|entry| &mut entry.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.slot_of(key).is_some()
    }

    /// Slot index currently holding `key`.
    pub fn slot_of(&self, key: &str) -> Option<usize> {
        match self.probe(key) {
            Probe::Found(index) => Some(index),
            _ => None,
        }
    }

    /// Occupied entries in slot order (not insertion order).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.slots
            .iter()
            .flatten()
            .map(|entry| (entry.key.as_str(), &entry.value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.iter().map(|(_, value)| value)
    }

    fn base_index(&self, key: &str, capacity: usize) -> usize {
        (self.hasher.hash_one(key) % capacity as u64) as usize
    }

    /// Walks the triangular probe sequence for `key` over `occupied`.
    fn probe_in<'a>(
        &self,
        key: &str,
        capacity: usize,
        occupied: impl Fn(usize) -> Option<&'a str>,
    ) -> Probe {
        let mut index = self.base_index(key, capacity);
        for attempt in 0..2 * capacity {
            index = (index + attempt) % capacity;
            match occupied(index) {
                None => return Probe::Vacant(index),
                Some(existing) if existing == key => return Probe::Found(index),
                Some(_) => {}
            }
        }
        Probe::Exhausted
    }

    fn probe(&self, key: &str) -> Probe {
        let slots = &self.slots;
        self.probe_in(key, slots.len(), |index| {
            slots[index].as_ref().map(|entry| entry.key.as_str())
        })
    }

    /// Load-factor check followed by a probe that is guaranteed to land.
    fn reserve(&mut self, key: &str) -> Probe {
        if self.len as f64 / self.slots.len() as f64 > MAX_LOAD_FACTOR {
            self.expand();
        }
        loop {
            match self.probe(key) {
                Probe::Exhausted => {
                    trace!("probe for '{}' exhausted at capacity {}", key, self.capacity());
                    self.expand();
                }
                found_or_vacant => return found_or_vacant,
            }
        }
    }

    fn fill(&mut self, index: usize, key: &str, value: T) -> usize {
        self.slots[index] = Some(Entry {
            key: key.to_string(),
            value,
        });
        self.len += 1;
        index
    }

    fn value_at_mut(&mut self, index: usize) -> &mut T {
        match self.slots[index].as_mut() {
            Some(entry) => &mut entry.value,
            None => unreachable!("slot {} was just claimed", index),
        }
    }

    /// Rehashes every entry into `2 * capacity + 2` slots, growing further in
    /// the rare case that some key cannot be placed.
    fn expand(&mut self) {
        let mut capacity = 2 * self.slots.len() + 2;
        let placement = loop {
            match self.plan_placement(capacity) {
                Some(placement) => break placement,
                None => capacity = 2 * capacity + 2,
            }
        };
        trace!("expanding keyed table {} -> {}", self.slots.len(), capacity);

        let old = std::mem::replace(&mut self.slots, empty_slots(capacity));
        for (entry, index) in old.into_iter().flatten().zip(placement) {
            self.slots[index] = Some(entry);
        }
    }

    /// Target slots, in slot order of the current table, for a table of
    /// `capacity` slots; `None` if some key finds no free slot.
    fn plan_placement(&self, capacity: usize) -> Option<Vec<usize>> {
        let mut taken: Vec<Option<&str>> = vec![None; capacity];
        let mut placement = Vec::with_capacity(self.len);
        for key in self.keys() {
            let probe = {
                let view = &taken;
                self.probe_in(key, capacity, |index| view[index])
            };
            match probe {
                Probe::Vacant(index) => {
                    taken[index] = Some(key);
                    placement.push(index);
                }
                _ => return None,
            }
        }
        Some(placement)
    }
}

fn empty_slots<T>(capacity: usize) -> Vec<Option<Entry<T>>> {
    std::iter::repeat_with(|| None).take(capacity).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::Hasher;

    /// Sends every key to the same hash so probe order is observable.
    #[derive(Default, Clone)]
    struct FixedState(u64);

    struct FixedHasher(u64);

    impl Hasher for FixedHasher {
        fn finish(&self) -> u64 {
            self.0
        }

        fn write(&mut self, _bytes: &[u8]) {}
    }

    impl BuildHasher for FixedState {
        type Hasher = FixedHasher;

        fn build_hasher(&self) -> FixedHasher {
            FixedHasher(self.0)
        }
    }

    #[test]
    fn test_colliding_keys_follow_triangular_offsets() {
        let mut table = KeyedTable::with_capacity_and_hasher(100, FixedState(7));
        for key in ["a", "b", "c", "d", "e", "f"] {
            table.insert(key, key.len());
        }
        let slots: Vec<usize> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|key| table.slot_of(key).unwrap())
            .collect();
        // offsets 0, 1, 3, 6, 10, 15 from base 7
        assert_eq!(slots, vec![7, 8, 10, 13, 17, 22]);
    }

    #[test]
    fn test_triangular_offsets_wrap_around_capacity() {
        let mut table = KeyedTable::with_capacity_and_hasher(10, FixedState(8));
        let keys = ["k0", "k1", "k2", "k3", "k4", "k5"];
        for key in keys {
            table.insert(key, ());
        }
        assert_eq!(table.capacity(), 10);
        let slots: Vec<usize> = keys.iter().map(|k| table.slot_of(k).unwrap()).collect();
        // 8+0, 8+1, 8+3, 8+6, 8+10 (hits 8 again), 8+15, 8+21 (hits 9), 8+28
        assert_eq!(slots, vec![8, 9, 1, 4, 3, 6]);
    }

    #[test]
    fn test_unreachable_slots_force_growth() {
        // With capacity 10 and one shared base only six slots are reachable.
        let mut table = KeyedTable::with_capacity_and_hasher(10, FixedState(8));
        for i in 0..7 {
            table.insert(&format!("k{}", i), i);
        }
        assert_eq!(table.capacity(), 22);
        for i in 0..7 {
            assert_eq!(table.lookup(&format!("k{}", i)), Some(&i));
        }
    }

    #[test]
    fn test_find_or_insert_reuses_existing_slot() {
        let mut table: KeyedTable<Vec<f64>> = KeyedTable::new();
        table.find_or_insert("row").push(0.25);
        table.find_or_insert("row").push(0.75);
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("row"), Some(&vec![0.25, 0.75]));
    }

    #[test]
    fn test_insert_replaces_value() {
        let mut table = KeyedTable::new();
        assert_eq!(table.insert("x", 1), None);
        assert_eq!(table.insert("x", 2), Some(1));
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("x"), Some(&2));
    }

    #[test]
    fn test_lookup_missing_is_none() {
        let mut table = KeyedTable::with_capacity(4);
        table.insert("present", 1u8);
        assert!(table.lookup("absent").is_none());
        assert!(table.lookup_mut("absent").is_none());
        assert!(!table.contains_key("absent"));
    }

    #[test]
    fn test_growth_sequence() {
        let mut table = KeyedTable::new();
        for i in 0..71 {
            table.insert(&format!("key{}", i), i);
        }
        // 70/100 does not exceed the load factor, 71/100 does
        assert_eq!(table.capacity(), 100);
        table.insert("key71", 71);
        assert_eq!(table.capacity(), 202);
        assert_eq!(table.len(), 72);
    }

    #[test]
    fn test_rehash_keeps_every_key() {
        let mut table = KeyedTable::with_capacity(3);
        for i in 0..500 {
            table.insert(&format!("variable_{}", i), i);
        }
        assert_eq!(table.len(), 500);
        assert!(table.capacity() > 500);
        for i in 0..500 {
            assert_eq!(table.lookup(&format!("variable_{}", i)), Some(&i));
        }
        assert_eq!(table.iter().count(), 500);
    }
}
