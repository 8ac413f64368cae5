#[cfg(test)]
mod test_keyed_table {
    use bayesenum::table::{KeyedTable, MAX_LOAD_FACTOR};
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::hash::{BuildHasher, Hasher};

    /// Hashes every key to the length of the key.
    #[derive(Clone, Default)]
    struct LengthState;

    struct LengthHasher(u64);

    impl Hasher for LengthHasher {
        fn finish(&self) -> u64 {
            self.0
        }

        fn write(&mut self, bytes: &[u8]) {
            // str hashing writes the bytes followed by a 0xff terminator
            self.0 += bytes.iter().filter(|&&b| b != 0xff).count() as u64;
        }
    }

    impl BuildHasher for LengthState {
        type Hasher = LengthHasher;

        fn build_hasher(&self) -> LengthHasher {
            LengthHasher(0)
        }
    }

    #[test]
    fn test_same_length_keys_probe_triangular_offsets() {
        let mut table = KeyedTable::with_capacity_and_hasher(50, LengthState);
        for key in ["aa", "bb", "cc", "dd", "ee"] {
            table.insert(key, ());
        }
        let slots: Vec<usize> = ["aa", "bb", "cc", "dd", "ee"]
            .iter()
            .map(|key| table.slot_of(key).unwrap())
            .collect();
        // base 2, then offsets 1, 3, 6, 10; never the linear 2, 3, 4, 5, 6
        assert_eq!(slots, vec![2, 3, 5, 8, 12]);
    }

    proptest! {
        #[test]
        fn rehash_preserves_every_key(
            keys in prop::collection::hash_set("[a-z]{1,8}", 1..300),
            capacity in 1usize..16,
        ) {
            let mut table = KeyedTable::with_capacity(capacity);
            for (i, key) in keys.iter().enumerate() {
                table.insert(key, i);
            }
            prop_assert_eq!(table.len(), keys.len());
            prop_assert!(table.len() as f64 <= table.capacity() as f64 * MAX_LOAD_FACTOR + 1.0);
            for (i, key) in keys.iter().enumerate() {
                prop_assert_eq!(table.lookup(key), Some(&i));
            }
            let stored: HashSet<&str> = table.keys().collect();
            prop_assert_eq!(stored.len(), keys.len());
        }

        #[test]
        fn find_or_insert_never_duplicates(keys in prop::collection::vec("[a-c]{1,3}", 1..200)) {
            let mut table: KeyedTable<usize> = KeyedTable::with_capacity(2);
            for key in &keys {
                *table.find_or_insert(key) += 1;
            }
            let distinct: HashSet<&String> = keys.iter().collect();
            prop_assert_eq!(table.len(), distinct.len());
            for key in distinct {
                let expected = keys.iter().filter(|k| *k == key).count();
                prop_assert_eq!(table.lookup(key), Some(&expected));
            }
        }
    }
}
