#![cfg(test)]

// Property tests for ChainedTable kept inside the crate so they can check
// internal invariants (stamps, bucket placement) alongside the public API.

use crate::chained_table::{ChainedTable, Entry, Insertion};
use crate::cursor::Advance;
use hashbrown::{HashMap, HashSet};
use proptest::prelude::*;

// Pool-indexed operations so shrinking walks toward earlier keys, a shorter
// pool and shorter op lists.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Lookup(usize),
    Mutate(usize, i32),
    // Walk the cursor this many steps, delete there, then finish the walk.
    DeleteAt(usize),
    Iterate,
}

fn arb_key() -> impl Strategy<Value = u64> {
    // Small keys collide in small tables; large ones exercise the modulo.
    prop_oneof![0u64..32, any::<u64>()]
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<u64>, Vec<OpI>)> {
    (1usize..=8, proptest::collection::vec(arb_key(), 1..=24)).prop_flat_map(
        |(buckets, pool)| {
            let idx = 0..pool.len();
            let op = prop_oneof![
                3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
                1 => idx.clone().prop_map(OpI::Remove),
                1 => idx.clone().prop_map(OpI::Lookup),
                1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
                1 => (0usize..40).prop_map(OpI::DeleteAt),
                1 => Just(OpI::Iterate),
            ];
            proptest::collection::vec(op, 1..80).prop_map(move |ops| (buckets, pool.clone(), ops))
        },
    )
}

// Property: state-machine equivalence against a hash map model.
// Invariants exercised across random operation sequences:
// - Insert returns `Inserted` for absent keys and `Replaced` with the prior
//   value for present ones; `len` tracks distinct keys.
// - Lookup and remove agree with the model; removed entries carry the
//   stored value.
// - Cursor delete removes exactly the entry under the cursor, and the full
//   walk around it visits every original key exactly once.
// - Every key sits in bucket `key % bucket_count`; load stays within
//   `3 * bucket_count`.
proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((buckets, pool, ops) in arb_scenario()) {
        let mut sut: ChainedTable<i32> = ChainedTable::with_buckets(buckets).unwrap();
        let mut model: HashMap<u64, i32> = HashMap::new();

        for op in ops {
            match op {
                OpI::Insert(i, v) => {
                    let k = pool[i];
                    match sut.insert(k, v).unwrap() {
                        Insertion::Inserted => {
                            prop_assert!(model.insert(k, v).is_none(), "inserted over a live key");
                        }
                        Insertion::Replaced(old) => {
                            let prev = model.insert(k, v);
                            prop_assert_eq!(Some(old.value), prev);
                            prop_assert_eq!(old.key, k);
                        }
                    }
                    prop_assert!(sut.len() <= 3 * sut.bucket_count());
                }
                OpI::Remove(i) => {
                    let k = pool[i];
                    let got = sut.remove(k);
                    let want = model.remove(&k).map(|value| Entry { key: k, value });
                    prop_assert_eq!(got, want);
                    prop_assert!(!sut.contains_key(k));
                }
                OpI::Lookup(i) => {
                    let k = pool[i];
                    prop_assert_eq!(sut.get(k), model.get(&k));
                    prop_assert_eq!(sut.contains_key(k), model.contains_key(&k));
                }
                OpI::Mutate(i, d) => {
                    let k = pool[i];
                    if let Some(v) = sut.get_mut(k) {
                        *v = v.wrapping_add(d);
                        let m = model.get_mut(&k).expect("model has key");
                        *m = m.wrapping_add(d);
                    } else {
                        prop_assert!(!model.contains_key(&k));
                    }
                }
                OpI::DeleteAt(steps) => {
                    let before: HashSet<u64> = model.keys().copied().collect();
                    let mut visited: Vec<u64> = Vec::new();
                    let mut c = sut.cursor();
                    for _ in 0..steps {
                        match c.get(&sut) {
                            Some((k, _)) => visited.push(k),
                            None => break,
                        }
                        c.next(&sut);
                    }
                    match c.delete(&mut sut) {
                        Some(d) => {
                            let mv = model.remove(&d.entry.key);
                            prop_assert_eq!(mv, Some(d.entry.value));
                            prop_assert_eq!(d.advance == Advance::Exhausted, c.past_end(&sut));
                            visited.push(d.entry.key);
                            while let Some((k, _)) = c.get(&sut) {
                                visited.push(k);
                                c.next(&sut);
                            }
                            let unique: HashSet<u64> = visited.iter().copied().collect();
                            prop_assert_eq!(unique.len(), visited.len(), "a key was revisited");
                            prop_assert_eq!(unique, before);
                        }
                        None => {
                            prop_assert!(c.past_end(&sut));
                            prop_assert_eq!(visited.len(), before.len());
                        }
                    }
                }
                OpI::Iterate => {
                    let seen: HashMap<u64, i32> = sut.iter().map(|(k, v)| (k, *v)).collect();
                    prop_assert_eq!(&seen, &model);
                    prop_assert_eq!(sut.iter().count(), sut.len());
                }
            }

            // Post-conditions after each op.
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            for (k, _) in sut.iter() {
                let (bucket, _, _) = sut.buckets().find(k).expect("iterated key is linked");
                prop_assert_eq!(bucket as u64, k % sut.bucket_count() as u64);
            }
        }

        let mut freed = 0usize;
        let expected = sut.len();
        sut.free_with(|_| freed += 1);
        prop_assert_eq!(freed, expected);
    }
}

// Property: a stale cursor never reads. Any structural change made around a
// cursor makes its next use panic, while value-only changes do not.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_cursor_stamp_tracks_structure(keys in proptest::collection::hash_set(0u64..64, 1..20), extra in 64u64..128) {
        let mut t: ChainedTable<u64> = ChainedTable::with_buckets(2).unwrap();
        for &k in &keys {
            t.insert(k, k).unwrap();
        }
        let c = t.cursor();
        let some_key = *keys.iter().next().unwrap();

        // Replacing a value keeps the cursor valid.
        t.insert(some_key, 0).unwrap();
        prop_assert!(c.get(&t).is_some());

        // A new key invalidates it.
        t.insert(extra, extra).unwrap();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| c.past_end(&t)));
        prop_assert!(res.is_err());
    }
}
