// Cursor contract checks: misuse is fatal, never a silent misread.
use chained_table::{Advance, ChainedTable};

fn small_table() -> ChainedTable<u32> {
    let mut t = ChainedTable::with_buckets(4).unwrap();
    for k in 0..6u32 {
        t.insert(u64::from(k), k).unwrap();
    }
    t
}

#[test]
#[should_panic(expected = "modified outside the cursor")]
fn insert_invalidates_cursor() {
    let mut t = small_table();
    let c = t.cursor();
    t.insert(100, 100).unwrap();
    let _ = c.get(&t);
}

#[test]
#[should_panic(expected = "modified outside the cursor")]
fn remove_invalidates_cursor() {
    let mut t = small_table();
    let mut c = t.cursor();
    t.remove(3);
    c.next(&t);
}

#[test]
#[should_panic(expected = "modified outside the cursor")]
fn clear_invalidates_cursor() {
    let mut t = small_table();
    let c = t.cursor();
    t.clear();
    let _ = c.past_end(&t);
}

#[test]
#[should_panic(expected = "other than the one that created it")]
fn foreign_table_rejected() {
    let t1 = small_table();
    let t2 = small_table();
    let c = t1.cursor();
    let _ = c.get(&t2);
}

#[test]
#[should_panic(expected = "modified outside the cursor")]
fn sibling_cursor_delete_invalidates_reader() {
    let mut t = small_table();
    let reader = t.cursor();
    let mut writer = t.cursor();
    writer.delete(&mut t).unwrap();
    let _ = reader.get(&t);
}

#[test]
fn value_updates_keep_cursor_valid() {
    let mut t = small_table();
    let mut c = t.cursor();
    let (k, _) = c.get(&t).unwrap();
    *t.get_mut(k).unwrap() += 10;
    t.insert(k, 77).unwrap();
    assert_eq!(c.get(&t), Some((k, &77)));
    assert!(c.next(&t));
}

#[test]
fn deleting_cursor_stays_valid_to_the_end() {
    let mut t = small_table();
    let mut c = t.cursor();
    let mut last = Advance::Advanced;
    let mut n = 0;
    while let Some(d) = c.delete(&mut t) {
        n += 1;
        last = d.advance;
    }
    assert_eq!(n, 6);
    assert_eq!(last, Advance::Exhausted);
    assert!(t.is_empty());
    assert!(c.past_end(&t));
    assert!(!c.next(&t));
}

#[test]
fn cloned_cursor_walks_independently() {
    let t = small_table();
    let mut a = t.cursor();
    a.next(&t);
    let mut b = a.clone();
    let mut rest_a = 0;
    while !a.past_end(&t) {
        rest_a += 1;
        a.next(&t);
    }
    assert!(!b.past_end(&t));
    let mut rest_b = 0;
    while b.get(&t).is_some() {
        rest_b += 1;
        b.next(&t);
    }
    assert_eq!(rest_a, 5);
    assert_eq!(rest_b, 5);
}
