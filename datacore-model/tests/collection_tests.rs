use datacore_model::{Collection, Element, Error, Key};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
struct Tag {
    kind: &'static str,
    n: i64,
}

impl Element for Tag {
    fn element_type(&self) -> &str {
        self.kind
    }
}

fn tag(n: i64) -> Tag {
    Tag { kind: "tag", n }
}

fn tags(ns: &[i64]) -> Collection<Tag> {
    Collection::from_elements("tag", ns.iter().copied().map(tag)).unwrap()
}

fn numbers(collection: &Collection<Tag>) -> Vec<i64> {
    collection.values().map(|t| t.n).collect()
}

fn indexes(keys: &[i64]) -> Vec<Key> {
    keys.iter().copied().map(Key::Index).collect()
}

// ── Construction ─────────────────────────────────────────────────

#[test]
fn new_collection_is_empty_and_named_after_element_type() {
    let c: Collection<Tag> = Collection::new("tag");
    assert!(c.is_empty());
    assert_eq!(c.count(), 0);
    assert_eq!(c.name(), "tag_collection");
    assert_eq!(c.element_type(), "tag");
    assert!(c.first().is_none());
    assert!(c.last().is_none());
}

#[test]
fn from_elements_assigns_sequential_keys() {
    let c = tags(&[10, 20, 30]);
    assert_eq!(c.get_keys(), indexes(&[0, 1, 2]));
    assert_eq!(numbers(&c), vec![10, 20, 30]);
}

#[test]
fn from_keyed_keeps_keys() {
    let c = Collection::from_keyed("tag", [("a", tag(1)), ("b", tag(2))]).unwrap();
    assert_eq!(c.get_keys(), vec![Key::from("a"), Key::from("b")]);
    assert_eq!(c.get("b").map(|t| t.n), Some(2));
}

// ── Keys & auto-index ────────────────────────────────────────────

#[test]
fn add_after_explicit_integer_key_continues_past_it() {
    let mut c: Collection<Tag> = Collection::new("tag");
    c.set(Key::Index(5), tag(1)).unwrap();
    c.add(tag(2)).unwrap();
    assert_eq!(c.get_keys(), indexes(&[5, 6]));
}

#[test]
fn string_keys_do_not_advance_the_counter() {
    let mut c: Collection<Tag> = Collection::new("tag");
    c.set(Key::from("x"), tag(1)).unwrap();
    c.add(tag(2)).unwrap();
    assert_eq!(c.get_keys(), vec![Key::from("x"), Key::Index(0)]);
}

#[test]
fn numeric_string_keys_are_integer_keys() {
    let mut c: Collection<Tag> = Collection::new("tag");
    c.set(Key::from("3"), tag(1)).unwrap();
    assert!(c.has(3_i64));
    c.add(tag(2)).unwrap();
    assert_eq!(c.get_keys(), indexes(&[3, 4]));
}

#[test]
fn negative_first_key_continues_from_it() {
    let mut c: Collection<Tag> = Collection::new("tag");
    c.set(Key::Index(-5), tag(1)).unwrap();
    c.add(tag(2)).unwrap();
    assert_eq!(c.get_keys(), indexes(&[-5, -4]));
}

#[test]
fn negative_key_after_positive_keys_does_not_rewind() {
    let mut c = tags(&[1, 2]);
    c.set(Key::Index(-3), tag(3)).unwrap();
    c.add(tag(4)).unwrap();
    assert_eq!(c.get_keys(), indexes(&[0, 1, -3, 2]));
}

#[test]
fn add_fails_once_the_largest_key_is_taken() {
    let mut c: Collection<Tag> = Collection::new("tag");
    c.set(Key::Index(i64::MAX), tag(1)).unwrap();

    let err = c.add(tag(2)).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(err.to_string().contains("already occupied"));
    assert_eq!(c.count(), 1);
    assert_eq!(c.get(i64::MAX).map(|t| t.n), Some(1));
}

#[test]
fn add_reuses_the_largest_key_once_it_is_free() {
    let mut c: Collection<Tag> = Collection::new("tag");
    c.set(Key::Index(i64::MAX), tag(1)).unwrap();
    c.remove(i64::MAX);
    c.add(tag(2)).unwrap();
    assert_eq!(c.get_keys(), indexes(&[i64::MAX]));
}

#[test]
fn set_without_key_appends() {
    let mut c = tags(&[1]);
    c.set(None, tag(2)).unwrap();
    assert_eq!(c.get_keys(), indexes(&[0, 1]));
}

#[test]
fn overwrite_keeps_position() {
    let mut c = tags(&[1, 2, 3]);
    c.set(Key::Index(0), tag(9)).unwrap();
    assert_eq!(numbers(&c), vec![9, 2, 3]);
    assert_eq!(c.count(), 3);
}

#[test]
fn removed_keys_are_not_reused() {
    let mut c = tags(&[1, 2, 3]);
    assert_eq!(c.remove(2_i64).map(|t| t.n), Some(3));
    c.add(tag(4)).unwrap();
    assert_eq!(c.get_keys(), indexes(&[0, 1, 3]));
}

#[test]
fn remove_preserves_order_of_the_rest() {
    let mut c = tags(&[1, 2, 3]);
    c.remove(1_i64);
    assert_eq!(numbers(&c), vec![1, 3]);
    assert!(c.remove(42_i64).is_none());
}

#[test]
fn clear_resets_the_counter() {
    let mut c = tags(&[1, 2, 3]);
    c.clear();
    assert!(c.is_empty());
    c.add(tag(4)).unwrap();
    assert_eq!(c.get_keys(), indexes(&[0]));
}

#[test]
fn get_mut_updates_in_place() {
    let mut c = tags(&[1]);
    c.get_mut(0_i64).unwrap().n = 7;
    assert_eq!(c.get(0_i64).map(|t| t.n), Some(7));
}

// ── Type enforcement ─────────────────────────────────────────────

#[test]
fn add_rejects_wrong_element_type_without_mutation() {
    let mut c = tags(&[1, 2]);
    let err = c.add(Tag { kind: "other", n: 3 }).unwrap_err();
    assert!(matches!(
        &err,
        Error::TypeMismatch { expected, actual } if expected == "tag" && actual == "other"
    ));
    assert_eq!(
        err.to_string(),
        "expected collection element of type tag got other"
    );
    assert_eq!(c.count(), 2);

    c.add(tag(3)).unwrap();
    assert_eq!(c.get_keys(), indexes(&[0, 1, 2]));
}

#[test]
fn set_rejects_wrong_element_type_without_mutation() {
    let mut c = tags(&[1]);
    let err = c.set(Key::Index(0), Tag { kind: "other", n: 3 }).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
    assert_eq!(numbers(&c), vec![1]);
}

#[test]
fn from_elements_rejects_mixed_types() {
    let result = Collection::from_elements("tag", [tag(1), Tag { kind: "other", n: 2 }]);
    assert!(matches!(result, Err(Error::TypeMismatch { .. })));
}

// ── Derived collections ──────────────────────────────────────────

#[test]
fn filter_keeps_keys_and_tags() {
    let c = tags(&[1, 2, 3, 4]);
    let even = c.filter(|t| t.n % 2 == 0);
    assert_eq!(even.get_keys(), indexes(&[1, 3]));
    assert_eq!(even.name(), c.name());
    assert_eq!(even.element_type(), "tag");
    assert_eq!(c.count(), 4);
}

#[test]
fn slice_with_offset_and_length() {
    let c = tags(&[1, 2, 3, 4, 5]);
    let s = c.slice(1, Some(2));
    assert_eq!(s.get_keys(), indexes(&[1, 2]));
    assert_eq!(numbers(&s), vec![2, 3]);
}

#[test]
fn slice_with_negative_offset_counts_from_end() {
    let c = tags(&[1, 2, 3, 4, 5]);
    assert_eq!(c.slice(-2, None).get_keys(), indexes(&[3, 4]));
}

#[test]
fn slice_with_negative_length_stops_before_end() {
    let c = tags(&[1, 2, 3, 4, 5]);
    assert_eq!(c.slice(1, Some(-1)).get_keys(), indexes(&[1, 2, 3]));
}

#[test]
fn slice_out_of_range_is_empty() {
    let c = tags(&[1, 2, 3]);
    assert!(c.slice(10, None).is_empty());
    assert!(c.slice(1, Some(0)).is_empty());
    assert!(c.slice(2, Some(-5)).is_empty());
}

#[test]
fn sort_is_stable_and_keeps_keys() {
    let mut c = tags(&[3, 1, 2, 1]);
    c.sort(|a, b| a.n.cmp(&b.n));
    assert_eq!(numbers(&c), vec![1, 1, 2, 3]);
    assert_eq!(c.get_keys(), indexes(&[1, 3, 2, 0]));

    c.sort(|_, _| Ordering::Equal);
    assert_eq!(c.get_keys(), indexes(&[1, 3, 2, 0]));
}

#[test]
fn map_and_fmap_keep_keys() {
    let c = tags(&[1, 2, 3]);
    let doubled = c.map(|t| t.n * 2);
    assert_eq!(doubled.values().copied().collect::<Vec<_>>(), vec![2, 4, 6]);

    let odd = c.fmap(|t| (t.n % 2 == 1).then_some(t.n));
    assert_eq!(odd.keys().cloned().collect::<Vec<_>>(), indexes(&[0, 2]));
}

#[test]
fn reduce_folds_in_order() {
    let c = tags(&[1, 2, 3]);
    assert_eq!(c.reduce(|acc, t| acc * 10 + t.n, 0), 123);
    let empty: Collection<Tag> = Collection::new("tag");
    assert_eq!(empty.reduce(|acc, t| acc + t.n, 7), 7);
}

#[test]
fn first_and_last_follow_iteration_order() {
    let mut c = tags(&[1, 2, 3]);
    c.sort(|a, b| b.n.cmp(&a.n));
    assert_eq!(c.first().map(|t| t.n), Some(3));
    assert_eq!(c.last().map(|t| t.n), Some(1));
}

#[test]
fn iteration_yields_key_value_pairs_in_order() {
    let c = Collection::from_keyed("tag", [("b", tag(2)), ("a", tag(1))]).unwrap();
    let pairs: Vec<(Key, i64)> = (&c).into_iter().map(|(k, t)| (k.clone(), t.n)).collect();
    assert_eq!(pairs, vec![(Key::from("b"), 2), (Key::from("a"), 1)]);
}

// ── Retag ────────────────────────────────────────────────────────

#[test]
fn create_from_keeps_elements_and_keys() {
    let source = Collection::from_keyed("tag", [("x", tag(1)), ("y", tag(2))]).unwrap();
    let retagged = Collection::create_from("tag_list", "tag", source).unwrap();
    assert_eq!(retagged.name(), "tag_list");
    assert_eq!(retagged.get_keys(), vec![Key::from("x"), Key::from("y")]);
}

#[test]
fn create_from_rejects_elements_of_another_type() {
    let source = tags(&[1]);
    let err = Collection::create_from("label_collection", "label", source).unwrap_err();
    assert!(matches!(err, Error::Construction { target, .. } if target == "label_collection"));
}

// ── Properties ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn adds_produce_dense_keys(ns in prop::collection::vec(any::<i64>(), 0..40)) {
        let c = tags(&ns);
        let expected: Vec<Key> = (0..ns.len() as i64).map(Key::Index).collect();
        prop_assert_eq!(c.get_keys(), expected);
        prop_assert_eq!(numbers(&c), ns);
    }

    #[test]
    fn auto_keys_never_collide(ops in prop::collection::vec((any::<bool>(), 0i64..20), 1..60)) {
        let mut c: Collection<Tag> = Collection::new("tag");
        let mut highest: Option<i64> = None;
        for (is_add, n) in ops {
            if is_add {
                let before = c.count();
                c.add(tag(n)).unwrap();
                let key = c.get_keys().last().cloned().unwrap();
                let index = key.as_index().unwrap();
                prop_assert!(highest.is_none_or(|h| index > h));
                highest = Some(index);
                prop_assert_eq!(c.count(), before + 1);
            } else {
                c.remove(n);
            }
        }
    }

    #[test]
    fn slice_never_exceeds_source(
        len in 0usize..15,
        offset in -20i64..20,
        length in proptest::option::of(-20i64..20),
    ) {
        let ns: Vec<i64> = (0..len as i64).collect();
        let c = tags(&ns);
        let s = c.slice(offset, length);
        prop_assert!(s.count() <= c.count());
        for (key, t) in &s {
            prop_assert_eq!(c.get(key.clone()).map(|o| o.n), Some(t.n));
        }
    }
}
