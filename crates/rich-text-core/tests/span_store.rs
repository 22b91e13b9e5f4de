use pretty_assertions::assert_eq;
use rich_text_core::{Span, SpanId, SpanStore, StoreConfig};

fn lens(store: &SpanStore<char>) -> Vec<usize> {
    store.iter().map(|(_, span)| span.len).collect()
}

fn formats(store: &SpanStore<char>) -> String {
    store.iter().map(|(_, span)| span.format).collect()
}

#[test]
fn test_build_list_and_delete_in_any_order() {
    let mut store = SpanStore::new();
    let b = store.create(Span::new(2, 'b'), None);
    let a = store.create(Span::new(1, 'a'), None);
    let d = store.create(Span::new(4, 'd'), Some(b));
    let c = store.create(Span::new(3, 'c'), Some(b));
    assert_eq!(formats(&store), "abcd");
    assert_eq!(lens(&store), vec![1, 2, 3, 4]);
    assert_eq!(store.root(), Some(a));
    assert_eq!(store.last(), Some(d));

    assert!(store.delete(c).is_none());
    assert_eq!(formats(&store), "abd");
    assert_eq!(store.next(b), Some(d));
    assert_eq!(store.previous(d), Some(b));

    assert!(store.delete(a).is_none());
    assert_eq!(store.root(), Some(b));
    assert_eq!(store.previous(b), None);

    assert!(store.delete(d).is_none());
    assert_eq!(store.last(), Some(b));
    assert_eq!(store.next(b), None);

    assert!(store.delete(b).is_none());
    assert!(store.is_empty());
    assert_eq!(store.root(), None);
    assert_eq!(store.last(), None);
    assert_eq!(store.capacity(), 0);
}

#[test]
fn test_ids_stay_valid_across_unrelated_deletes() {
    let mut store = SpanStore::new();
    let mut ids = Vec::new();
    let mut prev = None;
    for (i, c) in "abcdef".chars().enumerate() {
        let id = store.create(Span::new(i + 1, c), prev);
        ids.push(id);
        prev = Some(id);
    }

    store.unlink(ids[1]);
    store.unlink(ids[4]);
    for &i in &[0, 2, 3, 5] {
        assert_eq!(store[ids[i]].len, i + 1);
    }
    assert!(!store.contains(ids[1]));
    assert_eq!(store.get(ids[4]), None);

    // A reused slot does not resurrect the old key.
    let g = store.create(Span::new(7, 'g'), Some(ids[5]));
    assert!(!store.contains(ids[1]) && !store.contains(ids[4]));
    assert_eq!(store[g], Span::new(7, 'g'));
    assert_eq!(formats(&store), "acdfg");
}

#[test]
fn test_get_mut_and_index_mut() {
    let mut store = SpanStore::new();
    let id = store.create(Span::new(1, 'x'), None);
    store[id].len += 4;
    if let Some(span) = store.get_mut(id) {
        span.format = 'y';
    }
    assert_eq!(store.to_vec(), vec![Span::new(5, 'y')]);
}

#[test]
fn test_churn_triggers_compaction_and_translation() {
    let mut store = SpanStore::with_config(StoreConfig {
        compaction_ratio: 4,
    });
    let mut ids: Vec<SpanId> = Vec::new();
    let mut prev = None;
    for i in 0..64 {
        let id = store.create(Span::new(i + 1, 'a'), prev);
        ids.push(id);
        prev = Some(id);
    }

    // Drop everything but every 8th span; compaction kicks in once live * 4 < 64.
    let mut compactions = 0;
    let mut survivors: Vec<(usize, SpanId)> = (0..64).step_by(8).map(|i| (i, ids[i])).collect();
    for i in (0..64).filter(|i| i % 8 != 0) {
        if let Some(compaction) = store.delete(ids[i]) {
            compactions += 1;
            for id in ids.iter_mut() {
                if let Some(new) = compaction.translate(*id) {
                    *id = new;
                }
            }
            for (_, id) in survivors.iter_mut() {
                *id = compaction.translate(*id).unwrap();
            }
        }
    }

    assert!(compactions >= 1);
    assert_eq!(store.len(), 8);
    assert!(store.capacity() <= 4 * 8 + 8);
    for (i, id) in survivors {
        assert_eq!(store[id].len, i + 1);
    }
    assert_eq!(lens(&store), vec![1, 9, 17, 25, 33, 41, 49, 57]);
}

#[test]
fn test_explicit_compaction_orders_slots() {
    let mut store = SpanStore::with_config(StoreConfig {
        compaction_ratio: 0,
    });
    let c = store.create(Span::new(3, 'c'), None);
    let a = store.create(Span::new(1, 'a'), None);
    let b = store.create(Span::new(2, 'b'), Some(a));
    let x = store.create(Span::new(9, 'x'), Some(c));
    store.unlink(x);

    let compaction = store.compact();
    assert_eq!(compaction.moved(), 3);
    assert_eq!(compaction.translate(x), None);

    let new_ids: Vec<SpanId> = [a, b, c]
        .into_iter()
        .map(|id| compaction.translate(id).unwrap())
        .collect();
    assert_eq!(
        new_ids.iter().map(|id| id.slot()).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert!(!store.contains(a));
    assert_eq!(store.capacity(), 3);
    assert_eq!(formats(&store), "abc");
}

#[test]
fn test_from_spans_round_trips_to_vec() {
    let spans = vec![Span::new(2, 'p'), Span::new(5, 'q'), Span::new(1, 'p')];
    let store = SpanStore::from_spans(&spans);
    assert_eq!(store.to_vec(), spans);
    assert_eq!(store.len(), 3);
    assert_eq!((&store).into_iter().count(), 3);
}
