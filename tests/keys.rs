mod common;

use std::collections::BTreeMap;

use assert_matches::assert_matches;

use strainload::domain::Table;
use strainload::error::Rejection;
use strainload::keys::KeyAllocator;

#[test]
fn seeds_from_store_and_counts_up() {
    let store = common::store();
    let mut keys = KeyAllocator::seed(&store, i64::from(i32::MAX)).unwrap();
    assert_eq!(keys.next(Table::Strain).unwrap(), common::STRAIN_SEED);
    assert_eq!(keys.next(Table::Strain).unwrap(), common::STRAIN_SEED + 1);
    assert_eq!(keys.next(Table::Note).unwrap(), common::NOTE_SEED);
    assert_eq!(keys.allocated(Table::Strain), 2);
    assert_eq!(keys.allocated(Table::Accession), 0);
}

#[test]
fn exhaustion_is_a_rejection() {
    let mut keys = KeyAllocator::with_seeds(BTreeMap::from([(Table::Annotation, 9)]), 10);
    assert_eq!(keys.next(Table::Annotation).unwrap(), 9);
    assert_eq!(keys.next(Table::Annotation).unwrap(), 10);
    assert_matches!(
        keys.next(Table::Annotation),
        Err(Rejection::KeyExhausted {
            table: Table::Annotation,
            ceiling: 10
        })
    );
    assert_eq!(keys.peek(Table::Annotation), 11);
}

#[test]
fn final_state_reports_last_key() {
    let mut keys = KeyAllocator::with_seeds(BTreeMap::from([(Table::Strain, 50)]), 1000);
    keys.next(Table::Strain).unwrap();
    keys.next(Table::Strain).unwrap();

    let state = keys.final_state();
    let strain = state.iter().find(|c| c.table == Table::Strain).unwrap();
    assert_eq!(strain.seed, 50);
    assert_eq!(strain.next, 52);
    assert_eq!(strain.last, Some(51));
    assert_eq!(strain.allocated, 2);

    let note = state.iter().find(|c| c.table == Table::Note).unwrap();
    assert_eq!(note.last, None);
    assert_eq!(note.allocated, 0);
}

#[test]
fn largest_key_space_exhausts_without_overflow() {
    let mut keys = KeyAllocator::with_seeds(BTreeMap::from([(Table::Strain, i64::MAX - 1)]), i64::MAX);
    assert_eq!(keys.next(Table::Strain).unwrap(), i64::MAX - 1);
    assert_matches!(
        keys.next(Table::Strain),
        Err(Rejection::KeyExhausted {
            table: Table::Strain,
            ..
        })
    );
    assert_matches!(keys.next(Table::Strain), Err(Rejection::KeyExhausted { .. }));
    assert_eq!(keys.allocated(Table::Strain), 1);
}
