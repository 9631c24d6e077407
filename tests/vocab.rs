mod common;

use strainload::config::Constants;
use strainload::domain::VocabDomain;
use strainload::vocab::VocabularyCache;

use common::CountingStore;

#[test]
fn first_lookup_loads_whole_domain_once() {
    let store = CountingStore::new();
    let mut cache = VocabularyCache::new(&Constants::default());
    assert!(!cache.is_populated(VocabDomain::StrainType));

    assert_eq!(
        cache
            .lookup(&store, VocabDomain::StrainType, "congenic")
            .unwrap(),
        Some(common::CONGENIC)
    );
    assert_eq!(
        cache
            .lookup(&store, VocabDomain::StrainType, "coisogenic")
            .unwrap(),
        Some(3410536)
    );
    assert_eq!(
        cache
            .lookup(&store, VocabDomain::StrainType, "unknowntype")
            .unwrap(),
        None
    );
    assert!(cache.is_populated(VocabDomain::StrainType));
    assert_eq!(store.term_queries(), 1);

    cache
        .lookup(&store, VocabDomain::Species, "laboratory mouse")
        .unwrap();
    assert_eq!(store.term_queries(), 2);
}

#[test]
fn lookups_are_exact_match() {
    let store = CountingStore::new();
    let mut cache = VocabularyCache::new(&Constants::default());
    assert_eq!(
        cache
            .lookup(&store, VocabDomain::StrainType, "Congenic")
            .unwrap(),
        None
    );
    assert_eq!(
        cache
            .lookup(&store, VocabDomain::StrainType, "congenic ")
            .unwrap(),
        None
    );
}

#[test]
fn populate_is_idempotent() {
    let store = CountingStore::new();
    let mut cache = VocabularyCache::new(&Constants::default());
    assert_eq!(cache.populate(&store, VocabDomain::AnnotationTerm).unwrap(), 2);
    assert_eq!(cache.populate(&store, VocabDomain::AnnotationTerm).unwrap(), 2);
    assert_eq!(store.term_queries(), 1);
}

#[test]
fn preloaded_domain_never_queries_store() {
    let store = CountingStore::new();
    let mut cache = VocabularyCache::new(&Constants::default());
    cache.preload(
        VocabDomain::Species,
        [("fixture mouse".to_string(), 42)],
    );

    assert_eq!(
        cache
            .lookup(&store, VocabDomain::Species, "fixture mouse")
            .unwrap(),
        Some(42)
    );
    assert_eq!(
        cache
            .lookup(&store, VocabDomain::Species, "laboratory mouse")
            .unwrap(),
        None
    );
    assert_eq!(store.term_queries(), 0);
}
