use std::collections::HashMap;

use tracing::debug;

use crate::config::Constants;
use crate::domain::{Key, VocabDomain};
use crate::error::LoadError;
use crate::store::ReferenceStore;

#[derive(Debug, Clone)]
pub struct VocabularyCache {
    vocab_keys: HashMap<VocabDomain, Key>,
    domains: HashMap<VocabDomain, HashMap<String, Key>>,
}

impl VocabularyCache {
    pub fn new(constants: &Constants) -> Self {
        let vocab_keys = [
            VocabDomain::Species,
            VocabDomain::StrainType,
            VocabDomain::AnnotationTerm,
            VocabDomain::Qualifier,
        ]
        .into_iter()
        .map(|domain| (domain, constants.vocab_key(domain)))
        .collect();
        Self {
            vocab_keys,
            domains: HashMap::new(),
        }
    }

    pub fn preload<I>(&mut self, domain: VocabDomain, terms: I)
    where
        I: IntoIterator<Item = (String, Key)>,
    {
        self.domains.insert(domain, terms.into_iter().collect());
    }

    pub fn is_populated(&self, domain: VocabDomain) -> bool {
        self.domains.contains_key(&domain)
    }

    pub fn populate<S>(&mut self, store: &S, domain: VocabDomain) -> Result<usize, LoadError>
    where
        S: ReferenceStore + ?Sized,
    {
        if let Some(terms) = self.domains.get(&domain) {
            return Ok(terms.len());
        }
        let vocab_key = self.vocab_keys[&domain];
        let terms = store
            .terms(vocab_key)?
            .into_iter()
            .collect::<HashMap<_, _>>();
        debug!(%domain, vocab_key, terms = terms.len(), "vocabulary loaded");
        let count = terms.len();
        self.domains.insert(domain, terms);
        Ok(count)
    }

    pub fn lookup<S>(
        &mut self,
        store: &S,
        domain: VocabDomain,
        term: &str,
    ) -> Result<Option<Key>, LoadError>
    where
        S: ReferenceStore + ?Sized,
    {
        self.populate(store, domain)?;
        Ok(self
            .domains
            .get(&domain)
            .and_then(|terms| terms.get(term))
            .copied())
    }
}
