use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::domain::{Key, Table};
use crate::error::{LoadError, Rejection};
use crate::store::ReferenceStore;

#[derive(Debug, Clone)]
pub struct KeyAllocator {
    seeds: BTreeMap<Table, Key>,
    next: BTreeMap<Table, Key>,
    ceiling: Key,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCheckpoint(BTreeMap<Table, Key>);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterState {
    pub table: Table,
    pub seed: Key,
    pub next: Key,
    pub last: Option<Key>,
    pub allocated: Key,
}

impl KeyAllocator {
    pub fn seed<S>(store: &S, ceiling: Key) -> Result<Self, LoadError>
    where
        S: ReferenceStore + ?Sized,
    {
        let mut seeds = BTreeMap::new();
        for table in Table::ALL {
            let seed = store.key_seed(table)?;
            debug!(%table, seed, "key seed");
            seeds.insert(table, seed);
        }
        Ok(Self::with_seeds(seeds, ceiling))
    }

    pub fn with_seeds(seeds: BTreeMap<Table, Key>, ceiling: Key) -> Self {
        let seeds = Table::ALL
            .into_iter()
            .map(|table| (table, seeds.get(&table).copied().unwrap_or(1).max(1)))
            .collect::<BTreeMap<_, _>>();
        Self {
            next: seeds.clone(),
            seeds,
            ceiling,
        }
    }

    pub fn next(&mut self, table: Table) -> Result<Key, Rejection> {
        let slot = self.next.entry(table).or_insert(1);
        let key = *slot;
        let following = key.checked_add(1).filter(|_| key <= self.ceiling);
        let Some(following) = following else {
            return Err(Rejection::KeyExhausted {
                table,
                ceiling: self.ceiling,
            });
        };
        *slot = following;
        Ok(key)
    }

    pub fn peek(&self, table: Table) -> Key {
        self.next.get(&table).copied().unwrap_or(1)
    }

    pub fn allocated(&self, table: Table) -> Key {
        self.peek(table) - self.seeds.get(&table).copied().unwrap_or(1)
    }

    pub fn checkpoint(&self) -> KeyCheckpoint {
        KeyCheckpoint(self.next.clone())
    }

    pub fn rollback(&mut self, checkpoint: KeyCheckpoint) {
        self.next = checkpoint.0;
    }

    pub fn final_state(&self) -> Vec<CounterState> {
        Table::ALL
            .into_iter()
            .map(|table| {
                let seed = self.seeds.get(&table).copied().unwrap_or(1);
                let next = self.peek(table);
                CounterState {
                    table,
                    seed,
                    next,
                    last: (next > seed).then_some(next - 1),
                    allocated: next - seed,
                }
            })
            .collect()
    }
}
