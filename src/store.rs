use std::collections::{BTreeMap, HashMap};
use std::fs;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Key, Table};
use crate::error::LoadError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellLineAllele {
    pub allele_key: Key,
    pub marker_key: Option<Key>,
    pub symbol: String,
}

pub trait ReferenceStore: Send + Sync {
    fn terms(&self, vocab_key: Key) -> Result<Vec<(String, Key)>, LoadError>;
    fn strain_by_name(&self, name: &str) -> Result<Option<Key>, LoadError>;
    fn user_by_login(&self, login: &str) -> Result<Option<Key>, LoadError>;
    fn object_by_accession(&self, acc_id: &str, mgi_type: Key) -> Result<Option<Key>, LoadError>;
    fn marker_of_allele(&self, allele_key: Key) -> Result<Option<Key>, LoadError>;
    fn alleles_by_cell_line(&self, cell_line: &str) -> Result<Vec<CellLineAllele>, LoadError>;
    fn key_seed(&self, table: Table) -> Result<Key, LoadError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub terms: Vec<TermEntry>,
    #[serde(default)]
    pub strains: Vec<StrainEntry>,
    #[serde(default)]
    pub users: Vec<UserEntry>,
    #[serde(default)]
    pub accessions: Vec<AccessionEntry>,
    #[serde(default)]
    pub alleles: Vec<AlleleEntry>,
    #[serde(default)]
    pub allele_cell_lines: Vec<AlleleCellLineEntry>,
    #[serde(default)]
    pub key_seeds: BTreeMap<Table, Key>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermEntry {
    pub vocab: Key,
    pub term: String,
    pub key: Key,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrainEntry {
    pub key: Key,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEntry {
    pub key: Key,
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessionEntry {
    pub acc_id: String,
    pub mgi_type: Key,
    pub object_key: Key,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlleleEntry {
    pub key: Key,
    pub symbol: String,
    #[serde(default)]
    pub marker_key: Option<Key>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlleleCellLineEntry {
    pub allele_key: Key,
    pub cell_line: String,
}

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    terms: HashMap<Key, Vec<(String, Key)>>,
    strains: HashMap<String, Key>,
    users: HashMap<String, Key>,
    accessions: HashMap<(String, Key), Key>,
    alleles: HashMap<Key, AlleleEntry>,
    cell_lines: HashMap<String, Vec<Key>>,
    key_seeds: BTreeMap<Table, Key>,
}

impl SnapshotStore {
    pub fn open(path: &Utf8Path) -> Result<Self, LoadError> {
        let content = fs::read_to_string(path.as_std_path()).map_err(|err| LoadError::Snapshot {
            path: path.to_string(),
            message: err.to_string(),
        })?;
        let snapshot: Snapshot =
            serde_json::from_str(&content).map_err(|err| LoadError::Snapshot {
                path: path.to_string(),
                message: err.to_string(),
            })?;
        debug!(
            %path,
            strains = snapshot.strains.len(),
            alleles = snapshot.alleles.len(),
            "snapshot loaded"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut terms = HashMap::<Key, Vec<(String, Key)>>::new();
        for row in snapshot.terms {
            terms.entry(row.vocab).or_default().push((row.term, row.key));
        }

        let mut cell_lines = HashMap::<String, Vec<Key>>::new();
        for row in snapshot.allele_cell_lines {
            cell_lines.entry(row.cell_line).or_default().push(row.allele_key);
        }

        Self {
            terms,
            strains: snapshot
                .strains
                .into_iter()
                .map(|row| (row.name, row.key))
                .collect(),
            users: snapshot
                .users
                .into_iter()
                .map(|row| (row.login, row.key))
                .collect(),
            accessions: snapshot
                .accessions
                .into_iter()
                .map(|row| ((row.acc_id, row.mgi_type), row.object_key))
                .collect(),
            alleles: snapshot
                .alleles
                .into_iter()
                .map(|row| (row.key, row))
                .collect(),
            cell_lines,
            key_seeds: snapshot.key_seeds,
        }
    }
}

impl ReferenceStore for SnapshotStore {
    fn terms(&self, vocab_key: Key) -> Result<Vec<(String, Key)>, LoadError> {
        Ok(self.terms.get(&vocab_key).cloned().unwrap_or_default())
    }

    fn strain_by_name(&self, name: &str) -> Result<Option<Key>, LoadError> {
        Ok(self.strains.get(name).copied())
    }

    fn user_by_login(&self, login: &str) -> Result<Option<Key>, LoadError> {
        Ok(self.users.get(login).copied())
    }

    fn object_by_accession(&self, acc_id: &str, mgi_type: Key) -> Result<Option<Key>, LoadError> {
        Ok(self
            .accessions
            .get(&(acc_id.to_string(), mgi_type))
            .copied())
    }

    fn marker_of_allele(&self, allele_key: Key) -> Result<Option<Key>, LoadError> {
        Ok(self.alleles.get(&allele_key).and_then(|row| row.marker_key))
    }

    fn alleles_by_cell_line(&self, cell_line: &str) -> Result<Vec<CellLineAllele>, LoadError> {
        let Some(keys) = self.cell_lines.get(cell_line) else {
            return Ok(Vec::new());
        };
        Ok(keys
            .iter()
            .filter_map(|key| self.alleles.get(key))
            .map(|row| CellLineAllele {
                allele_key: row.key,
                marker_key: row.marker_key,
                symbol: row.symbol.clone(),
            })
            .collect())
    }

    fn key_seed(&self, table: Table) -> Result<Key, LoadError> {
        self.key_seeds
            .get(&table)
            .copied()
            .ok_or(LoadError::MissingKeySeed(table))
    }
}
