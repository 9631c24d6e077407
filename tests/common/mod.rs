#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use strainload::app::{ProgressEvent, ProgressSink, RunOptions};
use strainload::config::{AnnotationPolicy, Constants};
use strainload::domain::{Key, LoadMode, LoadVariant, Table};
use strainload::error::LoadError;
use strainload::store::{
    AccessionEntry, AlleleCellLineEntry, AlleleEntry, CellLineAllele, ReferenceStore, Snapshot,
    SnapshotStore, StrainEntry, TermEntry, UserEntry,
};
use strainload::validate::ValidationPolicy;

pub const STRAIN_SEED: Key = 100;
pub const STRAIN_MARKER_SEED: Key = 200;
pub const ACCESSION_SEED: Key = 300;
pub const MGI_SEED: Key = 5000;
pub const ANNOTATION_SEED: Key = 400;
pub const NOTE_SEED: Key = 700;

pub const CONGENIC: Key = 3410535;
pub const LAB_MOUSE: Key = 481207;
pub const ATTRIB1: Key = 4001;
pub const CLOSED_COLONY: Key = 4002;
pub const BOB: Key = 1001;

pub fn snapshot() -> Snapshot {
    let term = |vocab: Key, term: &str, key: Key| TermEntry {
        vocab,
        term: term.to_string(),
        key,
    };
    let allele = |key: Key, symbol: &str, marker_key: Option<Key>| AlleleEntry {
        key,
        symbol: symbol.to_string(),
        marker_key,
    };
    let accession = |acc_id: &str, mgi_type: Key, object_key: Key| AccessionEntry {
        acc_id: acc_id.to_string(),
        mgi_type,
        object_key,
    };
    let cell_line = |allele_key: Key, cell_line: &str| AlleleCellLineEntry {
        allele_key,
        cell_line: cell_line.to_string(),
    };

    Snapshot {
        terms: vec![
            term(55, "congenic", CONGENIC),
            term(55, "coisogenic", 3410536),
            term(26, "laboratory mouse", LAB_MOUSE),
            term(27, "attrib1", ATTRIB1),
            term(27, "closed colony", CLOSED_COLONY),
            term(31, "nomenclature", 615427),
        ],
        strains: vec![StrainEntry {
            key: 1,
            name: "C57BL/6J".to_string(),
        }],
        users: vec![
            UserEntry {
                key: BOB,
                login: "bob".to_string(),
            },
            UserEntry {
                key: 1002,
                login: "alice".to_string(),
            },
        ],
        accessions: vec![
            accession("ALL:123", 11, 500),
            accession("ALL:124", 11, 501),
            accession("ALL:777", 11, 502),
            accession("MGI:3028467", 10, 1),
        ],
        alleles: vec![
            allele(500, "Abc<tm1Bob>", Some(9)),
            allele(501, "Def<tm2Bob>", Some(10)),
            allele(502, "Ghi<Gt1>", None),
            allele(600, "Kit<tm1a(KOMP)Wtsi>", Some(20)),
            allele(601, "Kit<tm1b(KOMP)Wtsi>", Some(20)),
            allele(602, "Pax6<tm1a(KOMP)Wtsi>", Some(30)),
        ],
        allele_cell_lines: vec![
            cell_line(600, "EPD0001_1_A01"),
            cell_line(601, "EPD0001_1_A01"),
            cell_line(600, "EPD0003_1_C03"),
            cell_line(602, "EPD0003_1_C03"),
        ],
        key_seeds: BTreeMap::from([
            (Table::Strain, STRAIN_SEED),
            (Table::StrainMarker, STRAIN_MARKER_SEED),
            (Table::Accession, ACCESSION_SEED),
            (Table::MgiAccession, MGI_SEED),
            (Table::Annotation, ANNOTATION_SEED),
            (Table::Note, NOTE_SEED),
        ]),
    }
}

pub fn store() -> SnapshotStore {
    SnapshotStore::from_snapshot(snapshot())
}

pub fn policy(require_marker_resolution: bool) -> ValidationPolicy {
    ValidationPolicy {
        require_marker_resolution,
        annotation_policy: AnnotationPolicy::DropUnresolved,
    }
}

pub fn options(variant: LoadVariant) -> RunOptions {
    RunOptions {
        variant,
        mode: LoadMode::Load,
        policy: policy(variant.requires_marker()),
        key_ceiling: i32::MAX as Key,
        constants: Constants::default(),
    }
}

/// One line of the 14-column strain layout.
#[derive(Debug, Clone)]
pub struct StrainLine<'a> {
    pub external_id: &'a str,
    pub name: &'a str,
    pub alleles: &'a str,
    pub strain_type: &'a str,
    pub species: &'a str,
    pub standard: &'a str,
    pub origin_note: &'a str,
    pub logical_db: &'a str,
    pub mgi_type: &'a str,
    pub annotations: &'a str,
    pub created_by: &'a str,
    pub mutant_note: &'a str,
    pub private: &'a str,
    pub colony_note: &'a str,
}

impl Default for StrainLine<'_> {
    fn default() -> Self {
        Self {
            external_id: "MGI:5001",
            name: "StrainA",
            alleles: "ALL:123",
            strain_type: "congenic",
            species: "laboratory mouse",
            standard: "1",
            origin_note: "origin text",
            logical_db: "22",
            mgi_type: "10",
            annotations: " attrib1",
            created_by: "bob",
            mutant_note: "",
            private: "0",
            colony_note: "",
        }
    }
}

impl StrainLine<'_> {
    pub fn render(&self) -> String {
        [
            self.external_id,
            self.name,
            self.alleles,
            self.strain_type,
            self.species,
            self.standard,
            self.origin_note,
            self.logical_db,
            self.mgi_type,
            self.annotations,
            self.created_by,
            self.mutant_note,
            self.private,
            self.colony_note,
        ]
        .join("\t")
    }
}

/// One line of the 13-column KOMP layout.
#[derive(Debug, Clone)]
pub struct KompLine<'a> {
    pub external_id: &'a str,
    pub name: &'a str,
    pub allele: &'a str,
    pub cell_line: &'a str,
    pub criterion: &'a str,
}

impl Default for KompLine<'_> {
    fn default() -> Self {
        Self {
            external_id: "KOMP:0001",
            name: "B6N-Kit<tm1a>/Wtsi",
            allele: "",
            cell_line: "EPD0001_1_A01",
            criterion: "tm1a(KOMP)Wtsi",
        }
    }
}

impl KompLine<'_> {
    pub fn render(&self) -> String {
        [
            self.external_id,
            self.name,
            self.allele,
            "congenic",
            "laboratory mouse",
            "0",
            "",
            self.cell_line,
            "22",
            "10",
            "",
            self.criterion,
            "bob",
        ]
        .join("\t")
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub messages: Mutex<Vec<String>>,
}

impl ProgressSink for RecordingSink {
    fn event(&self, event: ProgressEvent) {
        self.messages.lock().unwrap().push(event.message);
    }
}

/// Store wrapper counting vocabulary queries.
pub struct CountingStore {
    pub inner: SnapshotStore,
    pub term_queries: Mutex<usize>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: store(),
            term_queries: Mutex::new(0),
        }
    }

    pub fn term_queries(&self) -> usize {
        *self.term_queries.lock().unwrap()
    }
}

impl ReferenceStore for CountingStore {
    fn terms(&self, vocab_key: Key) -> Result<Vec<(String, Key)>, LoadError> {
        *self.term_queries.lock().unwrap() += 1;
        self.inner.terms(vocab_key)
    }

    fn strain_by_name(&self, name: &str) -> Result<Option<Key>, LoadError> {
        self.inner.strain_by_name(name)
    }

    fn user_by_login(&self, login: &str) -> Result<Option<Key>, LoadError> {
        self.inner.user_by_login(login)
    }

    fn object_by_accession(&self, acc_id: &str, mgi_type: Key) -> Result<Option<Key>, LoadError> {
        self.inner.object_by_accession(acc_id, mgi_type)
    }

    fn marker_of_allele(&self, allele_key: Key) -> Result<Option<Key>, LoadError> {
        self.inner.marker_of_allele(allele_key)
    }

    fn alleles_by_cell_line(&self, cell_line: &str) -> Result<Vec<CellLineAllele>, LoadError> {
        self.inner.alleles_by_cell_line(cell_line)
    }

    fn key_seed(&self, table: Table) -> Result<Key, LoadError> {
        self.inner.key_seed(table)
    }
}
