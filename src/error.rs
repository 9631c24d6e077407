use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::{Key, Table};

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("invalid line ({line}): expected {expected} fields, found {found}")]
    #[diagnostic(help("fix the input file and resubmit it as a new run"))]
    MalformedLine {
        line: usize,
        expected: usize,
        found: usize,
        raw: String,
    },

    #[error("invalid load variant: {0}")]
    InvalidVariant(String),

    #[error("invalid processing mode: {0}")]
    InvalidMode(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("missing required setting: {0}")]
    MissingSetting(&'static str),

    #[error("could not open input file {0}")]
    InputOpen(String),

    #[error("failed to read input: {0}")]
    InputRead(String),

    #[error("failed to load snapshot {path}: {message}")]
    Snapshot { path: String, message: String },

    #[error("store query failed: {0}")]
    Store(String),

    #[error("no key seed available for {0}")]
    MissingKeySeed(Table),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("bulk load failed: {0}")]
    Commit(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Strain Already Exists: {0}")]
    StrainExists(String),

    #[error("Invalid Strain Type: {0}")]
    InvalidStrainType(String),

    #[error("Invalid Species: {0}")]
    InvalidSpecies(String),

    #[error("Invalid User: {0}")]
    InvalidUser(String),

    #[error("Invalid Qualifier: {0}")]
    InvalidQualifier(String),

    #[error("Invalid Strain: {0}")]
    UnknownStrain(String),

    #[error("Invalid Accession: {0:?}")]
    InvalidAccession(String),

    #[error("Invalid Allele: {0}")]
    UnresolvedAllele(String),

    #[error("cell line {cell_line:?} with symbol criterion {criterion:?} matched {matches} alleles")]
    CellLineMatch {
        cell_line: String,
        criterion: String,
        matches: usize,
    },

    #[error("no marker resolved for strain")]
    MissingMarker,

    #[error("no annotation term resolved: {0}")]
    NoResolvedAnnotations(String),

    #[error("invalid {field} key: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} contains the column delimiter: {value:?}")]
    InvalidCharacter { field: &'static str, value: String },

    #[error("invalid {field} flag: {value:?}")]
    InvalidFlag { field: &'static str, value: String },

    #[error("key space exhausted for {table} (ceiling {ceiling})")]
    KeyExhausted { table: Table, ceiling: Key },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    #[error("Invalid Term: {0}")]
    UnresolvedTerm(String),

    #[error("Invalid Allele: {0}")]
    UnresolvedAllele(String),

    #[error("allele {0} has no marker")]
    AlleleWithoutMarker(String),

    #[error("cell line {cell_line:?} with symbol criterion {criterion:?} matched {matches} alleles")]
    CellLineMatch {
        cell_line: String,
        criterion: String,
        matches: usize,
    },
}
