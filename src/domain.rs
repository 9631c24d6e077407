use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{LoadError, Rejection};

pub type Key = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LoadVariant {
    Strain,
    Komp,
    StrainAllele,
}

impl LoadVariant {
    pub fn field_count(self) -> usize {
        match self {
            LoadVariant::Strain => 14,
            LoadVariant::Komp => 13,
            LoadVariant::StrainAllele => 4,
        }
    }

    pub fn requires_marker(self) -> bool {
        match self {
            LoadVariant::Strain => false,
            LoadVariant::Komp | LoadVariant::StrainAllele => true,
        }
    }
}

impl fmt::Display for LoadVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadVariant::Strain => write!(f, "strain"),
            LoadVariant::Komp => write!(f, "komp"),
            LoadVariant::StrainAllele => write!(f, "strain-allele"),
        }
    }
}

impl FromStr for LoadVariant {
    type Err = LoadError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strain" => Ok(LoadVariant::Strain),
            "komp" => Ok(LoadVariant::Komp),
            "strain-allele" | "strainallele" => Ok(LoadVariant::StrainAllele),
            _ => Err(LoadError::InvalidVariant(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    #[default]
    Load,
    Preview,
}

impl FromStr for LoadMode {
    type Err = LoadError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "load" => Ok(LoadMode::Load),
            "preview" => Ok(LoadMode::Preview),
            _ => Err(LoadError::InvalidMode(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VocabDomain {
    Species,
    StrainType,
    AnnotationTerm,
    Qualifier,
}

impl fmt::Display for VocabDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VocabDomain::Species => write!(f, "species"),
            VocabDomain::StrainType => write!(f, "strain type"),
            VocabDomain::AnnotationTerm => write!(f, "annotation term"),
            VocabDomain::Qualifier => write!(f, "qualifier"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Strain,
    StrainMarker,
    Accession,
    MgiAccession,
    Annotation,
    Note,
}

impl Table {
    pub const ALL: [Table; 6] = [
        Table::Strain,
        Table::StrainMarker,
        Table::Accession,
        Table::MgiAccession,
        Table::Annotation,
        Table::Note,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::Strain => "PRB_Strain",
            Table::StrainMarker => "PRB_Strain_Marker",
            Table::Accession => "ACC_Accession",
            Table::MgiAccession => "ACC_AccessionMax",
            Table::Annotation => "VOC_Annot",
            Table::Note => "MGI_Note",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessionId {
    raw: String,
    prefix: String,
    numeric: Option<u64>,
}

impl AccessionId {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn numeric(&self) -> Option<u64> {
        self.numeric
    }
}

impl fmt::Display for AccessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl FromStr for AccessionId {
    type Err = Rejection;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let raw = value.trim().to_string();
        if raw.is_empty() {
            return Err(Rejection::InvalidAccession(value.to_string()));
        }
        let prefix = raw.trim_end_matches(|ch: char| ch.is_ascii_digit());
        let digits = &raw[prefix.len()..];
        match digits.parse::<u64>() {
            Ok(numeric) => Ok(Self {
                prefix: prefix.to_string(),
                numeric: Some(numeric),
                raw,
            }),
            _ => Ok(Self {
                prefix: raw.clone(),
                numeric: None,
                raw,
            }),
        }
    }
}

pub fn parse_flag(field: &'static str, value: &str) -> Result<bool, Rejection> {
    match value.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(Rejection::InvalidFlag {
            field,
            value: value.to_string(),
        }),
    }
}

pub fn expand_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

pub fn split_list(value: &str) -> Vec<String> {
    value
        .split('|')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
