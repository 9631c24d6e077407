use std::io::BufRead;

use crate::domain::{LoadVariant, split_list};
use crate::error::LoadError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputRecord {
    Strain(StrainInput),
    StrainAllele(StrainAlleleInput),
}

impl InputRecord {
    pub fn line(&self) -> usize {
        match self {
            InputRecord::Strain(input) => input.line,
            InputRecord::StrainAllele(input) => input.line,
        }
    }

    pub fn parse(line: usize, raw: &str, variant: LoadVariant) -> Result<Self, LoadError> {
        let trimmed = raw.trim_end_matches(['\n', '\r']);
        let fields = trimmed.split('\t').collect::<Vec<_>>();
        let expected = variant.field_count();
        if fields.len() < expected {
            return Err(LoadError::MalformedLine {
                line,
                expected,
                found: fields.len(),
                raw: trimmed.to_string(),
            });
        }

        let field = |idx: usize| fields[idx].to_string();
        let record = match variant {
            LoadVariant::Strain => InputRecord::Strain(StrainInput {
                line,
                external_id: field(0),
                name: field(1),
                allele_ids: split_list(fields[2]),
                strain_type: field(3),
                species: field(4),
                standard: field(5),
                origin_note: field(6),
                external_logical_db: field(7),
                external_mgi_type: field(8),
                annotations: split_list(fields[9]),
                created_by: field(10),
                mutant_note: field(11),
                private: Some(field(12)),
                colony_note: field(13),
                symbol_criterion: None,
            }),
            LoadVariant::Komp => InputRecord::Strain(StrainInput {
                line,
                external_id: field(0),
                name: field(1),
                allele_ids: split_list(fields[2]),
                strain_type: field(3),
                species: field(4),
                standard: field(5),
                origin_note: field(6),
                mutant_note: field(7),
                external_logical_db: field(8),
                external_mgi_type: field(9),
                annotations: split_list(fields[10]),
                symbol_criterion: Some(field(11)).filter(|value| !value.trim().is_empty()),
                created_by: field(12),
                private: None,
                colony_note: String::new(),
            }),
            LoadVariant::StrainAllele => InputRecord::StrainAllele(StrainAlleleInput {
                line,
                strain_id: field(0),
                allele_id: field(1),
                qualifier: field(2),
                created_by: field(3),
            }),
        };
        Ok(record)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrainInput {
    pub line: usize,
    pub external_id: String,
    pub name: String,
    pub allele_ids: Vec<String>,
    pub strain_type: String,
    pub species: String,
    pub standard: String,
    pub origin_note: String,
    pub mutant_note: String,
    pub colony_note: String,
    pub external_logical_db: String,
    pub external_mgi_type: String,
    pub annotations: Vec<String>,
    pub created_by: String,
    pub private: Option<String>,
    pub symbol_criterion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrainAlleleInput {
    pub line: usize,
    pub strain_id: String,
    pub allele_id: String,
    pub qualifier: String,
    pub created_by: String,
}

pub struct InputReader<R: BufRead> {
    reader: R,
    variant: LoadVariant,
    line: usize,
    buffer: String,
}

impl<R: BufRead> InputReader<R> {
    pub fn new(reader: R, variant: LoadVariant) -> Self {
        Self {
            reader,
            variant,
            line: 0,
            buffer: String::new(),
        }
    }

    pub fn lines_read(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for InputReader<R> {
    type Item = Result<InputRecord, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buffer.clear();
            match self.reader.read_line(&mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line += 1;
                    if self.buffer.trim_end_matches(['\n', '\r']).is_empty() {
                        continue;
                    }
                    return Some(InputRecord::parse(self.line, &self.buffer, self.variant));
                }
                Err(err) => return Some(Err(LoadError::InputRead(err.to_string()))),
            }
        }
    }
}
