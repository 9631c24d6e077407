use std::fmt::Write as _;

use serde::Serialize;

use crate::config::Constants;
use crate::domain::{Key, Table};
use crate::error::Rejection;
use crate::keys::KeyAllocator;
use crate::validate::{MarkerAssociation, NoteText, StrainRecord, ValidRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFile {
    Strain,
    StrainMarker,
    Accession,
    Annotation,
    Note,
    NoteChunk,
}

impl OutputFile {
    pub const ALL: [OutputFile; 6] = [
        OutputFile::Strain,
        OutputFile::StrainMarker,
        OutputFile::Accession,
        OutputFile::Annotation,
        OutputFile::Note,
        OutputFile::NoteChunk,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            OutputFile::Strain => "PRB_Strain",
            OutputFile::StrainMarker => "PRB_Strain_Marker",
            OutputFile::Accession => "ACC_Accession",
            OutputFile::Annotation => "VOC_Annot",
            OutputFile::Note => "MGI_Note",
            OutputFile::NoteChunk => "MGI_NoteChunk",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.bcp", self.table_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrainRow {
    pub key: Key,
    pub species_key: Key,
    pub strain_type_key: Key,
    pub name: String,
    pub is_standard: bool,
    pub is_private: bool,
    pub is_genetic_background: bool,
    pub created_by_key: Key,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrainMarkerRow {
    pub key: Key,
    pub strain_key: Key,
    pub marker_key: Key,
    pub allele_key: Option<Key>,
    pub qualifier_key: Key,
    pub created_by_key: Key,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessionRow {
    pub key: Key,
    pub acc_id: String,
    pub prefix: String,
    pub numeric: Option<u64>,
    pub logical_db_key: Key,
    pub object_key: Key,
    pub mgi_type_key: Key,
    pub is_private: bool,
    pub is_preferred: bool,
    pub created_by_key: Key,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRow {
    pub key: Key,
    pub object_key: Key,
    pub mgi_type_key: Key,
    pub note_type_key: Key,
    pub created_by_key: Key,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteChunkRow {
    pub note_key: Key,
    pub sequence: u32,
    pub text: String,
    pub created_by_key: Key,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRow {
    pub key: Key,
    pub annot_type_key: Key,
    pub object_key: Key,
    pub term_key: Key,
    pub qualifier_key: Key,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRows {
    pub strains: Vec<StrainRow>,
    pub strain_markers: Vec<StrainMarkerRow>,
    pub accessions: Vec<AccessionRow>,
    pub annotations: Vec<AnnotationRow>,
    pub notes: Vec<NoteRow>,
    pub note_chunks: Vec<NoteChunkRow>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RowCounts {
    pub strains: usize,
    pub strain_markers: usize,
    pub accessions: usize,
    pub annotations: usize,
    pub notes: usize,
    pub note_chunks: usize,
}

impl TableRows {
    pub fn counts(&self) -> RowCounts {
        RowCounts {
            strains: self.strains.len(),
            strain_markers: self.strain_markers.len(),
            accessions: self.accessions.len(),
            annotations: self.annotations.len(),
            notes: self.notes.len(),
            note_chunks: self.note_chunks.len(),
        }
    }

    fn append(&mut self, mut other: TableRows) {
        self.strains.append(&mut other.strains);
        self.strain_markers.append(&mut other.strain_markers);
        self.accessions.append(&mut other.accessions);
        self.annotations.append(&mut other.annotations);
        self.notes.append(&mut other.notes);
        self.note_chunks.append(&mut other.note_chunks);
    }

    pub fn render(&self, file: OutputFile, date: &str) -> String {
        let mut out = String::new();
        match file {
            OutputFile::Strain => {
                for row in &self.strains {
                    let _ = writeln!(
                        out,
                        "{}|{}|{}|{}|{}|{}|{}|{}|{}|{date}|{date}",
                        row.key,
                        row.species_key,
                        row.strain_type_key,
                        row.name,
                        flag(row.is_standard),
                        flag(row.is_private),
                        flag(row.is_genetic_background),
                        row.created_by_key,
                        row.created_by_key,
                    );
                }
            }
            OutputFile::StrainMarker => {
                for row in &self.strain_markers {
                    let _ = writeln!(
                        out,
                        "{}|{}|{}|{}|{}|{}|{}|{date}|{date}",
                        row.key,
                        row.strain_key,
                        row.marker_key,
                        optional(row.allele_key),
                        row.qualifier_key,
                        row.created_by_key,
                        row.created_by_key,
                    );
                }
            }
            OutputFile::Accession => {
                for row in &self.accessions {
                    let _ = writeln!(
                        out,
                        "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{date}|{date}",
                        row.key,
                        row.acc_id,
                        row.prefix,
                        optional(row.numeric),
                        row.logical_db_key,
                        row.object_key,
                        row.mgi_type_key,
                        flag(row.is_private),
                        flag(row.is_preferred),
                        row.created_by_key,
                        row.created_by_key,
                    );
                }
            }
            OutputFile::Annotation => {
                for row in &self.annotations {
                    let _ = writeln!(
                        out,
                        "{}|{}|{}|{}|{}|{date}|{date}",
                        row.key, row.annot_type_key, row.object_key, row.term_key, row.qualifier_key,
                    );
                }
            }
            OutputFile::Note => {
                for row in &self.notes {
                    let _ = writeln!(
                        out,
                        "{}|{}|{}|{}|{}|{}|{date}|{date}",
                        row.key,
                        row.object_key,
                        row.mgi_type_key,
                        row.note_type_key,
                        row.created_by_key,
                        row.created_by_key,
                    );
                }
            }
            OutputFile::NoteChunk => {
                for row in &self.note_chunks {
                    let _ = writeln!(
                        out,
                        "{}|{}|{}|{}|{}|{date}|{date}",
                        row.note_key, row.sequence, row.text, row.created_by_key, row.created_by_key,
                    );
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitted {
    pub strain_key: Key,
    pub rows: RowCounts,
}

#[derive(Debug, Clone)]
pub struct MultiTableWriter {
    constants: Constants,
    staged: TableRows,
}

impl MultiTableWriter {
    pub fn new(constants: Constants) -> Self {
        Self {
            constants,
            staged: TableRows::default(),
        }
    }

    pub fn staged(&self) -> &TableRows {
        &self.staged
    }

    pub fn into_staged(self) -> TableRows {
        self.staged
    }

    pub fn emit(
        &mut self,
        record: &ValidRecord,
        keys: &mut KeyAllocator,
    ) -> Result<Emitted, Rejection> {
        let checkpoint = keys.checkpoint();
        let built = match record {
            ValidRecord::Strain {
                strain,
                associations,
                notes,
                annotations,
                ..
            } => self.build_strain(strain, associations, notes, annotations, keys),
            ValidRecord::Association {
                strain_key,
                association,
                created_by_key,
                ..
            } => build_association(*strain_key, association, *created_by_key, keys),
        };
        match built {
            Ok((strain_key, rows)) => {
                let counts = rows.counts();
                self.staged.append(rows);
                Ok(Emitted {
                    strain_key,
                    rows: counts,
                })
            }
            Err(rejection) => {
                keys.rollback(checkpoint);
                Err(rejection)
            }
        }
    }

    fn build_strain(
        &self,
        strain: &StrainRecord,
        associations: &[MarkerAssociation],
        notes: &[NoteText],
        annotations: &[Key],
        keys: &mut KeyAllocator,
    ) -> Result<(Key, TableRows), Rejection> {
        let constants = &self.constants;
        let created_by_key = strain.created_by_key;
        let mut rows = TableRows::default();

        let strain_key = keys.next(Table::Strain)?;
        rows.strains.push(StrainRow {
            key: strain_key,
            species_key: strain.species_key,
            strain_type_key: strain.strain_type_key,
            name: strain.name.clone(),
            is_standard: strain.is_standard,
            is_private: strain.is_private,
            is_genetic_background: strain.is_genetic_background,
            created_by_key,
        });

        for association in associations {
            rows.strain_markers.push(StrainMarkerRow {
                key: keys.next(Table::StrainMarker)?,
                strain_key,
                marker_key: association.marker_key,
                allele_key: association.allele_key,
                qualifier_key: association.qualifier_key,
                created_by_key,
            });
        }

        let mgi_numeric = keys.next(Table::MgiAccession)?;
        rows.accessions.push(AccessionRow {
            key: keys.next(Table::Accession)?,
            acc_id: format!("{}{mgi_numeric}", constants.mgi_prefix),
            prefix: constants.mgi_prefix.clone(),
            numeric: u64::try_from(mgi_numeric).ok(),
            logical_db_key: constants.mgi_logical_db,
            object_key: strain_key,
            mgi_type_key: constants.strain_mgi_type,
            is_private: false,
            is_preferred: true,
            created_by_key,
        });
        rows.accessions.push(AccessionRow {
            key: keys.next(Table::Accession)?,
            acc_id: strain.external_id.as_str().to_string(),
            prefix: strain.external_id.prefix().to_string(),
            numeric: strain.external_id.numeric(),
            logical_db_key: strain.external_logical_db,
            object_key: strain_key,
            mgi_type_key: strain.external_mgi_type,
            is_private: false,
            is_preferred: true,
            created_by_key,
        });

        for note in notes {
            let note_key = keys.next(Table::Note)?;
            rows.notes.push(NoteRow {
                key: note_key,
                object_key: strain_key,
                mgi_type_key: constants.note_owner_type,
                note_type_key: note.note_type_key,
                created_by_key,
            });
            rows.note_chunks.push(NoteChunkRow {
                note_key,
                sequence: 1,
                text: note.text.clone(),
                created_by_key,
            });
        }

        for term_key in annotations {
            rows.annotations.push(AnnotationRow {
                key: keys.next(Table::Annotation)?,
                annot_type_key: constants.annotation_type,
                object_key: strain_key,
                term_key: *term_key,
                qualifier_key: constants.annotation_qualifier,
            });
        }

        Ok((strain_key, rows))
    }
}

fn build_association(
    strain_key: Key,
    association: &MarkerAssociation,
    created_by_key: Key,
    keys: &mut KeyAllocator,
) -> Result<(Key, TableRows), Rejection> {
    let mut rows = TableRows::default();
    rows.strain_markers.push(StrainMarkerRow {
        key: keys.next(Table::StrainMarker)?,
        strain_key,
        marker_key: association.marker_key,
        allele_key: association.allele_key,
        qualifier_key: association.qualifier_key,
        created_by_key,
    });
    Ok((strain_key, rows))
}

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}
