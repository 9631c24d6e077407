use std::collections::{HashMap, HashSet};

use crate::config::{AnnotationPolicy, Constants, ResolvedConfig};
use crate::domain::{AccessionId, Key, VocabDomain, expand_newlines, parse_flag};
use crate::error::{LoadError, Rejection, Warning};
use crate::input::{InputRecord, StrainAlleleInput, StrainInput};
use crate::resolver::{CellLineQuery, ReferenceResolver, Resolution, ResolvedAllele};
use crate::store::ReferenceStore;
use crate::vocab::VocabularyCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub require_marker_resolution: bool,
    pub annotation_policy: AnnotationPolicy,
}

impl ValidationPolicy {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            require_marker_resolution: config.require_marker_resolution,
            annotation_policy: config.annotation_policy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrainRecord {
    pub external_id: AccessionId,
    pub external_logical_db: Key,
    pub external_mgi_type: Key,
    pub name: String,
    pub strain_type_key: Key,
    pub species_key: Key,
    pub is_standard: bool,
    pub is_private: bool,
    pub is_genetic_background: bool,
    pub created_by_key: Key,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerAssociation {
    pub marker_key: Key,
    pub allele_key: Option<Key>,
    pub qualifier_key: Key,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteText {
    pub note_type_key: Key,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidRecord {
    Strain {
        line: usize,
        strain: StrainRecord,
        associations: Vec<MarkerAssociation>,
        notes: Vec<NoteText>,
        annotations: Vec<Key>,
    },
    Association {
        line: usize,
        strain_key: Key,
        association: MarkerAssociation,
        created_by_key: Key,
    },
}

impl ValidRecord {
    pub fn line(&self) -> usize {
        match self {
            ValidRecord::Strain { line, .. } | ValidRecord::Association { line, .. } => *line,
        }
    }

    pub fn strain_name(&self) -> Option<&str> {
        match self {
            ValidRecord::Strain { strain, .. } => Some(&strain.name),
            ValidRecord::Association { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid {
        record: ValidRecord,
        warnings: Vec<Warning>,
    },
    Invalid {
        line: usize,
        reasons: Vec<Rejection>,
        warnings: Vec<Warning>,
    },
}

pub struct RecordValidator<'s, S: ReferenceStore + ?Sized> {
    store: &'s S,
    vocab: VocabularyCache,
    resolver: ReferenceResolver<'s, S>,
    policy: ValidationPolicy,
    constants: Constants,
    loaded_names: HashSet<String>,
    users: HashMap<String, Option<Key>>,
}

impl<'s, S: ReferenceStore + ?Sized> RecordValidator<'s, S> {
    pub fn new(store: &'s S, policy: ValidationPolicy, constants: Constants) -> Self {
        let vocab = VocabularyCache::new(&constants);
        Self::with_vocabulary(store, vocab, policy, constants)
    }

    pub fn with_vocabulary(
        store: &'s S,
        vocab: VocabularyCache,
        policy: ValidationPolicy,
        constants: Constants,
    ) -> Self {
        Self {
            store,
            vocab,
            resolver: ReferenceResolver::new(store, constants.allele_mgi_type),
            policy,
            constants,
            loaded_names: HashSet::new(),
            users: HashMap::new(),
        }
    }

    pub fn vocabulary(&self) -> &VocabularyCache {
        &self.vocab
    }

    pub fn mark_loaded(&mut self, name: &str) {
        self.loaded_names.insert(name.to_string());
    }

    pub fn validate(&mut self, record: &InputRecord) -> Result<Validation, LoadError> {
        match record {
            InputRecord::Strain(input) => self.validate_strain(input),
            InputRecord::StrainAllele(input) => self.validate_association(input),
        }
    }

    fn validate_strain(&mut self, input: &StrainInput) -> Result<Validation, LoadError> {
        let mut reasons = Vec::new();
        let mut warnings = Vec::new();

        if self.name_exists(&input.name)? {
            reasons.push(Rejection::StrainExists(input.name.clone()));
        }
        let strain_type_key = self
            .vocab
            .lookup(self.store, VocabDomain::StrainType, &input.strain_type)?;
        if strain_type_key.is_none() {
            reasons.push(Rejection::InvalidStrainType(input.strain_type.clone()));
        }
        let species_key = self
            .vocab
            .lookup(self.store, VocabDomain::Species, &input.species)?;
        if species_key.is_none() {
            reasons.push(Rejection::InvalidSpecies(input.species.clone()));
        }
        let created_by_key = self.user_key(&input.created_by)?;
        if created_by_key.is_none() {
            reasons.push(Rejection::InvalidUser(input.created_by.clone()));
        }

        let is_standard = check(parse_flag("standard", &input.standard), &mut reasons);
        let is_private = check(
            input
                .private
                .as_deref()
                .map_or(Ok(false), |value| parse_flag("private", value)),
            &mut reasons,
        );
        let external_id = check(input.external_id.parse::<AccessionId>(), &mut reasons);
        let external_logical_db = check(
            parse_key("external logical db", &input.external_logical_db),
            &mut reasons,
        );
        let external_mgi_type = check(
            parse_key("external MGI type", &input.external_mgi_type),
            &mut reasons,
        );

        for (field, value) in [
            ("strain name", &input.name),
            ("external id", &input.external_id),
            ("origin note", &input.origin_note),
            ("mutant note", &input.mutant_note),
            ("colony note", &input.colony_note),
        ] {
            if value.contains(COLUMN_DELIMITER) {
                reasons.push(Rejection::InvalidCharacter {
                    field,
                    value: value.clone(),
                });
            }
        }

        let associations = self.resolve_markers(input, &mut reasons, &mut warnings)?;
        let annotations = self.resolve_annotations(&input.annotations, &mut reasons, &mut warnings)?;

        let (
            Some(strain_type_key),
            Some(species_key),
            Some(created_by_key),
            Some(is_standard),
            Some(is_private),
            Some(external_id),
            Some(external_logical_db),
            Some(external_mgi_type),
            true,
        ) = (
            strain_type_key,
            species_key,
            created_by_key,
            is_standard,
            is_private,
            external_id,
            external_logical_db,
            external_mgi_type,
            reasons.is_empty(),
        )
        else {
            return Ok(Validation::Invalid {
                line: input.line,
                reasons,
                warnings,
            });
        };

        let notes = [
            (self.constants.origin_note_type, &input.origin_note),
            (self.constants.mutant_note_type, &input.mutant_note),
            (self.constants.colony_note_type, &input.colony_note),
        ]
        .into_iter()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(note_type_key, text)| NoteText {
            note_type_key,
            text: expand_newlines(text),
        })
        .collect();

        Ok(Validation::Valid {
            record: ValidRecord::Strain {
                line: input.line,
                strain: StrainRecord {
                    external_id,
                    external_logical_db,
                    external_mgi_type,
                    name: input.name.clone(),
                    strain_type_key,
                    species_key,
                    is_standard,
                    is_private,
                    is_genetic_background: false,
                    created_by_key,
                },
                associations,
                notes,
                annotations,
            },
            warnings,
        })
    }

    fn validate_association(&mut self, input: &StrainAlleleInput) -> Result<Validation, LoadError> {
        let mut reasons = Vec::new();

        let strain_key = self
            .store
            .object_by_accession(input.strain_id.trim(), self.constants.strain_mgi_type)?;
        if strain_key.is_none() {
            reasons.push(Rejection::UnknownStrain(input.strain_id.clone()));
        }

        let allele = match self.resolver.resolve_by_identifier(&input.allele_id)? {
            Resolution::Resolved(ResolvedAllele {
                allele_key,
                marker_key: Some(marker_key),
            }) if marker_key != 0 => Some((allele_key, marker_key)),
            Resolution::Resolved(_) => {
                reasons.push(Rejection::MissingMarker);
                None
            }
            Resolution::NotFound | Resolution::NotUnique(_) => {
                reasons.push(Rejection::UnresolvedAllele(input.allele_id.clone()));
                None
            }
        };

        let qualifier_key = self
            .vocab
            .lookup(self.store, VocabDomain::Qualifier, &input.qualifier)?;
        if qualifier_key.is_none() {
            reasons.push(Rejection::InvalidQualifier(input.qualifier.clone()));
        }
        let created_by_key = self.user_key(&input.created_by)?;
        if created_by_key.is_none() {
            reasons.push(Rejection::InvalidUser(input.created_by.clone()));
        }

        match (strain_key, allele, qualifier_key, created_by_key) {
            (Some(strain_key), Some((allele_key, marker_key)), Some(qualifier_key), Some(created_by_key)) => {
                Ok(Validation::Valid {
                    record: ValidRecord::Association {
                        line: input.line,
                        strain_key,
                        association: MarkerAssociation {
                            marker_key,
                            allele_key: Some(allele_key),
                            qualifier_key,
                        },
                        created_by_key,
                    },
                    warnings: Vec::new(),
                })
            }
            _ => Ok(Validation::Invalid {
                line: input.line,
                reasons,
                warnings: Vec::new(),
            }),
        }
    }

    fn name_exists(&self, name: &str) -> Result<bool, LoadError> {
        if self.loaded_names.contains(name) {
            return Ok(true);
        }
        Ok(self.store.strain_by_name(name)?.is_some())
    }

    fn user_key(&mut self, login: &str) -> Result<Option<Key>, LoadError> {
        if let Some(key) = self.users.get(login) {
            return Ok(*key);
        }
        let key = self.store.user_by_login(login)?;
        self.users.insert(login.to_string(), key);
        Ok(key)
    }

    fn resolve_markers(
        &self,
        input: &StrainInput,
        reasons: &mut Vec<Rejection>,
        warnings: &mut Vec<Warning>,
    ) -> Result<Vec<MarkerAssociation>, LoadError> {
        let qualifier_key = self.constants.nomenclature_qualifier;
        let mut associations = Vec::new();
        let mut unresolved = Vec::new();
        let mut resolved_any = false;

        for allele_id in &input.allele_ids {
            match self.resolver.resolve_by_identifier(allele_id)? {
                Resolution::Resolved(allele) => {
                    resolved_any = true;
                    push_association(&mut associations, warnings, allele_id, allele, qualifier_key);
                }
                Resolution::NotFound | Resolution::NotUnique(_) => unresolved.push(allele_id.clone()),
            }
        }

        let mut cell_line_failure = None;
        if let (false, Some(criterion)) = (resolved_any, input.symbol_criterion.as_deref()) {
            let query = CellLineQuery {
                cell_line: &input.mutant_note,
                criterion,
            };
            match self.resolver.resolve_by_pattern(query)? {
                Resolution::Resolved(allele) => {
                    unresolved.clear();
                    push_association(
                        &mut associations,
                        warnings,
                        input.mutant_note.trim(),
                        allele,
                        qualifier_key,
                    );
                }
                Resolution::NotFound => cell_line_failure = Some(0),
                Resolution::NotUnique(matches) => cell_line_failure = Some(matches),
            }
        }

        if self.policy.require_marker_resolution && associations.is_empty() {
            reasons.extend(unresolved.into_iter().map(Rejection::UnresolvedAllele));
            if let (Some(matches), Some(criterion)) = (cell_line_failure, &input.symbol_criterion) {
                reasons.push(Rejection::CellLineMatch {
                    cell_line: input.mutant_note.clone(),
                    criterion: criterion.clone(),
                    matches,
                });
            }
            reasons.push(Rejection::MissingMarker);
        } else {
            warnings.extend(unresolved.into_iter().map(Warning::UnresolvedAllele));
            if let (Some(matches), Some(criterion)) = (cell_line_failure, &input.symbol_criterion) {
                warnings.push(Warning::CellLineMatch {
                    cell_line: input.mutant_note.clone(),
                    criterion: criterion.clone(),
                    matches,
                });
            }
        }
        Ok(associations)
    }

    fn resolve_annotations(
        &mut self,
        tokens: &[String],
        reasons: &mut Vec<Rejection>,
        warnings: &mut Vec<Warning>,
    ) -> Result<Vec<Key>, LoadError> {
        let mut keys = Vec::new();
        let mut unresolved = Vec::new();
        for token in tokens {
            match self
                .vocab
                .lookup(self.store, VocabDomain::AnnotationTerm, token)?
            {
                Some(key) => keys.push(key),
                None => {
                    warnings.push(Warning::UnresolvedTerm(token.clone()));
                    unresolved.push(token.as_str());
                }
            }
        }
        if self.policy.annotation_policy == AnnotationPolicy::RejectIfAllUnresolved
            && !tokens.is_empty()
            && keys.is_empty()
        {
            reasons.push(Rejection::NoResolvedAnnotations(unresolved.join("|")));
        }
        Ok(keys)
    }
}

fn push_association(
    associations: &mut Vec<MarkerAssociation>,
    warnings: &mut Vec<Warning>,
    label: &str,
    allele: ResolvedAllele,
    qualifier_key: Key,
) {
    match allele.marker_key {
        Some(marker_key) if marker_key != 0 => {
            let association = MarkerAssociation {
                marker_key,
                allele_key: Some(allele.allele_key),
                qualifier_key,
            };
            if !associations.contains(&association) {
                associations.push(association);
            }
        }
        _ => warnings.push(Warning::AlleleWithoutMarker(label.to_string())),
    }
}

const COLUMN_DELIMITER: char = '|';

fn parse_key(field: &'static str, value: &str) -> Result<Key, Rejection> {
    value.trim().parse::<Key>().map_err(|_| Rejection::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn check<T>(result: Result<T, Rejection>, reasons: &mut Vec<Rejection>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(reason) => {
            reasons.push(reason);
            None
        }
    }
}
