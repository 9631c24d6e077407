use regex::Regex;
use tracing::debug;

use crate::domain::Key;
use crate::error::LoadError;
use crate::store::ReferenceStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAllele {
    pub allele_key: Key,
    pub marker_key: Option<Key>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedAllele),
    NotFound,
    NotUnique(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellLineQuery<'a> {
    pub cell_line: &'a str,
    pub criterion: &'a str,
}

pub struct ReferenceResolver<'s, S: ReferenceStore + ?Sized> {
    store: &'s S,
    allele_mgi_type: Key,
}

impl<'s, S: ReferenceStore + ?Sized> ReferenceResolver<'s, S> {
    pub fn new(store: &'s S, allele_mgi_type: Key) -> Self {
        Self {
            store,
            allele_mgi_type,
        }
    }

    pub fn resolve_by_identifier(&self, allele_id: &str) -> Result<Resolution, LoadError> {
        let allele_id = allele_id.trim();
        if allele_id.is_empty() {
            return Ok(Resolution::NotFound);
        }
        let Some(allele_key) = self
            .store
            .object_by_accession(allele_id, self.allele_mgi_type)?
        else {
            return Ok(Resolution::NotFound);
        };
        let marker_key = self.store.marker_of_allele(allele_key)?;
        Ok(Resolution::Resolved(ResolvedAllele {
            allele_key,
            marker_key,
        }))
    }

    pub fn resolve_by_pattern(&self, query: CellLineQuery<'_>) -> Result<Resolution, LoadError> {
        let cell_line = query.cell_line.trim();
        let criterion = query.criterion.trim();
        if cell_line.is_empty() || criterion.is_empty() {
            return Ok(Resolution::NotFound);
        }
        let pattern = symbol_pattern(criterion)?;
        let matches = self
            .store
            .alleles_by_cell_line(cell_line)?
            .into_iter()
            .filter(|row| pattern.is_match(&row.symbol))
            .collect::<Vec<_>>();
        debug!(cell_line, criterion, matches = matches.len(), "cell line lookup");
        match matches.as_slice() {
            [row] => Ok(Resolution::Resolved(ResolvedAllele {
                allele_key: row.allele_key,
                marker_key: row.marker_key,
            })),
            rows => Ok(Resolution::NotUnique(rows.len())),
        }
    }

    pub fn resolve_allele(
        &self,
        allele_id: &str,
        fallback: Option<CellLineQuery<'_>>,
    ) -> Result<Resolution, LoadError> {
        let direct = self.resolve_by_identifier(allele_id)?;
        match (direct, fallback) {
            (Resolution::Resolved(_), _) | (_, None) => Ok(direct),
            (_, Some(query)) => self.resolve_by_pattern(query),
        }
    }
}

fn symbol_pattern(criterion: &str) -> Result<Regex, LoadError> {
    Regex::new(&format!("{}>$", regex::escape(criterion)))
        .map_err(|err| LoadError::Store(format!("invalid symbol criterion {criterion:?}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_pattern_anchors_on_closing_bracket() {
        let pattern = symbol_pattern("tm1a(KOMP)Wtsi").unwrap();
        assert!(pattern.is_match("Kit<tm1a(KOMP)Wtsi>"));
        assert!(!pattern.is_match("Kit<tm1a(KOMP)Wtsi>x"));
        assert!(!pattern.is_match("Kit<tm1aKOMPWtsi>"));
    }
}
