use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::domain::{Key, LoadMode, LoadVariant, VocabDomain};
use crate::error::LoadError;

pub const DEFAULT_CONFIG_FILE: &str = "strainload.json";
pub const DEFAULT_OUTPUT_DIR: &str = "bcp";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub variant: Option<LoadVariant>,
    #[serde(default)]
    pub mode: Option<LoadMode>,
    #[serde(default)]
    pub require_marker_resolution: Option<bool>,
    #[serde(default)]
    pub annotation_policy: Option<AnnotationPolicy>,
    #[serde(default)]
    pub key_ceiling: Option<Key>,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub snapshot: Option<String>,
    #[serde(default)]
    pub constants: Option<Constants>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationPolicy {
    #[default]
    DropUnresolved,
    RejectIfAllUnresolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Constants {
    pub strain_mgi_type: Key,
    pub allele_mgi_type: Key,
    pub marker_mgi_type: Key,
    pub note_owner_type: Key,
    pub origin_note_type: Key,
    pub mutant_note_type: Key,
    pub colony_note_type: Key,
    pub nomenclature_qualifier: Key,
    pub annotation_type: Key,
    pub annotation_qualifier: Key,
    pub mgi_logical_db: Key,
    pub mgi_prefix: String,
    pub species_vocab: Key,
    pub strain_type_vocab: Key,
    pub annotation_vocab: Key,
    pub qualifier_vocab: Key,
}

impl Default for Constants {
    fn default() -> Self {
        Self {
            strain_mgi_type: 10,
            allele_mgi_type: 11,
            marker_mgi_type: 2,
            note_owner_type: 10,
            origin_note_type: 1011,
            mutant_note_type: 1038,
            colony_note_type: 1012,
            nomenclature_qualifier: 615427,
            annotation_type: 1009,
            annotation_qualifier: 1614158,
            mgi_logical_db: 1,
            mgi_prefix: "MGI:".to_string(),
            species_vocab: 26,
            strain_type_vocab: 55,
            annotation_vocab: 27,
            qualifier_vocab: 31,
        }
    }
}

impl Constants {
    pub fn vocab_key(&self, domain: VocabDomain) -> Key {
        match domain {
            VocabDomain::Species => self.species_vocab,
            VocabDomain::StrainType => self.strain_type_vocab,
            VocabDomain::AnnotationTerm => self.annotation_vocab,
            VocabDomain::Qualifier => self.qualifier_vocab,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub variant: Option<LoadVariant>,
    pub mode: Option<LoadMode>,
    pub input: Option<String>,
    pub output_dir: Option<String>,
    pub snapshot: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub variant: LoadVariant,
    pub mode: LoadMode,
    pub require_marker_resolution: bool,
    pub annotation_policy: AnnotationPolicy,
    pub key_ceiling: Key,
    pub input: Utf8PathBuf,
    pub output_dir: Utf8PathBuf,
    pub snapshot: Utf8PathBuf,
    pub constants: Constants,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(
        path: Option<&str>,
        overrides: &ConfigOverrides,
    ) -> Result<ResolvedConfig, LoadError> {
        let config = Self::read(path)?;
        Self::resolve_config(config, overrides)
    }

    pub fn read(path: Option<&str>) -> Result<Config, LoadError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| LoadError::ConfigRead(config_path.clone()))?;
        serde_json::from_str(&content).map_err(|err| LoadError::ConfigParse(err.to_string()))
    }

    pub fn resolve_config(
        config: Config,
        overrides: &ConfigOverrides,
    ) -> Result<ResolvedConfig, LoadError> {
        let variant = overrides
            .variant
            .or(config.variant)
            .unwrap_or(LoadVariant::Strain);
        let mode = overrides.mode.or(config.mode).unwrap_or_default();

        let input = overrides
            .input
            .clone()
            .or(config.input)
            .ok_or(LoadError::MissingSetting("input"))?;
        let snapshot = overrides
            .snapshot
            .clone()
            .or(config.snapshot)
            .ok_or(LoadError::MissingSetting("snapshot"))?;
        let output_dir = overrides
            .output_dir
            .clone()
            .or(config.output_dir)
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());

        let key_ceiling = config.key_ceiling.unwrap_or(i32::MAX as Key);
        if key_ceiling <= 0 {
            return Err(LoadError::ConfigParse(format!(
                "key_ceiling must be positive, got {key_ceiling}"
            )));
        }

        Ok(ResolvedConfig {
            variant,
            mode,
            require_marker_resolution: config
                .require_marker_resolution
                .unwrap_or_else(|| variant.requires_marker()),
            annotation_policy: config.annotation_policy.unwrap_or_default(),
            key_ceiling,
            input: Utf8PathBuf::from(input),
            output_dir: Utf8PathBuf::from(output_dir),
            snapshot: Utf8PathBuf::from(snapshot),
            constants: config.constants.unwrap_or_default(),
        })
    }
}
