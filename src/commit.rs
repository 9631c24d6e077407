use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tempfile::Builder;
use tracing::{info, warn};

use crate::error::LoadError;
use crate::keys::CounterState;
use crate::writer::{OutputFile, TableRows};

#[derive(Debug, Clone, Serialize)]
pub struct CommitReceipt {
    pub output_dir: String,
    pub files: Vec<String>,
    pub rows: usize,
}

pub trait BulkLoader {
    fn load(
        &self,
        tables: &TableRows,
        counters: &[CounterState],
        date: &str,
    ) -> Result<CommitReceipt, LoadError>;
}

#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    output_dir: Utf8PathBuf,
}

pub const COUNTERS_FILE: &str = "counters.json";

impl DirectoryLoader {
    pub fn new(output_dir: Utf8PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }
}

impl BulkLoader for DirectoryLoader {
    fn load(
        &self,
        tables: &TableRows,
        counters: &[CounterState],
        date: &str,
    ) -> Result<CommitReceipt, LoadError> {
        let parent = match self.output_dir.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent.to_path_buf(),
            _ => Utf8PathBuf::from("."),
        };
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| LoadError::Commit(format!("create {parent}: {err}")))?;
        let staging = Builder::new()
            .prefix(".strainload-stage")
            .tempdir_in(parent.as_std_path())
            .map_err(|err| LoadError::Commit(err.to_string()))?;

        let mut files = Vec::new();
        for file in OutputFile::ALL {
            let name = file.file_name();
            fs::write(staging.path().join(&name), tables.render(file, date))
                .map_err(|err| LoadError::Commit(format!("write {name}: {err}")))?;
            files.push(name);
        }
        let content = serde_json::to_vec_pretty(counters)
            .map_err(|err| LoadError::Commit(err.to_string()))?;
        fs::write(staging.path().join(COUNTERS_FILE), content)
            .map_err(|err| LoadError::Commit(format!("write {COUNTERS_FILE}: {err}")))?;

        let staged = staging.keep();
        atomic_rename_dir(&staged, self.output_dir.as_std_path()).map_err(|err| {
            LoadError::Commit(format!(
                "publish {}: {err}; staged files kept at {}",
                self.output_dir,
                staged.display()
            ))
        })?;

        let counts = tables.counts();
        let rows = counts.strains
            + counts.strain_markers
            + counts.accessions
            + counts.annotations
            + counts.notes
            + counts.note_chunks;
        info!(output_dir = %self.output_dir, rows, "bulk load files published");
        Ok(CommitReceipt {
            output_dir: self.output_dir.to_string(),
            files,
            rows,
        })
    }
}

pub fn atomic_rename_dir(from: &Path, to: &Path) -> io::Result<()> {
    if !to.exists() {
        return fs::rename(from, to);
    }
    let mut previous = to.as_os_str().to_owned();
    previous.push(".previous");
    let previous = PathBuf::from(previous);
    if previous.exists() {
        fs::remove_dir_all(&previous)?;
    }

    fs::rename(to, &previous)?;
    if let Err(err) = fs::rename(from, to) {
        if let Err(restore) = fs::rename(&previous, to) {
            warn!(previous = %previous.display(), error = %restore, "could not restore previous output");
        }
        return Err(err);
    }
    if let Err(err) = fs::remove_dir_all(&previous) {
        warn!(previous = %previous.display(), error = %err, "could not remove previous output");
    }
    Ok(())
}
