use std::fs::File;
use std::io::{self, BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{error, warn};

use crate::domain::LoadVariant;
use crate::error::{LoadError, Rejection, Warning};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineFailure {
    pub line: usize,
    pub reasons: Vec<String>,
}

pub struct ErrorReporter {
    diagnostics: Box<dyn Write + Send>,
    errors: Box<dyn Write + Send>,
    failures: Vec<LineFailure>,
    warnings: usize,
    fatal: Option<usize>,
}

impl ErrorReporter {
    pub fn create(dir: &Utf8Path, input: &Utf8Path, now: DateTime<Local>) -> Result<Self, LoadError> {
        let (diagnostics_path, error_path) = Self::file_paths(dir, input, now);
        std::fs::create_dir_all(dir.as_std_path())
            .map_err(|err| LoadError::Filesystem(format!("create {dir}: {err}")))?;
        let diagnostics = File::create(diagnostics_path.as_std_path()).map_err(|err| {
            LoadError::Filesystem(format!("could not open file {diagnostics_path}: {err}"))
        })?;
        let errors = File::create(error_path.as_std_path())
            .map_err(|err| LoadError::Filesystem(format!("could not open file {error_path}: {err}")))?;
        Ok(Self::from_writers(
            Box::new(BufWriter::new(diagnostics)),
            Box::new(BufWriter::new(errors)),
        ))
    }

    pub fn file_paths(
        dir: &Utf8Path,
        input: &Utf8Path,
        now: DateTime<Local>,
    ) -> (Utf8PathBuf, Utf8PathBuf) {
        let stem = input.file_name().unwrap_or("strainload");
        let date = now.format("%m%d%Y");
        (
            dir.join(format!("{stem}.{date}.diagnostics")),
            dir.join(format!("{stem}.{date}.error")),
        )
    }

    pub fn from_writers(diagnostics: Box<dyn Write + Send>, errors: Box<dyn Write + Send>) -> Self {
        Self {
            diagnostics,
            errors,
            failures: Vec::new(),
            warnings: 0,
            fatal: None,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_writers(Box::new(io::sink()), Box::new(io::sink()))
    }

    pub fn start(&mut self, variant: LoadVariant, input: &str, now: DateTime<Local>) -> Result<(), LoadError> {
        let stamp = timestamp(now);
        writeln!(self.diagnostics, "Start Date/Time: {stamp}")
            .and_then(|_| writeln!(self.diagnostics, "Variant: {variant}"))
            .and_then(|_| writeln!(self.diagnostics, "Input: {input}"))
            .and_then(|_| writeln!(self.errors, "Start Date/Time: {stamp}\n"))
            .map_err(write_error)
    }

    pub fn report_line_failure(&mut self, line: usize, reasons: &[Rejection]) -> Result<(), LoadError> {
        for reason in reasons {
            warn!(line, %reason, "line rejected");
            writeln!(self.errors, "{reason} ({line})").map_err(write_error)?;
        }
        self.failures.push(LineFailure {
            line,
            reasons: reasons.iter().map(ToString::to_string).collect(),
        });
        Ok(())
    }

    pub fn report_warnings(&mut self, line: usize, warnings: &[Warning]) -> Result<(), LoadError> {
        for warning in warnings {
            warn!(line, %warning, "token dropped");
            writeln!(self.errors, "{warning} ({line})").map_err(write_error)?;
        }
        self.warnings += warnings.len();
        Ok(())
    }

    pub fn report_fatal(&mut self, err: LoadError) -> LoadError {
        error!(error = %err, "run aborted");
        let (line, raw) = match &err {
            LoadError::MalformedLine { line, raw, .. } => (Some(*line), raw.as_str()),
            _ => (None, ""),
        };
        self.fatal = line.or(Some(0));
        let result = match line {
            Some(line) => writeln!(self.errors, "FATAL Invalid Line ({line}): {raw}"),
            None => writeln!(self.errors, "FATAL {err}"),
        };
        let stamp = timestamp(Local::now());
        let _ = result
            .and_then(|_| writeln!(self.diagnostics, "Run aborted: {err}"))
            .and_then(|_| writeln!(self.diagnostics, "\nEnd Date/Time: {stamp}"))
            .and_then(|_| writeln!(self.errors, "\nEnd Date/Time: {stamp}"))
            .and_then(|_| self.errors.flush())
            .and_then(|_| self.diagnostics.flush());
        err
    }

    pub fn finish(&mut self, summary: &str, now: DateTime<Local>) -> Result<(), LoadError> {
        let stamp = timestamp(now);
        writeln!(self.diagnostics, "{summary}")
            .and_then(|_| writeln!(self.diagnostics, "\nEnd Date/Time: {stamp}"))
            .and_then(|_| writeln!(self.errors, "\nEnd Date/Time: {stamp}"))
            .and_then(|_| self.diagnostics.flush())
            .and_then(|_| self.errors.flush())
            .map_err(write_error)
    }

    pub fn failures(&self) -> &[LineFailure] {
        &self.failures
    }

    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    pub fn aborted(&self) -> bool {
        self.fatal.is_some()
    }
}

fn timestamp(now: DateTime<Local>) -> String {
    now.format("%m/%d/%Y %H:%M:%S").to_string()
}

fn write_error(err: io::Error) -> LoadError {
    LoadError::Filesystem(format!("write diagnostics: {err}"))
}
