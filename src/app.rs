use std::fs::File;
use std::io::{BufRead, BufReader};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

use crate::commit::{BulkLoader, CommitReceipt};
use crate::config::{Constants, ResolvedConfig};
use crate::domain::{Key, LoadMode, LoadVariant};
use crate::error::LoadError;
use crate::input::InputReader;
use crate::keys::{CounterState, KeyAllocator};
use crate::report::{ErrorReporter, LineFailure};
use crate::store::ReferenceStore;
use crate::validate::{RecordValidator, Validation, ValidationPolicy};
use crate::writer::{MultiTableWriter, RowCounts, TableRows};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub variant: LoadVariant,
    pub mode: LoadMode,
    pub policy: ValidationPolicy,
    pub key_ceiling: Key,
    pub constants: Constants,
}

impl RunOptions {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            variant: config.variant,
            mode: config.mode,
            policy: ValidationPolicy::from_config(config),
            key_ceiling: config.key_ceiling,
            constants: config.constants.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub variant: LoadVariant,
    pub mode: LoadMode,
    pub lines_read: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub warnings: usize,
    pub rows: RowCounts,
    pub failures: Vec<LineFailure>,
    pub counters: Vec<CounterState>,
    pub commit: Option<CommitReceipt>,
}

impl RunSummary {
    pub fn committed(&self) -> bool {
        self.commit.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub summary: RunSummary,
    pub tables: TableRows,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct Loader<'s, S: ReferenceStore + ?Sized> {
    store: &'s S,
    options: RunOptions,
}

impl<'s, S: ReferenceStore + ?Sized> Loader<'s, S> {
    pub fn new(store: &'s S, options: RunOptions) -> Self {
        Self { store, options }
    }

    pub fn run_file<B: BulkLoader>(
        &self,
        config: &ResolvedConfig,
        reporter: &mut ErrorReporter,
        bulk: &B,
        sink: &dyn ProgressSink,
    ) -> Result<RunOutput, LoadError> {
        let file = match File::open(config.input.as_std_path()) {
            Ok(file) => file,
            Err(err) => {
                reporter.start(self.options.variant, config.input.as_str(), Local::now())?;
                let err = LoadError::InputOpen(format!("{}: {err}", config.input));
                return Err(reporter.report_fatal(err));
            }
        };
        self.run(BufReader::new(file), config.input.as_str(), reporter, bulk, sink)
    }

    pub fn run<R: BufRead, B: BulkLoader>(
        &self,
        input: R,
        input_name: &str,
        reporter: &mut ErrorReporter,
        bulk: &B,
        sink: &dyn ProgressSink,
    ) -> Result<RunOutput, LoadError> {
        let started = Instant::now();
        let now = Local::now();
        reporter.start(self.options.variant, input_name, now)?;
        info!(variant = %self.options.variant, input = input_name, "run started");

        match self.process(input, reporter, sink, started) {
            Ok((summary, tables)) => self.commit(summary, tables, reporter, bulk, sink, started, now),
            Err(err) => Err(reporter.report_fatal(err)),
        }
    }

    fn process<R: BufRead>(
        &self,
        input: R,
        reporter: &mut ErrorReporter,
        sink: &dyn ProgressSink,
        started: Instant,
    ) -> Result<(RunSummary, TableRows), LoadError> {
        sink.event(ProgressEvent {
            message: "phase=Seed; allocating key ranges".to_string(),
            elapsed: Some(started.elapsed()),
        });
        let mut keys = KeyAllocator::seed(self.store, self.options.key_ceiling)?;
        let mut validator =
            RecordValidator::new(self.store, self.options.policy, self.options.constants.clone());
        let mut writer = MultiTableWriter::new(self.options.constants.clone());

        sink.event(ProgressEvent {
            message: "phase=Process; validating input".to_string(),
            elapsed: Some(started.elapsed()),
        });
        let mut reader = InputReader::new(input, self.options.variant);
        let mut accepted = 0;
        for record in reader.by_ref() {
            let record = record?;
            match validator.validate(&record)? {
                Validation::Valid { record, warnings } => {
                    match writer.emit(&record, &mut keys) {
                        Ok(_) => {
                            if let Some(name) = record.strain_name() {
                                validator.mark_loaded(name);
                            }
                            accepted += 1;
                            reporter.report_warnings(record.line(), &warnings)?;
                        }
                        Err(rejection) => {
                            reporter.report_warnings(record.line(), &warnings)?;
                            reporter.report_line_failure(record.line(), &[rejection])?;
                        }
                    }
                }
                Validation::Invalid {
                    line,
                    reasons,
                    warnings,
                } => {
                    reporter.report_warnings(line, &warnings)?;
                    reporter.report_line_failure(line, &reasons)?;
                }
            }
        }

        let tables = writer.into_staged();
        let summary = RunSummary {
            variant: self.options.variant,
            mode: self.options.mode,
            lines_read: reader.lines_read(),
            accepted,
            rejected: reporter.failures().len(),
            warnings: reporter.warning_count(),
            rows: tables.counts(),
            failures: reporter.failures().to_vec(),
            counters: keys.final_state(),
            commit: None,
        };
        Ok((summary, tables))
    }

    #[allow(clippy::too_many_arguments)]
    fn commit<B: BulkLoader>(
        &self,
        mut summary: RunSummary,
        tables: TableRows,
        reporter: &mut ErrorReporter,
        bulk: &B,
        sink: &dyn ProgressSink,
        started: Instant,
        now: DateTime<Local>,
    ) -> Result<RunOutput, LoadError> {
        if self.options.mode == LoadMode::Load {
            sink.event(ProgressEvent {
                message: "phase=Commit; publishing bulk load files".to_string(),
                elapsed: Some(started.elapsed()),
            });
            let date = now.format("%m/%d/%Y").to_string();
            match bulk.load(&tables, &summary.counters, &date) {
                Ok(receipt) => summary.commit = Some(receipt),
                Err(err) => return Err(reporter.report_fatal(err)),
            }
        }

        let line = format!(
            "Lines: {}  Accepted: {}  Rejected: {}  Warnings: {}  Committed: {}",
            summary.lines_read,
            summary.accepted,
            summary.rejected,
            summary.warnings,
            summary.committed()
        );
        reporter.finish(&line, Local::now())?;
        info!(
            accepted = summary.accepted,
            rejected = summary.rejected,
            committed = summary.committed(),
            "run finished"
        );
        sink.event(ProgressEvent {
            message: "phase=Done".to_string(),
            elapsed: Some(started.elapsed()),
        });
        Ok(RunOutput { summary, tables })
    }
}
