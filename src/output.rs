use std::io::{self, Write};

use serde::Serialize;
use tracing::info;

use crate::app::{ProgressEvent, ProgressSink, RunSummary};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_summary(summary: &RunSummary) -> io::Result<()> {
        Self::print_json(summary)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => info!(elapsed_ms = elapsed.as_millis() as u64, "{}", event.message),
            None => info!("{}", event.message),
        }
    }
}

pub fn print_text_summary(summary: &RunSummary) {
    println!("strainload {} ({:?})", summary.variant, summary.mode);
    println!("  lines read: {}", summary.lines_read);
    println!("  accepted:   {}", summary.accepted);
    println!("  rejected:   {}", summary.rejected);
    println!("  warnings:   {}", summary.warnings);
    println!(
        "  rows: strain={} strain_marker={} accession={} annotation={} note={} note_chunk={}",
        summary.rows.strains,
        summary.rows.strain_markers,
        summary.rows.accessions,
        summary.rows.annotations,
        summary.rows.notes,
        summary.rows.note_chunks
    );
    for failure in &summary.failures {
        println!("  line {}: {}", failure.line, failure.reasons.join("; "));
    }
    match &summary.commit {
        Some(receipt) => println!("  committed {} rows to {}", receipt.rows, receipt.output_dir),
        None => println!("  nothing committed"),
    }
}
