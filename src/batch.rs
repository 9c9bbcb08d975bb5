//! Batch driver: reads records, resolves each, writes one row per record.

use crate::error::{Error, Result};
use crate::geocoder::Geocoder;
use crate::parser::{self, InputRecord, OutputRecord, OUTPUT_HEADER};
use crate::resolver::{AddressResolver, ResolutionOutcome};
use crate::types::Coordinates;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

/// Configuration for batch runs.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Pause after every record that reached the geocoding service
    pub request_delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            request_delay: Duration::from_millis(200),
        }
    }
}

/// Counters for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Output rows written
    pub records: usize,
    /// Rows with coordinates
    pub resolved: usize,
    /// Rows without coordinates, for any reason
    pub unresolved: usize,
    /// Rows skipped because the address was empty
    pub empty: usize,
    /// Rows whose resolution raised an error
    pub failed: usize,
    /// Resolved rows matched through a shortened candidate
    pub fallbacks: usize,
    /// Rows stopped by a terminal service status
    pub aborted: usize,
}

/// Drives a whole input through an [`AddressResolver`].
#[derive(Debug)]
pub struct BatchDriver<G> {
    resolver: AddressResolver<G>,
    config: BatchConfig,
}

impl<G: Geocoder> BatchDriver<G> {
    /// Create a driver for the given geocoder.
    pub fn new(geocoder: G, config: BatchConfig) -> Self {
        Self {
            resolver: AddressResolver::new(geocoder),
            config,
        }
    }

    /// Borrow the resolver.
    pub fn resolver(&self) -> &AddressResolver<G> {
        &self.resolver
    }

    /// Geocode `input` into `output`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputNotFound`] before creating the output file when
    /// the input does not exist, or an I/O error when either file cannot be
    /// opened or written.
    pub async fn run_files(&self, input: &Path, output: &Path) -> Result<BatchSummary> {
        if !input.exists() {
            return Err(Error::input_not_found(input));
        }

        let reader = BufReader::new(File::open(input)?);
        let writer = BufWriter::new(File::create(output)?);
        tracing::info!(input = %input.display(), output = %output.display(), "starting batch");
        self.run(reader, writer).await
    }

    /// Geocode every record from `reader`, writing rows to `writer`.
    ///
    /// The writer is flushed after every row. Resolution errors are logged
    /// and recorded as unresolved rows; only I/O errors end the run.
    pub async fn run<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();
        writeln!(writer, "{OUTPUT_HEADER}")?;
        writer.flush()?;

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            let Some(record) = parser::parse_line(&line) else {
                continue;
            };

            let (coordinates, queried) = self.process(&record, &mut summary).await;

            writeln!(writer, "{}", OutputRecord::new(&record, coordinates).to_line())?;
            writer.flush()?;
            summary.records += 1;
            if coordinates.is_some() {
                summary.resolved += 1;
            } else {
                summary.unresolved += 1;
            }

            if queried && !self.config.request_delay.is_zero() {
                tokio::time::sleep(self.config.request_delay).await;
            }
        }

        tracing::info!(
            records = summary.records,
            resolved = summary.resolved,
            unresolved = summary.unresolved,
            fallbacks = summary.fallbacks,
            failed = summary.failed,
            "batch finished"
        );
        Ok(summary)
    }

    /// Resolve one record. Returns the coordinates and whether the
    /// geocoding service was contacted.
    async fn process(
        &self,
        record: &InputRecord,
        summary: &mut BatchSummary,
    ) -> (Option<Coordinates>, bool) {
        let row_id = &record.row_id;
        let address = &record.address;

        if !record.has_address() {
            tracing::info!("[{row_id}] empty address, skipping");
            summary.empty += 1;
            return (None, false);
        }

        match self.resolver.resolve(address).await {
            Ok(resolution) => {
                match &resolution.outcome {
                    ResolutionOutcome::Aborted(_) => summary.aborted += 1,
                    ResolutionOutcome::Empty => summary.empty += 1,
                    ResolutionOutcome::Matched if resolution.is_fallback() => {
                        summary.fallbacks += 1
                    }
                    _ => {}
                }
                match resolution.coordinates {
                    Some(coords) => tracing::info!("[{row_id}] {address} -> {coords}"),
                    None => tracing::info!("[{row_id}] {address} -> not resolved"),
                }
                (resolution.coordinates, resolution.attempts > 0)
            }
            Err(err) => {
                tracing::error!("[{row_id}] ERROR {address}: {err}");
                summary.failed += 1;
                (None, true)
            }
        }
    }
}
