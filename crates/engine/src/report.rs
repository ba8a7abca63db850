//! Human-readable and machine-readable run reports.

use std::{collections::BTreeMap, fmt, path::Path, time::Duration};

use alloy_primitives::B256;
use serde::Serialize;
use tracing::info;

use crate::{LatencyStats, ReportError, SubmissionMode, Summary, TxResult, stats::micros};

/// Placeholder for cells with no value.
const MISSING: &str = "-";

/// Printed instead of a table when a run produced no records.
pub const NO_RESULTS: &str = "No results to report";

/// Formats microseconds as milliseconds with three decimals.
fn ms(micros: u64) -> String {
    format!("{}.{:03}", micros / 1_000, micros % 1_000)
}

fn duration_ms(duration: Duration) -> String {
    ms(micros(duration))
}

/// Shortens a hash to `0x12345678…abcd`.
pub fn short_hash(hash: &B256) -> String {
    let full = hash.to_string();
    format!("{}…{}", &full[..10], &full[full.len() - 4..])
}

fn write_summary_row(f: &mut fmt::Formatter<'_>, label: &str, summary: &Summary) -> fmt::Result {
    writeln!(
        f,
        "{label:<10} {:>12} {:>12} {:>12} {:>12}",
        ms(summary.min),
        ms(summary.max),
        ms(summary.mean),
        ms(summary.median)
    )
}

/// Per-transaction results followed by latency statistics.
#[derive(Debug, Clone, Copy)]
pub struct ResultsTable<'a> {
    mode: SubmissionMode,
    results: &'a [TxResult],
    elapsed: Duration,
}

impl<'a> ResultsTable<'a> {
    /// Creates a table for a run that took `elapsed` in total.
    pub const fn new(mode: SubmissionMode, results: &'a [TxResult], elapsed: Duration) -> Self {
        Self { mode, results, elapsed }
    }
}

impl fmt::Display for ResultsTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(stats) = LatencyStats::from_results(self.results) else {
            return writeln!(f, "{NO_RESULTS}");
        };

        writeln!(f, "=== {} RESULTS ===", self.mode.as_str().to_uppercase())?;
        writeln!(f, "Transactions confirmed: {}", self.results.len())?;
        writeln!(f, "Total elapsed: {:?}", self.elapsed)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<6} {:>12} {:>12} {:>12}  HASH",
            "TX#", "SEND (ms)", "CONFIRM (ms)", "TOTAL (ms)"
        )?;
        for record in self.results {
            writeln!(
                f,
                "{:<6} {:>12} {:>12} {:>12}  {}",
                record.index(),
                duration_ms(record.send()),
                duration_ms(record.confirm()),
                duration_ms(record.total()),
                short_hash(&record.tx_hash())
            )?;
        }

        writeln!(f)?;
        writeln!(f, "LATENCY STATISTICS (ms)")?;
        writeln!(f, "{:<10} {:>12} {:>12} {:>12} {:>12}", "", "MIN", "MAX", "MEAN", "MEDIAN")?;
        write_summary_row(f, "send", &stats.send)?;
        write_summary_row(f, "confirm", &stats.confirm)?;
        write_summary_row(f, "total", &stats.total)
    }
}

/// Async and sync totals side by side, aligned by transaction index.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonTable<'a> {
    async_results: &'a [TxResult],
    sync_results: &'a [TxResult],
}

impl<'a> ComparisonTable<'a> {
    /// Creates the comparison of two runs.
    pub const fn new(async_results: &'a [TxResult], sync_results: &'a [TxResult]) -> Self {
        Self { async_results, sync_results }
    }
}

impl fmt::Display for ComparisonTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.async_results.is_empty() && self.sync_results.is_empty() {
            return writeln!(f, "{NO_RESULTS}");
        }

        let mut rows: BTreeMap<usize, (Option<Duration>, Option<Duration>)> = BTreeMap::new();
        for record in self.async_results {
            rows.entry(record.index()).or_default().0 = Some(record.total());
        }
        for record in self.sync_results {
            rows.entry(record.index()).or_default().1 = Some(record.total());
        }

        let cell = |value: Option<Duration>| value.map_or_else(|| MISSING.to_string(), duration_ms);

        writeln!(f, "=== ASYNC vs SYNC (total latency, ms) ===")?;
        writeln!(f, "{:<6} {:>12} {:>12}", "TX#", "ASYNC", "SYNC")?;
        for (index, (async_total, sync_total)) in rows {
            writeln!(f, "{index:<6} {:>12} {:>12}", cell(async_total), cell(sync_total))?;
        }

        let async_total = Summary::from_durations(self.async_results.iter().map(TxResult::total));
        let sync_total = Summary::from_durations(self.sync_results.iter().map(TxResult::total));
        let stat = |summary: Option<Summary>, pick: fn(&Summary) -> u64| {
            summary.as_ref().map_or_else(|| MISSING.to_string(), |s| ms(pick(s)))
        };

        writeln!(f)?;
        writeln!(
            f,
            "{:<6} {:>12} {:>12}",
            "median",
            stat(async_total, |s| s.median),
            stat(sync_total, |s| s.median)
        )?;
        writeln!(
            f,
            "{:<6} {:>12} {:>12}",
            "mean",
            stat(async_total, |s| s.mean),
            stat(sync_total, |s| s.mean)
        )
    }
}

/// Receipt lookups issued per transaction.
#[derive(Debug, Clone, Copy)]
pub struct ReceiptCountTable<'a> {
    results: &'a [TxResult],
}

impl<'a> ReceiptCountTable<'a> {
    /// Creates the listing.
    pub const fn new(results: &'a [TxResult]) -> Self {
        Self { results }
    }
}

impl fmt::Display for ReceiptCountTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.results.is_empty() {
            return writeln!(f, "{NO_RESULTS}");
        }

        writeln!(f, "{:<6} {:>14}  HASH", "TX#", "RECEIPT CALLS")?;
        for record in self.results {
            writeln!(
                f,
                "{:<6} {:>14}  {}",
                record.index(),
                record.poll_attempts(),
                short_hash(&record.tx_hash())
            )?;
        }
        let total: u64 = self.results.iter().map(|r| u64::from(r.poll_attempts())).sum();
        writeln!(f, "{:<6} {:>14}", "total", total)
    }
}

/// Summary of `eth_blockNumber` probe latencies.
#[derive(Debug, Clone, Copy)]
pub struct ProbeTable<'a> {
    latencies: &'a [Duration],
    requested: usize,
}

impl<'a> ProbeTable<'a> {
    /// Creates the summary of `requested` probe calls, of which `latencies` succeeded.
    pub const fn new(latencies: &'a [Duration], requested: usize) -> Self {
        Self { latencies, requested }
    }
}

impl fmt::Display for ProbeTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(summary) = Summary::from_durations(self.latencies.iter().copied()) else {
            return writeln!(f, "eth_blockNumber: no successful calls out of {}", self.requested);
        };
        writeln!(
            f,
            "eth_blockNumber: {}/{} ok, min {} ms, max {} ms, mean {} ms, median {} ms",
            self.latencies.len(),
            self.requested,
            ms(summary.min),
            ms(summary.max),
            ms(summary.mean),
            ms(summary.median)
        )
    }
}

/// Machine-readable output of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<'a> {
    /// Submission mode of the run.
    pub mode: SubmissionMode,
    /// Wall-clock duration of the run in microseconds.
    pub elapsed_us: u64,
    /// Per-transaction records.
    pub results: &'a [TxResult],
    /// Latency statistics, absent when there are no records.
    pub stats: Option<LatencyStats>,
    /// `eth_blockNumber` probe statistics, when a probe ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe: Option<Summary>,
}

impl<'a> RunReport<'a> {
    /// Builds the report of a run.
    pub fn new(mode: SubmissionMode, results: &'a [TxResult], elapsed: Duration) -> Self {
        Self {
            mode,
            elapsed_us: micros(elapsed),
            results,
            stats: LatencyStats::from_results(results),
            probe: None,
        }
    }

    /// Attaches probe latencies.
    pub fn with_probe(mut self, latencies: &[Duration]) -> Self {
        self.probe = Summary::from_durations(latencies.iter().copied());
        self
    }
}

/// Writes one CSV row per record to `path`, durations in microseconds.
pub fn write_csv(path: impl AsRef<Path>, results: &[TxResult]) -> Result<(), ReportError> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;
    for record in results {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = results.len(), "Wrote CSV results");
    Ok(())
}
