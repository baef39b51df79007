//! Per-exchange sync results and their summary table.

use std::collections::{BTreeMap, BTreeSet};
use std::io;

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::domain::{ExchangeId, SyncSummary};
use crate::error::{ExchangeFailure, SyncFailures};

/// Outcome of one orchestrator run.
///
/// Every exchange that was attempted has a summary entry; failed exchanges
/// carry a zero summary and an entry in `failures`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub summaries: BTreeMap<ExchangeId, SyncSummary>,
    pub names: BTreeMap<ExchangeId, String>,
    pub failures: SyncFailures,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "EXCHANGE")]
    exchange: String,
    #[tabled(rename = "ADDED")]
    added: usize,
    #[tabled(rename = "UPDATED")]
    updated: usize,
    #[tabled(rename = "ARCHIVED")]
    archived: usize,
}

/// Serializable view of one exchange line, used by `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryLine {
    pub exchange: String,
    #[serde(flatten)]
    pub summary: SyncSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncReport {
    pub fn record(&mut self, exchange: ExchangeId, name: &str, summary: SyncSummary) {
        self.names.insert(exchange, name.to_string());
        self.summaries.insert(exchange, summary);
    }

    pub fn record_failure(&mut self, exchange: ExchangeId, name: &str, reason: impl Into<String>) {
        self.record(exchange, name, SyncSummary::default());
        self.failures.0.push(ExchangeFailure {
            exchange_id: exchange,
            name: name.to_string(),
            reason: reason.into(),
        });
    }

    /// Exchanges with a summary and no recorded failure.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        let failed: BTreeSet<ExchangeId> = self.failures.iter().map(|f| f.exchange_id).collect();
        self.summaries
            .keys()
            .filter(|id| !failed.contains(id))
            .count()
    }

    /// True when at least one exchange was attempted and none succeeded.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        !self.summaries.is_empty() && self.succeeded() == 0
    }

    #[must_use]
    pub fn total(&self) -> SyncSummary {
        let mut total = SyncSummary::default();
        for summary in self.summaries.values() {
            total += *summary;
        }
        total
    }

    fn name_of(&self, exchange: ExchangeId) -> String {
        self.names
            .get(&exchange)
            .cloned()
            .unwrap_or_else(|| exchange.to_string())
    }

    /// Lines sorted by exchange name.
    #[must_use]
    pub fn lines(&self) -> Vec<SummaryLine> {
        let mut lines: Vec<SummaryLine> = self
            .summaries
            .iter()
            .map(|(id, summary)| SummaryLine {
                exchange: self.name_of(*id),
                summary: *summary,
                error: self
                    .failures
                    .iter()
                    .find(|f| f.exchange_id == *id)
                    .map(|f| f.reason.clone()),
            })
            .collect();
        lines.sort_by(|a, b| a.exchange.cmp(&b.exchange));
        lines
    }

    /// Summary table sorted by exchange name, followed by a TOTAL row.
    #[must_use]
    pub fn render_table(&self) -> String {
        let mut rows: Vec<SummaryRow> = self
            .lines()
            .into_iter()
            .map(|line| SummaryRow {
                exchange: line.exchange,
                added: line.summary.added,
                updated: line.summary.updated,
                archived: line.summary.archived,
            })
            .collect();
        let total = self.total();
        rows.push(SummaryRow {
            exchange: "TOTAL".to_string(),
            added: total.added,
            updated: total.updated,
            archived: total.archived,
        });
        Table::new(rows).with(Style::sharp()).to_string()
    }

    /// Write the summary table followed by a newline.
    pub fn write_table<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.render_table())
    }
}
