//! `status()` surface (§6) plus the run-summary fields SPEC_FULL.md
//! adds so "processed / saved / per-source counts" is a structured
//! field rather than a log line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceRunSummary {
    pub processed: usize,
    pub saved: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub processed: usize,
    pub saved: usize,
    pub per_source: HashMap<String, SourceRunSummary>,
}

impl RunSummary {
    pub fn record_source(&mut self, source_name: impl Into<String>, source: SourceRunSummary) {
        self.processed += source.processed;
        self.saved += source.saved;
        self.per_source.insert(source_name.into(), source);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Stopped,
    Initialising,
    Idle,
    Running,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerStatus {
    pub initialized: bool,
    pub is_running: bool,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub interval_hours: u64,
    pub last_run_summary: Option<RunSummary>,
}

impl SchedulerStatus {
    pub fn new(interval_hours: u64) -> Self {
        Self {
            initialized: false,
            is_running: false,
            last_run: None,
            next_run: None,
            consecutive_failures: 0,
            interval_hours,
            last_run_summary: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_source_accumulates_totals() {
        let mut summary = RunSummary::default();
        summary.record_source("a", SourceRunSummary { processed: 3, saved: 2, errors: 1 });
        summary.record_source("b", SourceRunSummary { processed: 5, saved: 5, errors: 0 });
        assert_eq!(summary.processed, 8);
        assert_eq!(summary.saved, 7);
        assert_eq!(summary.per_source.len(), 2);
    }
}
