//! Periodic driver (§4.5): single-flight `scrapeAll()`, a per-source
//! stop flag, a consecutive-failure circuit breaker, and the
//! `Stopped → Initialising → Idle ↔ Running` state machine.

use crate::active_flags::ActiveFlags;
use crate::status::{RunSummary, SchedulerState, SchedulerStatus};
use async_trait::async_trait;
use chrono::Utc;
use clipper_types::{ClipperError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

/// The per-run work the scheduler drives. Implemented by the
/// orchestrator that actually wires Fetch Engine → Link Discovery →
/// Structure Engine → Extractor → Repository; the scheduler itself
/// only owns timing, single-flight and breaker state.
#[async_trait]
pub trait ScrapeRunner: Send + Sync + 'static {
    async fn scrape_all(&self, active_flags: &ActiveFlags) -> Result<RunSummary>;
}

const CONSECUTIVE_FAILURE_LIMIT: u32 = 3;

pub struct Scheduler<R: ScrapeRunner> {
    runner: Arc<R>,
    interval: Duration,
    state: RwLock<SchedulerState>,
    in_flight: AtomicBool,
    active_flags: Arc<ActiveFlags>,
    status: RwLock<SchedulerStatus>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<R: ScrapeRunner> Scheduler<R> {
    pub fn new(runner: Arc<R>, interval_hours: u64) -> Arc<Self> {
        Arc::new(Self {
            runner,
            interval: Duration::from_secs(interval_hours * 3600),
            state: RwLock::new(SchedulerState::Stopped),
            in_flight: AtomicBool::new(false),
            active_flags: Arc::new(ActiveFlags::new()),
            status: RwLock::new(SchedulerStatus::new(interval_hours)),
            task: Mutex::new(None),
        })
    }

    pub fn active_flags(&self) -> Arc<ActiveFlags> {
        self.active_flags.clone()
    }

    pub fn deactivate_source(&self, source_id: Uuid) {
        self.active_flags.deactivate(source_id);
    }

    pub fn activate_source(&self, source_id: Uuid) {
        self.active_flags.activate(source_id);
    }

    /// Runs one job immediately, then arms the interval (§4.5
    /// "initial kick"). Re-entrant: calling this while already
    /// initialised just warns and returns.
    pub async fn initialize(self: &Arc<Self>) -> Result<()> {
        {
            let state = self.state.read().await;
            if *state != SchedulerState::Stopped {
                warn!("scheduler already initialised");
                return Ok(());
            }
        }

        *self.state.write().await = SchedulerState::Initialising;
        self.status.write().await.initialized = true;
        info!(interval_hours = self.interval.as_secs() / 3600, "initialising scheduler");

        let this = self.clone();
        let handle = tokio::spawn(async move {
            this.run_loop().await;
        });
        *self.task.lock().await = Some(handle);

        Ok(())
    }

    pub async fn stop(&self) {
        info!("stopping scheduler");
        *self.state.write().await = SchedulerState::Stopped;
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
        }
        self.status.write().await.is_running = false;
    }

    pub async fn reinitialize(self: &Arc<Self>) -> Result<()> {
        self.stop().await;
        *self.state.write().await = SchedulerState::Stopped;
        self.initialize().await
    }

    pub async fn status(&self) -> SchedulerStatus {
        let mut status = self.status.read().await.clone();
        status.is_running = self.in_flight.load(Ordering::SeqCst);
        status
    }

    async fn run_loop(self: Arc<Self>) {
        *self.state.write().await = SchedulerState::Idle;
        self.run_once().await;

        if *self.state.read().await == SchedulerState::Stopped {
            return;
        }

        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        loop {
            ticker.tick().await;
            if *self.state.read().await == SchedulerState::Stopped {
                break;
            }
            self.run_once().await;
            if *self.state.read().await == SchedulerState::Stopped {
                break;
            }
        }
    }

    async fn run_once(&self) {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            warn!("scrapeAll already running, skipping re-entrant invocation");
            return;
        }

        *self.state.write().await = SchedulerState::Running;
        let result = self.runner.scrape_all(&self.active_flags).await;
        self.apply_result(result).await;
        self.in_flight.store(false, Ordering::SeqCst);
    }

    async fn apply_result(&self, result: Result<RunSummary>) {
        let mut status = self.status.write().await;
        let now = Utc::now();

        match result {
            Ok(summary) => {
                status.consecutive_failures = 0;
                status.last_run = Some(now);
                status.next_run = Some(now + chrono::Duration::from_std(self.interval).unwrap_or_default());
                status.last_run_summary = Some(summary);
                *self.state.write().await = SchedulerState::Idle;
            }
            Err(e) => {
                status.consecutive_failures += 1;
                error!(error = %e, consecutive_failures = status.consecutive_failures, "scrapeAll failed");

                if status.consecutive_failures >= CONSECUTIVE_FAILURE_LIMIT {
                    error!("consecutive failure limit reached, tripping scheduler breaker");
                    *self.state.write().await = SchedulerState::Stopped;
                } else {
                    *self.state.write().await = SchedulerState::Idle;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::SourceRunSummary;
    use std::sync::atomic::AtomicU32;

    struct CountingRunner {
        calls: AtomicU32,
        fail: AtomicBool,
    }

    #[async_trait]
    impl ScrapeRunner for CountingRunner {
        async fn scrape_all(&self, _active_flags: &ActiveFlags) -> Result<RunSummary> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                Err(ClipperError::Network("boom".to_string()))
            } else {
                let mut summary = RunSummary::default();
                summary.record_source("a", SourceRunSummary { processed: 1, saved: 1, errors: 0 });
                Ok(summary)
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn initialize_runs_immediately_then_arms_interval() {
        let runner = Arc::new(CountingRunner { calls: AtomicU32::new(0), fail: AtomicBool::new(false) });
        let scheduler = Scheduler::new(runner.clone(), 3);
        scheduler.initialize().await.unwrap();

        tokio::time::advance(Duration::from_millis(10)).await;
        assert_eq!(runner.calls.load(Ordering::SeqCst), 1);

        let status = scheduler.status().await;
        assert!(status.initialized);
        assert_eq!(status.consecutive_failures, 0);
        assert!(status.last_run_summary.is_some());

        scheduler.stop().await;
    }

    #[tokio::test]
    async fn reentrant_run_once_is_skipped() {
        let runner = Arc::new(CountingRunner { calls: AtomicU32::new(0), fail: AtomicBool::new(false) });
        let scheduler = Scheduler::new(runner.clone(), 3);
        scheduler.in_flight.store(true, Ordering::SeqCst);
        scheduler.run_once().await;
        assert_eq!(runner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn breaker_trips_after_three_consecutive_failures() {
        let runner = Arc::new(CountingRunner { calls: AtomicU32::new(0), fail: AtomicBool::new(true) });
        let scheduler = Scheduler::new(runner.clone(), 3);

        scheduler.run_once().await;
        scheduler.run_once().await;
        assert_eq!(*scheduler.state.read().await, SchedulerState::Idle);
        scheduler.run_once().await;

        assert_eq!(*scheduler.state.read().await, SchedulerState::Stopped);
        let status = scheduler.status().await;
        assert_eq!(status.consecutive_failures, 3);
    }

    #[tokio::test]
    async fn per_source_flag_can_be_deactivated() {
        let runner = Arc::new(CountingRunner { calls: AtomicU32::new(0), fail: AtomicBool::new(false) });
        let scheduler = Scheduler::new(runner, 3);
        let id = Uuid::new_v4();
        assert!(scheduler.active_flags().is_active(id));
        scheduler.deactivate_source(id);
        assert!(!scheduler.active_flags().is_active(id));
    }
}
