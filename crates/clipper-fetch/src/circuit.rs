//! Per-host circuit breaker guarding the HTTP tier. Closed → Open on
//! consecutive failures; Open → HalfOpen after a cooldown; HalfOpen →
//! Closed on the first success (or back to Open on failure).

use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub failure_threshold: u32,
    pub open_cooldown_ms: u64,
    pub half_open_max_in_flight: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_cooldown_ms: 30_000,
            half_open_max_in_flight: 3,
        }
    }
}

pub trait Clock: std::fmt::Debug + Send + Sync {
    fn now_ms(&self) -> u64;
}

#[derive(Debug)]
pub struct RealClock;

impl Clock for RealClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// A permit acquired while the circuit is half-open, limiting
/// concurrent trial requests.
pub struct Permit<'a> {
    breaker: &'a CircuitBreaker,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.breaker.half_open_in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct CircuitBreaker {
    config: Config,
    clock: Arc<dyn Clock>,
    state: std::sync::RwLock<State>,
    failure_count: AtomicU32,
    opened_at_ms: AtomicU64,
    half_open_in_flight: AtomicU32,
}

impl CircuitBreaker {
    pub fn new(config: Config, clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(Self {
            config,
            clock,
            state: std::sync::RwLock::new(State::Closed),
            failure_count: AtomicU32::new(0),
            opened_at_ms: AtomicU64::new(0),
            half_open_in_flight: AtomicU32::new(0),
        })
    }

    pub fn state(&self) -> State {
        *self.state.read().expect("circuit breaker lock poisoned")
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::SeqCst)
    }

    /// Try to acquire permission to make a call. `Ok(None)` means go
    /// ahead unrestricted (closed). `Ok(Some(permit))` means a
    /// half-open trial slot was granted. `Err` means the circuit is
    /// open and the caller must not proceed.
    pub fn try_acquire(&self) -> Result<Option<Permit<'_>>> {
        let current = self.state();
        match current {
            State::Closed => Ok(None),
            State::Open => {
                let opened_at = self.opened_at_ms.load(Ordering::SeqCst);
                let now = self.clock.now_ms();
                if now.saturating_sub(opened_at) >= self.config.open_cooldown_ms {
                    *self.state.write().expect("lock poisoned") = State::HalfOpen;
                    self.half_open_in_flight.store(0, Ordering::SeqCst);
                    self.acquire_half_open_permit()
                } else {
                    Err(anyhow!("circuit open"))
                }
            }
            State::HalfOpen => self.acquire_half_open_permit(),
        }
    }

    fn acquire_half_open_permit(&self) -> Result<Option<Permit<'_>>> {
        let in_flight = self.half_open_in_flight.fetch_add(1, Ordering::SeqCst);
        if in_flight >= self.config.half_open_max_in_flight {
            self.half_open_in_flight.fetch_sub(1, Ordering::SeqCst);
            return Err(anyhow!("circuit half-open: too many in-flight trials"));
        }
        Ok(Some(Permit { breaker: self }))
    }

    pub fn on_success(&self) {
        self.failure_count.store(0, Ordering::SeqCst);
        *self.state.write().expect("lock poisoned") = State::Closed;
    }

    pub fn on_failure(&self) {
        match self.state() {
            State::Closed => {
                let failures = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
                if failures >= self.config.failure_threshold {
                    self.trip();
                }
            }
            State::HalfOpen => {
                self.trip();
            }
            State::Open => {}
        }
    }

    fn trip(&self) {
        self.failure_count.store(0, Ordering::SeqCst);
        self.opened_at_ms.store(self.clock.now_ms(), Ordering::SeqCst);
        *self.state.write().expect("lock poisoned") = State::Open;
    }
}

/// Run `f` through the circuit breaker, recording success/failure.
pub async fn guarded_call<F, Fut, T>(breaker: &Arc<CircuitBreaker>, f: F) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let _permit = breaker.try_acquire()?;
    match f().await {
        Ok(value) => {
            breaker.on_success();
            Ok(value)
        }
        Err(e) => {
            breaker.on_failure();
            Err(e)
        }
    }
}
