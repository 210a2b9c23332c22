//! Fan-out loop: one lot, N concurrent tasks and a fixed pause per cycle.
use crate::client::Transport;
use crate::config::LoadConfig;
use crate::lot::Lot;
use crate::request::ItemClient;
use crate::scenario::{run_task, Scenario, TaskOutcome};
use crate::statistics::CycleStatistics;
use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinSet;

/// Whether a cycle waits for its own tasks before pausing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Tasks are detached and may still run when the next cycle starts.
    FireAndForget,
    /// The cycle joins all of its tasks and reports on them.
    Await,
}

impl FromStr for Completion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fire-and-forget" => Ok(Self::FireAndForget),
            "await" => Ok(Self::Await),
            _ => Err(format!("expected 'fire-and-forget' or 'await', got {s:?}")),
        }
    }
}

/// Number of spawned tasks that have not finished yet, across all cycles.
#[derive(Debug, Default)]
struct InFlight {
    count: AtomicUsize,
    idle: Notify,
}

struct InFlightGuard(Arc<InFlight>);

impl InFlight {
    fn enter(self: &Arc<Self>) -> InFlightGuard {
        self.count.fetch_add(1, Ordering::AcqRel);
        InFlightGuard(Arc::clone(self))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.0.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

/// Summary of one awaited cycle.
#[derive(Debug)]
pub struct CycleReport {
    pub cycle: u64,
    pub lot: Lot,
    pub succeeded: usize,
    pub failed: usize,
    /// Shutdown arrived before every task finished; the rest were aborted.
    pub interrupted: bool,
    pub statistics: CycleStatistics,
}

/// How a [`CycleDriver::run_until`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    /// `true` when the shutdown future resolved.
    pub interrupted: bool,
}

pub struct CycleDriver {
    client: Arc<ItemClient>,
    scenario: Scenario,
    tasks_per_cycle: usize,
    interval: Duration,
    completion: Completion,
    max_cycles: Option<u64>,
    limiter: Option<Arc<Semaphore>>,
    in_flight: Arc<InFlight>,
}

impl CycleDriver {
    #[must_use]
    pub fn new(config: &LoadConfig) -> Self {
        let transport = Transport::new(config.transport, config.request_timeout);
        Self {
            client: Arc::new(ItemClient::new(config.base_uri.as_str(), transport)),
            scenario: config.scenario,
            tasks_per_cycle: config.tasks_per_cycle,
            interval: config.cycle_interval,
            completion: config.completion,
            max_cycles: config.max_cycles,
            limiter: config
                .max_in_flight
                .map(|permits| Arc::new(Semaphore::new(permits))),
            in_flight: Arc::new(InFlight::default()),
        }
    }

    /// Tasks spawned by any cycle that are still running or waiting for a permit.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.count.load(Ordering::Acquire)
    }

    /// Resolves once no spawned task is left.
    pub async fn wait_idle(&self) {
        loop {
            let idle = self.in_flight.idle.notified();
            if self.in_flight() == 0 {
                return;
            }
            idle.await;
        }
    }

    /// Waits for every spawned task unless `shutdown` resolves first.
    /// Returns `true` when the driver went idle.
    pub async fn drain_until<F>(&self, shutdown: &mut F) -> bool
    where
        F: Future<Output = ()> + Unpin,
    {
        tokio::select! {
            () = self.wait_idle() => true,
            () = &mut *shutdown => {
                tracing::info!(in_flight = self.in_flight(), "shutdown requested while draining");
                false
            }
        }
    }

    /// Runs until `max_cycles` is reached or `shutdown` resolves, either
    /// during a pause or while an awaited cycle joins its tasks.
    ///
    /// `shutdown` is not polled again once it has resolved.
    pub async fn run_until<F>(&self, shutdown: &mut F) -> RunSummary
    where
        F: Future<Output = ()> + Unpin,
    {
        let mut cycle = 0;
        loop {
            cycle += 1;
            if let Some(report) = self.run_cycle_until(cycle, shutdown).await {
                tracing::info!(
                    cycle,
                    lot = %report.lot,
                    succeeded = report.succeeded,
                    failed = report.failed,
                    interrupted = report.interrupted,
                    "cycle complete"
                );
                report.statistics.log(cycle);
                if report.interrupted {
                    return RunSummary {
                        cycles: cycle,
                        interrupted: true,
                    };
                }
            }
            if self.max_cycles.is_some_and(|max| cycle >= max) {
                tracing::info!(cycle, "reached max cycles");
                return RunSummary {
                    cycles: cycle,
                    interrupted: false,
                };
            }
            tokio::select! {
                () = tokio::time::sleep(self.interval) => {}
                () = &mut *shutdown => {
                    tracing::info!(cycle, in_flight = self.in_flight(), "shutdown requested");
                    return RunSummary {
                        cycles: cycle,
                        interrupted: true,
                    };
                }
            }
        }
    }

    /// Spawns one cycle's tasks under a fresh lot. Only an awaited cycle
    /// yields a report.
    pub async fn run_cycle(&self, cycle: u64) -> Option<CycleReport> {
        self.run_cycle_until(cycle, &mut std::future::pending()).await
    }

    async fn run_cycle_until<F>(&self, cycle: u64, shutdown: &mut F) -> Option<CycleReport>
    where
        F: Future<Output = ()> + Unpin,
    {
        let lot = Lot::generate();
        tracing::info!(
            cycle,
            lot = %lot,
            tasks = self.tasks_per_cycle,
            in_flight = self.in_flight(),
            "starting cycle"
        );

        let mut tasks = JoinSet::new();
        for index in 0..self.tasks_per_cycle {
            let task = self.task(lot.clone(), index);
            match self.completion {
                Completion::Await => {
                    tasks.spawn(task);
                }
                Completion::FireAndForget => {
                    tokio::spawn(task);
                }
            }
        }
        if self.completion == Completion::FireAndForget {
            return None;
        }

        let mut report = CycleReport {
            cycle,
            lot,
            succeeded: 0,
            failed: 0,
            interrupted: false,
            statistics: CycleStatistics::default(),
        };
        loop {
            let joined = tokio::select! {
                joined = tasks.join_next() => joined,
                () = &mut *shutdown => {
                    report.interrupted = true;
                    None
                }
            };
            let Some(joined) = joined else {
                if report.interrupted {
                    // Dropping the set aborts whatever is still running.
                    tracing::info!(
                        cycle,
                        pending = tasks.len(),
                        "shutdown requested while awaiting cycle"
                    );
                }
                break;
            };
            match joined {
                Ok(outcome) => {
                    for record in outcome.records() {
                        report.statistics.record(record);
                    }
                    if outcome.is_success() {
                        report.succeeded += 1;
                    } else {
                        report.failed += 1;
                    }
                }
                Err(e) => {
                    tracing::error!(cycle, error = %e, "task panicked or was cancelled");
                    report.failed += 1;
                }
            }
        }
        Some(report)
    }

    fn task(&self, lot: Lot, index: usize) -> impl Future<Output = TaskOutcome> + Send + 'static {
        let guard = self.in_flight.enter();
        let client = Arc::clone(&self.client);
        let limiter = self.limiter.clone();
        let scenario = self.scenario;
        async move {
            let _guard = guard;
            // The semaphore is never closed, so acquiring only waits.
            let _permit = match limiter {
                Some(limiter) => limiter.acquire_owned().await.ok(),
                None => None,
            };
            let outcome = run_task(&client, scenario, &lot, index).await;
            // Each failed exchange already logged its own error line.
            for e in outcome.errors() {
                tracing::debug!(lot = %lot, index, error = %e, "task step failed");
            }
            outcome
        }
    }
}
