//! Synthetic load against the item service: every cycle fans out a batch of
//! concurrent request tasks tagged with one lot, then pauses.
pub mod chain;
pub mod client;
pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod lot;
pub mod record;
pub mod request;
pub mod scenario;
pub mod statistics;

pub use chain::{run_chain, ChainOutcome};
pub use client::{HttpClient, Transport, TransportKind};
pub use config::LoadConfig;
pub use driver::{Completion, CycleDriver, CycleReport, RunSummary};
pub use error::{ConfigError, TaskError};
pub use lot::Lot;
pub use request::{Created, ItemClient, Resource};
pub use scenario::{run_task, Scenario, TaskOutcome};
