use crate::client::TransportKind;
use crate::driver::Completion;
use crate::error::ConfigError;
use crate::logging::LogFormat;
use crate::scenario::Scenario;
use hyper::Uri;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "http://vt-server-service.default.svc.cluster.local:8080";
pub const DEFAULT_TASKS_PER_CYCLE: usize = 1000;
pub const DEFAULT_CYCLE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Scheme, host and port of the item service, without a trailing slash.
    pub base_uri: String,
    pub tasks_per_cycle: usize,
    pub cycle_interval: Duration,
    pub transport: TransportKind,
    pub scenario: Scenario,
    pub completion: Completion,
    /// Upper bound on tasks talking to the service at once, across cycles.
    /// `None` lets overlapping cycles pile up without limit.
    pub max_in_flight: Option<usize>,
    pub request_timeout: Option<Duration>,
    pub max_cycles: Option<u64>,
    pub log_format: LogFormat,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            base_uri: DEFAULT_SERVER_URL.to_owned(),
            tasks_per_cycle: DEFAULT_TASKS_PER_CYCLE,
            cycle_interval: DEFAULT_CYCLE_INTERVAL,
            transport: TransportKind::PerCall,
            scenario: Scenario::Chain,
            completion: Completion::FireAndForget,
            max_in_flight: None,
            request_timeout: None,
            max_cycles: None,
            log_format: LogFormat::Json,
        }
    }
}

impl LoadConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds a config from `lookup`, falling back to the default for every
    /// variable it does not know.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let base_uri = match lookup("VT_SERVER_URL") {
            Some(raw) => parse_base_uri(&raw)?,
            None => defaults.base_uri,
        };
        let tasks_per_cycle = parse_var::<usize, _>(&lookup, "VT_TASKS_PER_CYCLE")?
            .unwrap_or(defaults.tasks_per_cycle);
        if tasks_per_cycle == 0 {
            return Err(ConfigError::new("VT_TASKS_PER_CYCLE", "0", "must be at least 1"));
        }
        let cycle_interval = parse_var::<u64, _>(&lookup, "VT_CYCLE_INTERVAL_SECS")?
            .map_or(defaults.cycle_interval, Duration::from_secs);
        let max_in_flight = parse_var::<usize, _>(&lookup, "VT_MAX_IN_FLIGHT")?;
        if max_in_flight == Some(0) {
            return Err(ConfigError::new("VT_MAX_IN_FLIGHT", "0", "must be at least 1"));
        }
        let request_timeout = parse_var::<u64, _>(&lookup, "VT_REQUEST_TIMEOUT_MS")?
            .map(Duration::from_millis);

        Ok(Self {
            base_uri,
            tasks_per_cycle,
            cycle_interval,
            transport: parse_var(&lookup, "VT_TRANSPORT")?.unwrap_or(defaults.transport),
            scenario: parse_var(&lookup, "VT_SCENARIO")?.unwrap_or(defaults.scenario),
            completion: parse_var(&lookup, "VT_COMPLETION")?.unwrap_or(defaults.completion),
            max_in_flight,
            request_timeout,
            max_cycles: parse_var(&lookup, "VT_MAX_CYCLES")?,
            log_format: parse_var(&lookup, "VT_LOG_FORMAT")?.unwrap_or(defaults.log_format),
        })
    }
}

fn parse_var<T, L>(lookup: &L, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    L: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|e| ConfigError::new(var, raw, e))
}

/// Only plain `http` is spoken to the service.
fn parse_base_uri(raw: &str) -> Result<String, ConfigError> {
    const VAR: &str = "VT_SERVER_URL";
    let trimmed = raw.trim().trim_end_matches('/');
    let uri: Uri = trimmed
        .parse()
        .map_err(|e| ConfigError::new(VAR, raw, e))?;
    if uri.scheme_str() != Some("http") {
        return Err(ConfigError::new(VAR, raw, "scheme must be http"));
    }
    if uri.host().is_none() {
        return Err(ConfigError::new(VAR, raw, "missing host"));
    }
    if uri.query().is_some() {
        return Err(ConfigError::new(VAR, raw, "must not carry a query"));
    }
    Ok(trimmed.to_owned())
}
