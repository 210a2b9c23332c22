use std::time::Duration;

/// Everything that can go wrong in a single request task.
///
/// None of these are fatal: the failing task logs and returns, other tasks and
/// later cycles are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("failed to serialize payload: {0}")]
    Marshal(#[source] serde_json::Error),
    #[error("failed to build request for {uri}: {source}")]
    Build {
        uri: String,
        #[source]
        source: hyper::http::Error,
    },
    #[error("failed to encode key query: {0}")]
    Query(#[source] serde_urlencoded::ser::Error),
    #[error("client request err: {0}")]
    Transport(#[source] hyper_util::client::legacy::Error),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("read response body: {0:#}")]
    ReadBody(anyhow::Error),
    #[error("response code = {status}, body = {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("create response carries no usable key: {0}")]
    Decode(#[source] serde_json::Error),
}

impl TaskError {
    /// Status code of a completed exchange that was not a 200.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Rejected startup configuration.
#[derive(Debug, thiserror::Error)]
#[error("invalid value {value:?} for {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

impl ConfigError {
    pub(crate) fn new(var: &'static str, value: &str, reason: impl ToString) -> Self {
        Self {
            var,
            value: value.to_owned(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TaskError;

    #[test]
    fn marshal_error_reads_as_serialization_failure() {
        let source = serde_json::from_str::<u8>("x").unwrap_err();
        let err = TaskError::Marshal(source);
        assert!(
            err.to_string().starts_with("failed to serialize payload: "),
            "{err}"
        );
        assert_eq!(err.status(), None);
    }
}
