use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Batch identifier shared by every request of one cycle. Only used to
/// correlate log lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Lot(Arc<str>);

impl Lot {
    #[must_use]
    pub fn generate() -> Self {
        Self::at(Utc::now(), Uuid::new_v4())
    }

    #[must_use]
    pub fn at(timestamp: DateTime<Utc>, token: Uuid) -> Self {
        let id = format!("{}-{token}", timestamp.format("%Y%m%dT%H%M%S%.3fZ"));
        Self(id.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Lot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Lot {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
