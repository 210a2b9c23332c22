use crate::error::TaskError;
use crate::lot::Lot;
use crate::request::Resource;
use hyper::StatusCode;
use std::time::Duration;

/// Outcome metadata of one completed exchange, logged then dropped.
#[derive(Debug, Clone)]
pub struct ResponseRecord {
    pub resource: Resource,
    pub lot: Lot,
    pub index: usize,
    pub contents: Vec<String>,
    pub status: StatusCode,
    pub body: String,
    pub rtt: Duration,
}

impl ResponseRecord {
    #[inline]
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    pub fn log(&self) {
        let rtt_us = u64::try_from(self.rtt.as_micros()).unwrap_or(u64::MAX);
        if self.is_ok() {
            tracing::info!(
                resource = self.resource.label(),
                lot = %self.lot,
                index = self.index,
                contents = ?self.contents,
                status = self.status.as_u16(),
                rtt_us,
                "index = {}, response status = {}",
                self.index,
                self.status
            );
        } else {
            tracing::error!(
                resource = self.resource.label(),
                lot = %self.lot,
                index = self.index,
                contents = ?self.contents,
                status = self.status.as_u16(),
                body = %self.body,
                rtt_us,
                "response code = {}, body = {}",
                self.status.as_u16(),
                self.body
            );
        }
    }

    /// Anything but a 200 becomes [`TaskError::UnexpectedStatus`].
    pub fn into_result(self) -> Result<Self, TaskError> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(TaskError::UnexpectedStatus {
                status: self.status.as_u16(),
                body: self.body,
            })
        }
    }
}
