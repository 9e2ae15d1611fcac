//! Domain service for reports.
//!
//! Listing goes through the visibility rule; creation is open to any
//! authenticated user and always attributes the report to the caller.

use thiserror::Error;

use crate::db::Report;
use crate::domain::Principal;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for ReportError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Input for a new report. The owner is never part of the input.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub category: String,
    pub message: String,
}

#[async_trait::async_trait]
pub trait ReportService: Send + Sync {
    /// Creates a report owned by `author`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Validation`] if the category or message is blank.
    async fn create(&self, author: &Principal, report: NewReport) -> Result<Report, ReportError>;

    /// Lists the reports `viewer` may read, in id order.
    async fn list(&self, viewer: &Principal) -> Result<Vec<Report>, ReportError>;
}
